use crate::database::connection::DbPool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment for donation {donation_id} not found")]
    NotFound { donation_id: Uuid },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        };
        f.write_str(s)
    }
}

/// Provider-side transaction record for a card-payment donation. Tracks the
/// amount breakdown and the provider's own status, which correlates with
/// but never replaces the donation's status.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub provider_payment_id: Option<String>,
    pub gross_amount: i64,
    pub platform_fee: i64,
    pub processing_fee: i64,
    pub net_amount: i64,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub donation_id: Uuid,
    pub gross_amount: i64,
    pub platform_fee: i64,
    pub processing_fee: i64,
}

impl Payment {
    pub async fn create(pool: &DbPool, payment: CreatePayment) -> Result<Self, PaymentError> {
        let now = Utc::now();
        let net_amount = payment.gross_amount - payment.platform_fee - payment.processing_fee;

        let payment = sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (id, donation_id, gross_amount, platform_fee, processing_fee, net_amount, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(payment.donation_id)
        .bind(payment.gross_amount)
        .bind(payment.platform_fee)
        .bind(payment.processing_fee)
        .bind(net_amount)
        .bind(PaymentStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(payment)
    }

    pub async fn find_by_donation(
        pool: &DbPool,
        donation_id: Uuid,
    ) -> Result<Option<Self>, PaymentError> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE donation_id = $1")
            .bind(donation_id)
            .fetch_optional(pool)
            .await?;

        Ok(payment)
    }

    /// Records the status the provider reported for this donation's
    /// payment. Donations without a payment row (non-card methods) are
    /// left untouched.
    pub async fn record_provider_status(
        pool: &DbPool,
        donation_id: Uuid,
        provider_payment_id: Option<&str>,
        status: PaymentStatus,
    ) -> Result<Option<Self>, PaymentError> {
        let payment = sqlx::query_as::<_, Payment>(
            "UPDATE payments
             SET status = $2, provider_payment_id = COALESCE($3, provider_payment_id), updated_at = $4
             WHERE donation_id = $1
             RETURNING *",
        )
        .bind(donation_id)
        .bind(status)
        .bind(provider_payment_id)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }
}
