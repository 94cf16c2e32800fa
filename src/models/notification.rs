use crate::database::connection::DbPool;
use crate::models::donation::{Donation, DonationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgTransaction, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "notification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Queued,
    Sent,
}

/// Durable record of a donor-facing message. Rows are enqueued inside the
/// verification transaction, so exactly one exists per status change even
/// when delivery itself fails and is retried later.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub body: String,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Queues the donor's status-change message in the caller's
    /// transaction.
    pub async fn enqueue(
        tx: &mut PgTransaction<'_>,
        donation: &Donation,
    ) -> Result<Self, sqlx::Error> {
        let (subject, body) = donation_message(donation);

        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, donation_id, user_id, subject, body, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(donation.id)
        .bind(donation.donor_id)
        .bind(subject)
        .bind(body)
        .bind(NotificationStatus::Queued)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        Ok(notification)
    }

    pub async fn find_queued_for_donation(
        pool: &DbPool,
        donation_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE donation_id = $1 AND status = $2 ORDER BY created_at",
        )
        .bind(donation_id)
        .bind(NotificationStatus::Queued)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }

    pub async fn mark_sent(pool: &DbPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE notifications SET status = $2, sent_at = $3 WHERE id = $1")
            .bind(id)
            .bind(NotificationStatus::Sent)
            .bind(Utc::now())
            .execute(pool)
            .await?;

        Ok(())
    }
}

fn donation_message(donation: &Donation) -> (String, String) {
    let amount = format_amount(donation.amount, &donation.currency);
    match donation.status {
        DonationStatus::Verified => (
            format!("Donation {} confirmed", donation.reference),
            format!(
                "Your donation of {} has been confirmed. Thank you for your support!",
                amount
            ),
        ),
        DonationStatus::Rejected => (
            format!("Donation {} could not be confirmed", donation.reference),
            format!(
                "We could not confirm your donation of {}. Please contact support quoting reference {}.",
                amount, donation.reference
            ),
        ),
        _ => (
            format!("Donation {} update", donation.reference),
            format!("Your donation of {} is now {}.", amount, donation.status),
        ),
    }
}

fn format_amount(minor_units: i64, currency: &str) -> String {
    format!("{}.{:02} {}", minor_units / 100, minor_units % 100, currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_format_as_major_units() {
        assert_eq!(format_amount(5000, "USD"), "50.00 USD");
        assert_eq!(format_amount(5, "USD"), "0.05 USD");
        assert_eq!(format_amount(123, "USD"), "1.23 USD");
    }
}
