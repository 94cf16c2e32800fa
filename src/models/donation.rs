use crate::database::connection::DbPool;
use crate::models::{notification::Notification, project::Project};
use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// The single currency accepted for donations.
pub const SUPPORTED_CURRENCY: &str = "USD";

#[derive(Error, Debug)]
pub enum DonationError {
    #[error("Donation with ID {id} not found")]
    NotFound { id: Uuid },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Amount must be a positive number of minor currency units")]
    InvalidAmount,
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("Donation is not awaiting a receipt")]
    ReceiptNotExpected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "donation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Pending,
    AwaitingReceipt,
    AwaitingVerification,
    Verified,
    Rejected,
    Completed,
}

impl DonationStatus {
    /// Terminal statuses admit no further transition from this workflow.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DonationStatus::Verified | DonationStatus::Rejected | DonationStatus::Completed
        )
    }

    pub fn can_transition(&self, to: DonationStatus) -> bool {
        use DonationStatus::*;
        matches!(
            (*self, to),
            (Pending, AwaitingReceipt)
                | (Pending, AwaitingVerification)
                | (Pending, Verified)
                | (Pending, Rejected)
                | (AwaitingReceipt, AwaitingVerification)
                | (AwaitingReceipt, Verified)
                | (AwaitingReceipt, Rejected)
                | (AwaitingVerification, Verified)
                | (AwaitingVerification, Rejected)
        )
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DonationStatus::Pending => "pending",
            DonationStatus::AwaitingReceipt => "awaiting_receipt",
            DonationStatus::AwaitingVerification => "awaiting_verification",
            DonationStatus::Verified => "verified",
            DonationStatus::Rejected => "rejected",
            DonationStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

impl FromStr for DonationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DonationStatus::Pending),
            "awaiting_receipt" => Ok(DonationStatus::AwaitingReceipt),
            "awaiting_verification" => Ok(DonationStatus::AwaitingVerification),
            "verified" => Ok(DonationStatus::Verified),
            "rejected" => Ok(DonationStatus::Rejected),
            "completed" => Ok(DonationStatus::Completed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    CardProvider,
    CashAgency,
}

impl PaymentMethod {
    /// Status a fresh donation starts in. Bank transfers immediately wait
    /// for the donor's receipt upload; agency payments are handed straight
    /// to an admin; card payments stay pending until the provider reports.
    pub fn initial_status(&self) -> DonationStatus {
        match self {
            PaymentMethod::BankTransfer => DonationStatus::AwaitingReceipt,
            PaymentMethod::CardProvider => DonationStatus::Pending,
            PaymentMethod::CashAgency => DonationStatus::AwaitingVerification,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub project_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub covers_fees: bool,
    pub payment_method: PaymentMethod,
    pub status: DonationStatus,
    pub reference: String,
    pub receipt_url: Option<String>,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verification_notes: Option<String>,
    pub provider_payment_id: Option<String>,
    pub provider_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDonation {
    pub donor_id: Uuid,
    pub project_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub covers_fees: bool,
    pub payment_method: PaymentMethod,
}

/// Provider-side linkage recorded on card-payment donations.
#[derive(Debug, Clone)]
pub struct ProviderRef {
    pub payment_id: String,
    pub status: String,
}

/// Result of a verification attempt. `AlreadyFinal` means the donation was
/// in a terminal status before the call and nothing was changed.
#[derive(Debug)]
pub enum VerificationOutcome {
    Applied(Donation),
    AlreadyFinal(Donation),
}

fn generate_reference() -> String {
    let rng = rand::thread_rng();
    rng.sample_iter(&Alphanumeric)
        .take(10)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect()
}

impl Donation {
    pub async fn create(pool: &DbPool, donation: CreateDonation) -> Result<Self, DonationError> {
        if donation.amount <= 0 {
            return Err(DonationError::InvalidAmount);
        }
        if donation.currency != SUPPORTED_CURRENCY {
            return Err(DonationError::UnsupportedCurrency(donation.currency));
        }

        let now = Utc::now();
        let status = donation.payment_method.initial_status();

        let donation = sqlx::query_as::<_, Donation>(
            "INSERT INTO donations (id, donor_id, project_id, amount, currency, covers_fees, payment_method, status, reference, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(donation.donor_id)
        .bind(donation.project_id)
        .bind(donation.amount)
        .bind(donation.currency)
        .bind(donation.covers_fees)
        .bind(donation.payment_method)
        .bind(status)
        .bind(generate_reference())
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(donation)
    }

    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Self>, DonationError> {
        let donation = sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(donation)
    }

    pub async fn find_by_donor(pool: &DbPool, donor_id: Uuid) -> Result<Vec<Self>, DonationError> {
        let donations = sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE donor_id = $1 ORDER BY created_at DESC",
        )
        .bind(donor_id)
        .fetch_all(pool)
        .await?;

        Ok(donations)
    }

    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, DonationError> {
        let donations =
            sqlx::query_as::<_, Donation>("SELECT * FROM donations ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?;

        Ok(donations)
    }

    /// Attaches the donor's transfer receipt and hands the donation to
    /// verification. Only bank transfers awaiting a receipt qualify.
    pub async fn submit_receipt(
        pool: &DbPool,
        id: Uuid,
        receipt_url: &str,
    ) -> Result<Self, DonationError> {
        let mut tx = pool.begin().await?;

        let existing =
            sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let existing = match existing {
            Some(donation) => donation,
            None => return Err(DonationError::NotFound { id }),
        };

        if existing.payment_method != PaymentMethod::BankTransfer
            || !existing
                .status
                .can_transition(DonationStatus::AwaitingVerification)
        {
            return Err(DonationError::ReceiptNotExpected);
        }

        let updated = sqlx::query_as::<_, Donation>(
            "UPDATE donations SET receipt_url = $2, status = $3, updated_at = $4 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(receipt_url)
        .bind(DonationStatus::AwaitingVerification)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Settles a donation as verified or rejected.
    ///
    /// The whole operation is one row-locked transaction: status change,
    /// project aggregate increment and notification enqueue commit
    /// together or not at all. Terminal status is sticky, so a concurrent
    /// or redelivered call observes `AlreadyFinal` and repeats no side
    /// effect.
    pub async fn apply_verification(
        pool: &DbPool,
        id: Uuid,
        verified: bool,
        notes: &str,
        verified_by: Option<Uuid>,
        provider: Option<ProviderRef>,
    ) -> Result<VerificationOutcome, DonationError> {
        let mut tx = pool.begin().await?;

        let existing =
            sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let existing = match existing {
            Some(donation) => donation,
            None => return Err(DonationError::NotFound { id }),
        };

        if existing.status.is_terminal() {
            tx.commit().await?;
            return Ok(VerificationOutcome::AlreadyFinal(existing));
        }

        let now = Utc::now();
        let new_status = if verified {
            DonationStatus::Verified
        } else {
            DonationStatus::Rejected
        };

        let (provider_payment_id, provider_status) = match &provider {
            Some(p) => (Some(p.payment_id.clone()), Some(p.status.clone())),
            None => (
                existing.provider_payment_id.clone(),
                existing.provider_status.clone(),
            ),
        };

        let updated = sqlx::query_as::<_, Donation>(
            "UPDATE donations
             SET status = $2,
                 verified_by = $3,
                 verified_at = $4,
                 verification_notes = COALESCE(verification_notes || chr(10), '') || $5,
                 provider_payment_id = $6,
                 provider_status = $7,
                 updated_at = $4
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(new_status)
        .bind(verified_by)
        .bind(now)
        .bind(notes)
        .bind(provider_payment_id)
        .bind(provider_status)
        .fetch_one(&mut *tx)
        .await?;

        if verified {
            Project::increment_raised(&mut tx, existing.project_id, existing.amount).await?;
        }

        Notification::enqueue(&mut tx, &updated).await?;

        tx.commit().await?;

        Ok(VerificationOutcome::Applied(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DonationStatus; 6] = [
        DonationStatus::Pending,
        DonationStatus::AwaitingReceipt,
        DonationStatus::AwaitingVerification,
        DonationStatus::Verified,
        DonationStatus::Rejected,
        DonationStatus::Completed,
    ];

    #[test]
    fn terminal_statuses() {
        assert!(!DonationStatus::Pending.is_terminal());
        assert!(!DonationStatus::AwaitingReceipt.is_terminal());
        assert!(!DonationStatus::AwaitingVerification.is_terminal());
        assert!(DonationStatus::Verified.is_terminal());
        assert!(DonationStatus::Rejected.is_terminal());
        assert!(DonationStatus::Completed.is_terminal());
    }

    #[test]
    fn terminal_statuses_admit_no_transition() {
        for from in ALL.iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(
                    !from.can_transition(to),
                    "{} must not transition to {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn verification_edges_exist_from_every_open_status() {
        for from in ALL.iter().filter(|s| !s.is_terminal()) {
            assert!(from.can_transition(DonationStatus::Verified));
            assert!(from.can_transition(DonationStatus::Rejected));
        }
    }

    #[test]
    fn receipt_flow_edges() {
        assert!(DonationStatus::Pending.can_transition(DonationStatus::AwaitingReceipt));
        assert!(DonationStatus::AwaitingReceipt.can_transition(DonationStatus::AwaitingVerification));
        assert!(!DonationStatus::AwaitingVerification.can_transition(DonationStatus::AwaitingReceipt));
        assert!(!DonationStatus::Pending.can_transition(DonationStatus::Pending));
    }

    #[test]
    fn nothing_transitions_into_completed() {
        for from in ALL {
            assert!(!from.can_transition(DonationStatus::Completed));
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in ALL {
            assert_eq!(status.to_string().parse::<DonationStatus>(), Ok(status));
        }
        assert!("paid".parse::<DonationStatus>().is_err());
    }

    #[test]
    fn initial_status_per_method() {
        assert_eq!(
            PaymentMethod::BankTransfer.initial_status(),
            DonationStatus::AwaitingReceipt
        );
        assert_eq!(
            PaymentMethod::CardProvider.initial_status(),
            DonationStatus::Pending
        );
        assert_eq!(
            PaymentMethod::CashAgency.initial_status(),
            DonationStatus::AwaitingVerification
        );
    }

    #[test]
    fn reference_is_ten_uppercase_alphanumerics() {
        let reference = generate_reference();
        assert_eq!(reference.len(), 10);
        assert!(
            reference
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }
}
