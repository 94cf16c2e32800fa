use crate::models::donation::PaymentMethod;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DonationRequest {
    pub project_id: Uuid,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub covers_fees: bool,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptRequest {
    pub receipt_url: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyDonationRequest {
    pub verified: bool,
    pub notes: Option<String>,
}
