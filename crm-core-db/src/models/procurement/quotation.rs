use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod quotation_status {
    pub const NEW: &str = "New";
    pub const UNDER_REVIEW: &str = "Under Review";
    pub const APPROVED: &str = "Approved";
    pub const REJECTED: &str = "Rejected";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationModel {
    pub id: i64,
    pub quote_no: String,
    pub project_id: String,
    pub status: String,
    pub total_value: Decimal,
    pub uploaded_at: DateTime<Utc>,
}
