use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod invoice_status {
    pub const PENDING: &str = "Pending";
    pub const PAID: &str = "Paid";
}

/// Client-side billing. Soft-deleted invoices (`deleted_at` set) are
/// excluded from every aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceModel {
    pub id: i64,
    pub invoice_no: String,
    pub project_id: String,
    pub status: String,
    pub total_amount: Decimal,
    pub invoice_date: Option<NaiveDate>,
    pub deleted_at: Option<DateTime<Utc>>,
}
