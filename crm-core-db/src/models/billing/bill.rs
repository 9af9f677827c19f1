use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod bill_status {
    pub const PENDING: &str = "Pending";
    pub const PARTIALLY_PAID: &str = "Partially Paid";
    pub const PAID: &str = "Paid";
}

/// Vendor-side spend. `balance_amount` carries the outstanding balance so
/// partial payments are representable; pending payment aggregates sum it
/// instead of deriving total minus paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillModel {
    pub id: i64,
    pub bill_no: String,
    pub project_id: String,
    pub vendor_id: Option<i64>,
    pub status: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance_amount: Decimal,
    pub bill_date: Option<NaiveDate>,
}
