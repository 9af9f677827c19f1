use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod vendor_status {
    pub const ACTIVE: &str = "Active";
    pub const INACTIVE: &str = "Inactive";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorModel {
    pub id: i64,
    pub name: String,
    pub project_id: String,
    pub status: String,
    pub rating: Option<Decimal>,
    pub total_purchase_value: Decimal,
    pub last_purchase_amount: Option<Decimal>,
}
