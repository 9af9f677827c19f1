use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical purchase-order status vocabulary. The four aggregate buckets
/// (delivered / pending / cancelled / total) partition these statuses.
pub mod po_status {
    pub const DRAFT: &str = "Draft";
    pub const APPROVED: &str = "Approved";
    pub const ORDERED: &str = "Ordered";
    pub const IN_TRANSIT: &str = "In-Transit";
    pub const DELIVERED: &str = "Delivered";
    pub const CANCELLED: &str = "Cancelled";

    /// Statuses counted as pending commitment.
    pub const PENDING: [&str; 3] = [APPROVED, ORDERED, IN_TRANSIT];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderModel {
    pub id: i64,
    pub po_no: String,
    pub project_id: String,
    pub vendor_id: i64,
    pub status: String,
    pub category: Option<String>,
    pub total_value: Decimal,
    pub total_items_ordered: i32,
    pub total_items_delivered: i32,
    pub order_date: Option<DateTime<Utc>>,
    pub expected_delivery: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
