use std::error::Error;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::procurement::purchase_order::PurchaseOrderModel;
use crate::repository::types::{CategoryValue, StatusCount};

/// Read-only aggregate queries over purchase orders.
///
/// Every sum defaults to zero when no rows match; callers never receive an
/// absent value for a domain total. Date-range methods take a half-open
/// `[start, end)` interval; month buckets are built by the caller.
#[async_trait]
pub trait PurchaseOrderReader: Send + Sync {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;

    async fn sum_value_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>>;

    async fn count_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;

    async fn sum_value_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>>;

    async fn count_grouped_by_status(
        &self,
        project_id: &str,
    ) -> Result<Vec<StatusCount>, Box<dyn Error + Send + Sync>>;

    /// Spend per category, largest first, at most `limit` rows.
    async fn sum_value_grouped_by_category(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<CategoryValue>, Box<dyn Error + Send + Sync>>;

    async fn sum_items_ordered(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;

    async fn sum_items_delivered(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;

    async fn count_in_range(
        &self,
        project_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;

    async fn sum_value_in_range(
        &self,
        project_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>>;

    /// Most recently created orders, newest first.
    async fn find_recent(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<PurchaseOrderModel>, Box<dyn Error + Send + Sync>>;

    async fn find_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Vec<PurchaseOrderModel>, Box<dyn Error + Send + Sync>>;

    async fn count_by_vendor(
        &self,
        vendor_id: i64,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;
}
