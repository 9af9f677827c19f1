use std::error::Error;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::procurement::vendor::VendorModel;

/// Read-only aggregate queries over project vendors.
#[async_trait]
pub trait VendorReader: Send + Sync {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;

    async fn count_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;

    async fn sum_purchase_value_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>>;

    /// Mean rating over vendors that have one; `None` when none do.
    async fn average_rating_by_project(
        &self,
        project_id: &str,
    ) -> Result<Option<Decimal>, Box<dyn Error + Send + Sync>>;

    /// Vendors ordered by total purchase value, largest first.
    async fn find_top_by_purchase_value(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<VendorModel>, Box<dyn Error + Send + Sync>>;
}
