use std::error::Error;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::procurement::quotation::QuotationModel;
use crate::repository::types::StatusCount;

/// Read-only aggregate queries over quotations. Sums default to zero.
#[async_trait]
pub trait QuotationReader: Send + Sync {
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

    /// Most recently uploaded quotations, newest first.
    async fn find_recent(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<QuotationModel>, Box<dyn Error + Send + Sync>>;
}
