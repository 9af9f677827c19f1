use std::error::Error;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::billing::invoice::InvoiceModel;

/// Read-only aggregate queries over client invoices. Soft-deleted invoices
/// are excluded everywhere; sums default to zero.
#[async_trait]
pub trait InvoiceReader: Send + Sync {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;

    async fn sum_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>>;

    async fn count_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;

    async fn sum_amount_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>>;

    async fn sum_amount_excluding_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>>;

    async fn find_by_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<InvoiceModel>, Box<dyn Error + Send + Sync>>;
}
