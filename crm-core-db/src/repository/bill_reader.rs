use std::error::Error;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::billing::bill::BillModel;

/// Read-only aggregate queries over vendor bills. Sums default to zero.
///
/// The outstanding balance is its own aggregate (`sum_balance_amount`);
/// partial payments mean it cannot be derived as total minus paid.
#[async_trait]
pub trait BillReader: Send + Sync {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;

    async fn sum_total_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>>;

    async fn count_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>>;

    async fn sum_paid_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>>;

    async fn sum_balance_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>>;

    async fn find_by_project_excluding_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Vec<BillModel>, Box<dyn Error + Send + Sync>>;
}
