use async_trait::async_trait;

use crate::domain::dashboard::{FinancialData, ProcurementData, ProjectDashboard};
use crate::error::ApiResult;

/// Read surface for the project dashboard.
///
/// Reading is not purely read-only: composing the financial section
/// recomputes and persists the cash-basis financial metrics.
#[async_trait]
pub trait ProjectDashboardService: Send + Sync {
    async fn dashboard(&self, project_unique_id: &str) -> ApiResult<ProjectDashboard>;

    async fn financial_data(&self, project_unique_id: &str) -> ApiResult<FinancialData>;

    async fn procurement_data(&self, project_unique_id: &str) -> ApiResult<ProcurementData>;
}
