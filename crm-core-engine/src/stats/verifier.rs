use std::sync::Arc;

use tracing::{debug, warn};

use crm_core_api::{ApiError, ApiResult};
use crm_core_db::models::project::ProjectModel;
use crm_core_db::repository::PurchaseOrderReader;

/// Detects drift between stored aggregates and source-of-truth data.
///
/// Recomputes a minimal subset (purchase order count and total value) and
/// compares numerically; `rust_decimal` equality is scale-independent, so
/// `30000` and `30000.00` compare equal. Mismatches are logged with both
/// values. Repair is the orchestrator's job.
pub struct ConsistencyVerifier {
    purchase_orders: Arc<dyn PurchaseOrderReader>,
}

impl ConsistencyVerifier {
    pub fn new(purchase_orders: Arc<dyn PurchaseOrderReader>) -> Self {
        Self { purchase_orders }
    }

    pub async fn verify(&self, project: &ProjectModel) -> ApiResult<bool> {
        let project_id = project.project_unique_id.as_str();

        let actual_count = self
            .purchase_orders
            .count_by_project(project_id)
            .await
            .map_err(ApiError::database)?;
        if actual_count != i64::from(project.total_po_count) {
            warn!(
                project_id,
                stored = project.total_po_count,
                actual = actual_count,
                "purchase order count drift detected"
            );
            return Ok(false);
        }

        let actual_value = self
            .purchase_orders
            .sum_value_by_project(project_id)
            .await
            .map_err(ApiError::database)?;
        if project.total_po_value != actual_value {
            warn!(
                project_id,
                stored = %project.total_po_value,
                actual = %actual_value,
                "purchase order value drift detected"
            );
            return Ok(false);
        }

        debug!(project_id, "project stats verified");
        Ok(true)
    }
}
