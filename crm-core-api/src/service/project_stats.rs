use async_trait::async_trait;

use crate::domain::stats::{RecalculationSummary, StatsDomain};
use crate::error::ApiResult;

/// Maintenance surface of the statistics engine.
///
/// Single-project operations surface [`crate::ApiError::NotFound`] to the
/// caller; batch operations swallow per-project failures and report counts.
#[async_trait]
pub trait ProjectStatsService: Send + Sync {
    /// Recalculate every aggregate domain for one project from source data
    /// and persist the result. Idempotent for unchanged source data.
    async fn recalculate_project_stats(&self, project_unique_id: &str) -> ApiResult<()>;

    /// Targeted recompute of one domain after a mutation event. A purchase
    /// order change also recomputes the derived financial metrics.
    async fn update_after_domain_change(
        &self,
        project_unique_id: &str,
        domain: StatsDomain,
    ) -> ApiResult<()>;

    /// Recalculate all active projects, one independent transaction each.
    async fn recalculate_all_active_projects(&self) -> ApiResult<RecalculationSummary>;

    /// Active projects whose stats are missing or older than `staleness`.
    async fn find_projects_needing_recalculation(
        &self,
        staleness: chrono::Duration,
    ) -> ApiResult<Vec<String>>;

    /// Compare a subset of stored aggregates against source data.
    async fn verify_project_stats(&self, project_unique_id: &str) -> ApiResult<bool>;

    /// Fully recalculate every active project that fails verification.
    /// Returns the number of projects repaired.
    async fn fix_inconsistent_stats(&self) -> ApiResult<u32>;
}
