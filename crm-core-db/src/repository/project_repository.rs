use std::error::Error;

use async_trait::async_trait;

use crate::models::project::ProjectModel;

/// Access to the project aggregate rows.
///
/// `update_stats` is the engine's only write path: it persists the derived
/// aggregate fields and the two stats timestamps of a single project row.
/// The backing store is expected to provide row-level atomicity for that
/// update; cross-project batches are sequences of independent updates.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Look a project up by its external unique id.
    async fn find_by_unique_id(
        &self,
        project_unique_id: &str,
    ) -> Result<Option<ProjectModel>, Box<dyn Error + Send + Sync>>;

    /// All projects with the active flag set.
    async fn find_active(&self) -> Result<Vec<ProjectModel>, Box<dyn Error + Send + Sync>>;

    /// Insert a new project row.
    async fn create(
        &self,
        project: &ProjectModel,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Persist the aggregate fields and stats timestamps of one project.
    async fn update_stats(
        &self,
        project: &ProjectModel,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
