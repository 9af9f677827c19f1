use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use crm_core_db::models::project::ProjectModel;
use crm_core_db::repository::ProjectRepository;

use crate::utils::TryFromRow;

pub struct ProjectRepositoryImpl {
    pool: Arc<PgPool>,
}

impl ProjectRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for ProjectModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(ProjectModel {
            id: row.try_get("id")?,
            project_unique_id: row.try_get("project_unique_id")?,
            project_name: row.try_get("project_name")?,
            description: row.try_get("description")?,
            location: row.try_get("location")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            status: row.try_get("status")?,
            budget: row.try_get("budget")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            assigned_to: row.try_get("assigned_to")?,
            total_po_count: row.try_get("total_po_count")?,
            total_po_value: row.try_get("total_po_value")?,
            delivered_po_count: row.try_get("delivered_po_count")?,
            delivered_po_value: row.try_get("delivered_po_value")?,
            pending_po_value: row.try_get("pending_po_value")?,
            cancelled_po_value: row.try_get("cancelled_po_value")?,
            total_quotation_count: row.try_get("total_quotation_count")?,
            total_quotation_value: row.try_get("total_quotation_value")?,
            approved_quotation_count: row.try_get("approved_quotation_count")?,
            approved_quotation_value: row.try_get("approved_quotation_value")?,
            total_bill_count: row.try_get("total_bill_count")?,
            total_bill_value: row.try_get("total_bill_value")?,
            paid_bill_count: row.try_get("paid_bill_count")?,
            paid_bill_value: row.try_get("paid_bill_value")?,
            pending_payment_value: row.try_get("pending_payment_value")?,
            total_invoice_count: row.try_get("total_invoice_count")?,
            total_invoice_value: row.try_get("total_invoice_value")?,
            paid_invoice_count: row.try_get("paid_invoice_count")?,
            paid_invoice_value: row.try_get("paid_invoice_value")?,
            pending_invoice_value: row.try_get("pending_invoice_value")?,
            active_vendor_count: row.try_get("active_vendor_count")?,
            total_vendor_spend: row.try_get("total_vendor_spend")?,
            budget_utilized: row.try_get("budget_utilized")?,
            budget_utilization_percent: row.try_get("budget_utilization_percent")?,
            projected_profit: row.try_get("projected_profit")?,
            profit_margin_percent: row.try_get("profit_margin_percent")?,
            last_procurement_update: row.try_get("last_procurement_update")?,
            stats_calculated_at: row.try_get("stats_calculated_at")?,
        })
    }
}

#[async_trait]
impl ProjectRepository for ProjectRepositoryImpl {
    async fn find_by_unique_id(
        &self,
        project_unique_id: &str,
    ) -> Result<Option<ProjectModel>, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query("SELECT * FROM projects WHERE project_unique_id = $1")
            .bind(project_unique_id)
            .fetch_optional(&*self.pool)
            .await?;
        row.as_ref().map(ProjectModel::try_from_row).transpose()
    }

    async fn find_active(&self) -> Result<Vec<ProjectModel>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query("SELECT * FROM projects WHERE is_active ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;
        rows.iter().map(ProjectModel::try_from_row).collect()
    }

    async fn create(&self, project: &ProjectModel) -> Result<(), Box<dyn Error + Send + Sync>> {
        // The storage key is assigned by the database; every aggregate
        // column falls back to its zero default.
        sqlx::query(
            r#"
            INSERT INTO projects (
                project_unique_id, project_name, description, location,
                start_date, end_date, status, budget, is_active,
                created_at, updated_at, assigned_to
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&project.project_unique_id)
        .bind(&project.project_name)
        .bind(&project.description)
        .bind(&project.location)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.status)
        .bind(project.budget)
        .bind(project.is_active)
        .bind(project.created_at)
        .bind(project.updated_at)
        .bind(project.assigned_to)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn update_stats(
        &self,
        project: &ProjectModel,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        debug!(project_id = %project.project_unique_id, "persisting project aggregates");
        let result = sqlx::query(
            r#"
            UPDATE projects SET
                total_po_count = $2,
                total_po_value = $3,
                delivered_po_count = $4,
                delivered_po_value = $5,
                pending_po_value = $6,
                cancelled_po_value = $7,
                total_quotation_count = $8,
                total_quotation_value = $9,
                approved_quotation_count = $10,
                approved_quotation_value = $11,
                total_bill_count = $12,
                total_bill_value = $13,
                paid_bill_count = $14,
                paid_bill_value = $15,
                pending_payment_value = $16,
                total_invoice_count = $17,
                total_invoice_value = $18,
                paid_invoice_count = $19,
                paid_invoice_value = $20,
                pending_invoice_value = $21,
                active_vendor_count = $22,
                total_vendor_spend = $23,
                budget_utilized = $24,
                budget_utilization_percent = $25,
                projected_profit = $26,
                profit_margin_percent = $27,
                last_procurement_update = $28,
                stats_calculated_at = $29,
                updated_at = now()
            WHERE project_unique_id = $1
            "#,
        )
        .bind(&project.project_unique_id)
        .bind(project.total_po_count)
        .bind(project.total_po_value)
        .bind(project.delivered_po_count)
        .bind(project.delivered_po_value)
        .bind(project.pending_po_value)
        .bind(project.cancelled_po_value)
        .bind(project.total_quotation_count)
        .bind(project.total_quotation_value)
        .bind(project.approved_quotation_count)
        .bind(project.approved_quotation_value)
        .bind(project.total_bill_count)
        .bind(project.total_bill_value)
        .bind(project.paid_bill_count)
        .bind(project.paid_bill_value)
        .bind(project.pending_payment_value)
        .bind(project.total_invoice_count)
        .bind(project.total_invoice_value)
        .bind(project.paid_invoice_count)
        .bind(project.paid_invoice_value)
        .bind(project.pending_invoice_value)
        .bind(project.active_vendor_count)
        .bind(project.total_vendor_spend)
        .bind(project.budget_utilized)
        .bind(project.budget_utilization_percent)
        .bind(project.projected_profit)
        .bind(project.profit_margin_percent)
        .bind(project.last_procurement_update)
        .bind(project.stats_calculated_at)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(format!("no such project: {}", project.project_unique_id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use crm_core_db::repository::ProjectRepository;

    use crate::repository::test_utils::create_test_project;
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore = "requires PostgreSQL (set DATABASE_URL)"]
    async fn round_trips_a_project_row() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = ctx.repos.project_repository();

        let project = create_test_project(dec!(250000));
        repo.create(&project).await?;

        let loaded = repo
            .find_by_unique_id(&project.project_unique_id)
            .await?
            .expect("project should exist");
        assert_eq!(loaded.project_unique_id, project.project_unique_id);
        assert_eq!(loaded.budget, dec!(250000));
        assert_eq!(loaded.total_po_value, dec!(0));
        assert!(loaded.stats_calculated_at.is_none());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (set DATABASE_URL)"]
    async fn update_stats_persists_aggregates() -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    {
        let ctx = setup_test_context().await?;
        let repo = ctx.repos.project_repository();

        let project = create_test_project(dec!(1000));
        repo.create(&project).await?;

        let mut loaded = repo
            .find_by_unique_id(&project.project_unique_id)
            .await?
            .expect("project should exist");
        loaded.total_po_count = 3;
        loaded.total_po_value = dec!(750.50);
        loaded.stats_calculated_at = Some(Utc::now());
        repo.update_stats(&loaded).await?;

        let reloaded = repo
            .find_by_unique_id(&project.project_unique_id)
            .await?
            .expect("project should exist");
        assert_eq!(reloaded.total_po_count, 3);
        assert_eq!(reloaded.total_po_value, dec!(750.50));
        assert!(reloaded.stats_calculated_at.is_some());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (set DATABASE_URL)"]
    async fn update_stats_rejects_unknown_project(
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = ctx.repos.project_repository();

        let project = create_test_project(dec!(1));
        assert!(repo.update_stats(&project).await.is_err());

        Ok(())
    }
}
