use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crm_core_db::models::procurement::quotation::QuotationModel;
use crm_core_db::repository::{QuotationReader, StatusCount};

use crate::utils::{get_decimal_or_zero, TryFromRow};

pub struct QuotationReaderImpl {
    pool: Arc<PgPool>,
}

impl QuotationReaderImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for QuotationModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(QuotationModel {
            id: row.try_get("id")?,
            quote_no: row.try_get("quote_no")?,
            project_id: row.try_get("project_id")?,
            status: row.try_get("status")?,
            total_value: row.try_get("total_value")?,
            uploaded_at: row.try_get("uploaded_at")?,
        })
    }
}

#[async_trait]
impl QuotationReader for QuotationReaderImpl {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM quotations WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&*self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn sum_value_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(total_value), 0) AS total FROM quotations WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&*self.pool)
        .await?;
        get_decimal_or_zero(&row, "total")
    }

    async fn count_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM quotations WHERE project_id = $1 AND status = $2",
        )
        .bind(project_id)
        .bind(status)
        .fetch_one(&*self.pool)
        .await?;
        Ok(row.try_get("count")?)
    }

    async fn sum_value_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(total_value), 0) AS total
            FROM quotations
            WHERE project_id = $1 AND status = $2
            "#,
        )
        .bind(project_id)
        .bind(status)
        .fetch_one(&*self.pool)
        .await?;
        get_decimal_or_zero(&row, "total")
    }

    async fn count_grouped_by_status(
        &self,
        project_id: &str,
    ) -> Result<Vec<StatusCount>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS count
            FROM quotations
            WHERE project_id = $1
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(project_id)
        .fetch_all(&*self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                Ok(StatusCount {
                    status: row.try_get("status")?,
                    count: row.try_get("count")?,
                })
            })
            .collect()
    }

    async fn find_recent(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<QuotationModel>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT * FROM quotations WHERE project_id = $1 ORDER BY uploaded_at DESC LIMIT $2",
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(QuotationModel::try_from_row).collect()
    }
}
