use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crm_core_db::models::billing::invoice::InvoiceModel;
use crm_core_db::repository::InvoiceReader;

use crate::utils::{get_decimal_or_zero, TryFromRow};

pub struct InvoiceReaderImpl {
    pool: Arc<PgPool>,
}

impl InvoiceReaderImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for InvoiceModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(InvoiceModel {
            id: row.try_get("id")?,
            invoice_no: row.try_get("invoice_no")?,
            project_id: row.try_get("project_id")?,
            status: row.try_get("status")?,
            total_amount: row.try_get("total_amount")?,
            invoice_date: row.try_get("invoice_date")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }
}

#[async_trait]
impl InvoiceReader for InvoiceReaderImpl {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM invoices WHERE project_id = $1 AND deleted_at IS NULL",
        )
        .bind(project_id)
        .fetch_one(&*self.pool)
        .await?;
        Ok(row.try_get("count")?)
    }

    async fn sum_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(total_amount), 0) AS total
            FROM invoices
            WHERE project_id = $1 AND deleted_at IS NULL
            "#,
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
            r#"
            SELECT COUNT(*) AS count
            FROM invoices
            WHERE project_id = $1 AND status = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(project_id)
        .bind(status)
        .fetch_one(&*self.pool)
        .await?;
        Ok(row.try_get("count")?)
    }

    async fn sum_amount_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(total_amount), 0) AS total
            FROM invoices
            WHERE project_id = $1 AND status = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(project_id)
        .bind(status)
        .fetch_one(&*self.pool)
        .await?;
        get_decimal_or_zero(&row, "total")
    }

    async fn sum_amount_excluding_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(total_amount), 0) AS total
            FROM invoices
            WHERE project_id = $1 AND status <> $2 AND deleted_at IS NULL
            "#,
        )
        .bind(project_id)
        .bind(status)
        .fetch_one(&*self.pool)
        .await?;
        get_decimal_or_zero(&row, "total")
    }

    async fn find_by_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<InvoiceModel>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT * FROM invoices WHERE project_id = $1 AND deleted_at IS NULL ORDER BY invoice_date",
        )
        .bind(project_id)
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(InvoiceModel::try_from_row).collect()
    }
}
