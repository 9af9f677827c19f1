use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crm_core_db::models::billing::bill::BillModel;
use crm_core_db::repository::BillReader;

use crate::utils::{get_decimal_or_zero, TryFromRow};

pub struct BillReaderImpl {
    pool: Arc<PgPool>,
}

impl BillReaderImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for BillModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(BillModel {
            id: row.try_get("id")?,
            bill_no: row.try_get("bill_no")?,
            project_id: row.try_get("project_id")?,
            vendor_id: row.try_get("vendor_id")?,
            status: row.try_get("status")?,
            total_amount: row.try_get("total_amount")?,
            paid_amount: row.try_get("paid_amount")?,
            balance_amount: row.try_get("balance_amount")?,
            bill_date: row.try_get("bill_date")?,
        })
    }
}

#[async_trait]
impl BillReader for BillReaderImpl {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM bills WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&*self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn sum_total_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(total_amount), 0) AS total FROM bills WHERE project_id = $1",
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
            "SELECT COUNT(*) AS count FROM bills WHERE project_id = $1 AND status = $2",
        )
        .bind(project_id)
        .bind(status)
        .fetch_one(&*self.pool)
        .await?;
        Ok(row.try_get("count")?)
    }

    async fn sum_paid_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(paid_amount), 0) AS total FROM bills WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&*self.pool)
        .await?;
        get_decimal_or_zero(&row, "total")
    }

    async fn sum_balance_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(balance_amount), 0) AS total FROM bills WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&*self.pool)
        .await?;
        get_decimal_or_zero(&row, "total")
    }

    async fn find_by_project_excluding_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Vec<BillModel>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT * FROM bills WHERE project_id = $1 AND status <> $2 ORDER BY bill_date",
        )
        .bind(project_id)
        .bind(status)
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(BillModel::try_from_row).collect()
    }
}
