use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crm_core_db::models::procurement::vendor::VendorModel;
use crm_core_db::repository::VendorReader;

use crate::utils::{get_decimal_or_zero, TryFromRow};

pub struct VendorReaderImpl {
    pool: Arc<PgPool>,
}

impl VendorReaderImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for VendorModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(VendorModel {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            project_id: row.try_get("project_id")?,
            status: row.try_get("status")?,
            rating: row.try_get("rating")?,
            total_purchase_value: row.try_get("total_purchase_value")?,
            last_purchase_amount: row.try_get("last_purchase_amount")?,
        })
    }
}

#[async_trait]
impl VendorReader for VendorReaderImpl {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM vendors WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&*self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn count_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM vendors WHERE project_id = $1 AND status = $2",
        )
        .bind(project_id)
        .bind(status)
        .fetch_one(&*self.pool)
        .await?;
        Ok(row.try_get("count")?)
    }

    async fn sum_purchase_value_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(total_purchase_value), 0) AS total
            FROM vendors
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .fetch_one(&*self.pool)
        .await?;
        get_decimal_or_zero(&row, "total")
    }

    async fn average_rating_by_project(
        &self,
        project_id: &str,
    ) -> Result<Option<Decimal>, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT AVG(rating) AS average FROM vendors WHERE project_id = $1 AND rating IS NOT NULL",
        )
        .bind(project_id)
        .fetch_one(&*self.pool)
        .await?;
        Ok(row.try_get("average")?)
    }

    async fn find_top_by_purchase_value(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<VendorModel>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            r#"
            SELECT *
            FROM vendors
            WHERE project_id = $1
            ORDER BY total_purchase_value DESC
            LIMIT $2
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(VendorModel::try_from_row).collect()
    }
}
