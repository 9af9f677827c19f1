use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crm_core_db::models::procurement::purchase_order::PurchaseOrderModel;
use crm_core_db::repository::{CategoryValue, PurchaseOrderReader, StatusCount};

use crate::utils::{get_decimal_or_zero, TryFromRow};

pub struct PurchaseOrderReaderImpl {
    pool: Arc<PgPool>,
}

impl PurchaseOrderReaderImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for PurchaseOrderModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(PurchaseOrderModel {
            id: row.try_get("id")?,
            po_no: row.try_get("po_no")?,
            project_id: row.try_get("project_id")?,
            vendor_id: row.try_get("vendor_id")?,
            status: row.try_get("status")?,
            category: row.try_get("category")?,
            total_value: row.try_get("total_value")?,
            total_items_ordered: row.try_get("total_items_ordered")?,
            total_items_delivered: row.try_get("total_items_delivered")?,
            order_date: row.try_get("order_date")?,
            expected_delivery: row.try_get("expected_delivery")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl PurchaseOrderReader for PurchaseOrderReaderImpl {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM purchase_orders WHERE project_id = $1")
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
            "SELECT COALESCE(SUM(total_value), 0) AS total FROM purchase_orders WHERE project_id = $1",
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
            "SELECT COUNT(*) AS count FROM purchase_orders WHERE project_id = $1 AND status = $2",
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
            FROM purchase_orders
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
            FROM purchase_orders
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

    async fn sum_value_grouped_by_category(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<CategoryValue>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COALESCE(SUM(total_value), 0) AS total
            FROM purchase_orders
            WHERE project_id = $1 AND category IS NOT NULL
            GROUP BY category
            ORDER BY total DESC
            LIMIT $2
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                Ok(CategoryValue {
                    category: row.try_get("category")?,
                    value: get_decimal_or_zero(row, "total")?,
                })
            })
            .collect()
    }

    async fn sum_items_ordered(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(total_items_ordered), 0)::BIGINT AS total
            FROM purchase_orders
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .fetch_one(&*self.pool)
        .await?;
        Ok(row.try_get("total")?)
    }

    async fn sum_items_delivered(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(total_items_delivered), 0)::BIGINT AS total
            FROM purchase_orders
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .fetch_one(&*self.pool)
        .await?;
        Ok(row.try_get("total")?)
    }

    async fn count_in_range(
        &self,
        project_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM purchase_orders
            WHERE project_id = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
        .bind(project_id)
        .bind(start)
        .bind(end)
        .fetch_one(&*self.pool)
        .await?;
        Ok(row.try_get("count")?)
    }

    async fn sum_value_in_range(
        &self,
        project_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(total_value), 0) AS total
            FROM purchase_orders
            WHERE project_id = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
        .bind(project_id)
        .bind(start)
        .bind(end)
        .fetch_one(&*self.pool)
        .await?;
        get_decimal_or_zero(&row, "total")
    }

    async fn find_recent(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<PurchaseOrderModel>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT * FROM purchase_orders WHERE project_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(PurchaseOrderModel::try_from_row).collect()
    }

    async fn find_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Vec<PurchaseOrderModel>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT * FROM purchase_orders WHERE project_id = $1 AND status = $2 ORDER BY id",
        )
        .bind(project_id)
        .bind(status)
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(PurchaseOrderModel::try_from_row).collect()
    }

    async fn count_by_vendor(&self, vendor_id: i64) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM purchase_orders WHERE vendor_id = $1")
            .bind(vendor_id)
            .fetch_one(&*self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crm_core_db::models::procurement::purchase_order::po_status;
    use crm_core_db::repository::{ProjectRepository, PurchaseOrderReader};

    use crate::repository::test_utils::{create_test_project, insert_test_purchase_order};
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore = "requires PostgreSQL (set DATABASE_URL)"]
    async fn sums_default_to_zero_for_empty_projects(
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let project = create_test_project(dec!(1000));
        ctx.repos.project_repository().create(&project).await?;

        let reader = ctx.repos.purchase_order_reader();
        assert_eq!(reader.count_by_project(&project.project_unique_id).await?, 0);
        assert_eq!(
            reader.sum_value_by_project(&project.project_unique_id).await?,
            dec!(0)
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (set DATABASE_URL)"]
    async fn aggregates_filter_by_status() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let project = create_test_project(dec!(1000));
        let pid = project.project_unique_id.clone();
        ctx.repos.project_repository().create(&project).await?;

        insert_test_purchase_order(&ctx.pool, &pid, po_status::DELIVERED, dec!(500)).await?;
        insert_test_purchase_order(&ctx.pool, &pid, po_status::ORDERED, dec!(300)).await?;
        insert_test_purchase_order(&ctx.pool, &pid, po_status::CANCELLED, dec!(200)).await?;

        let reader = ctx.repos.purchase_order_reader();
        assert_eq!(reader.count_by_project(&pid).await?, 3);
        assert_eq!(reader.sum_value_by_project(&pid).await?, dec!(1000));
        assert_eq!(
            reader
                .sum_value_by_project_and_status(&pid, po_status::DELIVERED)
                .await?,
            dec!(500)
        );

        let grouped = reader.count_grouped_by_status(&pid).await?;
        assert_eq!(grouped.len(), 3);
        assert!(grouped.iter().all(|g| g.count == 1));

        Ok(())
    }
}
