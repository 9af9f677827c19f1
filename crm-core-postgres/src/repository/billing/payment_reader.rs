use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crm_core_db::models::billing::payment::PaymentModel;
use crm_core_db::repository::{MethodTotal, MonthTotal, PaymentReader};

use crate::utils::{get_decimal_or_zero, TryFromRow};

pub struct PaymentReaderImpl {
    pool: Arc<PgPool>,
}

impl PaymentReaderImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for PaymentModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(PaymentModel {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            amount: row.try_get("amount")?,
            payment_method: row.try_get("payment_method")?,
            payment_date: row.try_get("payment_date")?,
            transaction_reference: row.try_get("transaction_reference")?,
        })
    }
}

#[async_trait]
impl PaymentReader for PaymentReaderImpl {
    async fn find_recent(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<PaymentModel>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT * FROM payment_history WHERE project_id = $1 ORDER BY payment_date DESC LIMIT $2",
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(PaymentModel::try_from_row).collect()
    }

    async fn method_distribution(
        &self,
        project_id: &str,
    ) -> Result<Vec<MethodTotal>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            r#"
            SELECT payment_method, COALESCE(SUM(amount), 0) AS total, COUNT(*) AS count
            FROM payment_history
            WHERE project_id = $1
            GROUP BY payment_method
            ORDER BY payment_method
            "#,
        )
        .bind(project_id)
        .fetch_all(&*self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                Ok(MethodTotal {
                    method: row.try_get("payment_method")?,
                    value: get_decimal_or_zero(row, "total")?,
                    count: row.try_get("count")?,
                })
            })
            .collect()
    }

    async fn monthly_totals(
        &self,
        project_id: &str,
        months: i64,
    ) -> Result<Vec<MonthTotal>, Box<dyn Error + Send + Sync>> {
        // Trailing window: newest months first in SQL, then restored to
        // chronological order.
        let rows = sqlx::query(
            r#"
            SELECT to_char(payment_date, 'YYYY-MM') AS month,
                   COALESCE(SUM(amount), 0) AS total,
                   COUNT(*) AS count
            FROM payment_history
            WHERE project_id = $1
            GROUP BY 1
            ORDER BY 1 DESC
            LIMIT $2
            "#,
        )
        .bind(project_id)
        .bind(months)
        .fetch_all(&*self.pool)
        .await?;

        let mut totals: Vec<MonthTotal> = rows
            .iter()
            .map(|row| {
                Ok::<MonthTotal, Box<dyn Error + Send + Sync>>(MonthTotal {
                    month: row.try_get("month")?,
                    value: get_decimal_or_zero(row, "total")?,
                    count: row.try_get("count")?,
                })
            })
            .collect::<Result<_, _>>()?;
        totals.reverse();
        Ok(totals)
    }
}
