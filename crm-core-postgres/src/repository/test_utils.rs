//! Row factories for DB-backed tests.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crm_core_db::models::project::{ProjectModel, ProjectStatus};

use crate::test_helper::random;

pub fn create_test_project(budget: Decimal) -> ProjectModel {
    ProjectModel::new(
        0,
        format!("PRJ-{}", random(10)),
        format!("Test Project {}", random(5)),
        ProjectStatus::InProgress,
        budget,
    )
}

pub async fn insert_test_purchase_order(
    pool: &PgPool,
    project_id: &str,
    status: &str,
    value: Decimal,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    sqlx::query(
        r#"
        INSERT INTO purchase_orders (po_no, project_id, vendor_id, status, total_value)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(format!("PO-{}", random(8)))
    .bind(project_id)
    .bind(1_i64)
    .bind(status)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}
