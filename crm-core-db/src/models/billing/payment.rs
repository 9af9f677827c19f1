use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment received from the client against a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentModel {
    pub id: i64,
    pub project_id: String,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_date: DateTime<Utc>,
    pub transaction_reference: Option<String>,
}
