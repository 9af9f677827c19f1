use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Count of rows per status value for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Summed value per spend category for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    pub category: String,
    pub value: Decimal,
}

/// Value and row count per payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodTotal {
    pub method: String,
    pub value: Decimal,
    pub count: i64,
}

/// Value and row count per calendar month, keyed `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub month: String,
    pub value: Decimal,
    pub count: i64,
}
