use std::error::Error;

use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::Row;

/// A trait for converting a database row into a model.
pub trait TryFromRow<R>: Sized {
    /// Performs the conversion.
    fn try_from_row(row: &R) -> Result<Self, Box<dyn Error + Send + Sync>>;
}

/// Reads a NUMERIC column that may be null, defaulting to zero. Aggregate
/// callers must never see an absent domain total.
pub fn get_decimal_or_zero(
    row: &PgRow,
    col_name: &str,
) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
    let value: Option<Decimal> = row.try_get(col_name)?;
    Ok(value.unwrap_or(Decimal::ZERO))
}
