use std::error::Error;

use async_trait::async_trait;

use crate::models::billing::payment::PaymentModel;
use crate::repository::types::{MethodTotal, MonthTotal};

/// Read-only aggregate queries over received payments.
#[async_trait]
pub trait PaymentReader: Send + Sync {
    /// Most recent payments, newest first.
    async fn find_recent(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<PaymentModel>, Box<dyn Error + Send + Sync>>;

    /// Received value and count per payment method.
    async fn method_distribution(
        &self,
        project_id: &str,
    ) -> Result<Vec<MethodTotal>, Box<dyn Error + Send + Sync>>;

    /// Monthly received totals, oldest first, at most `months` rows.
    async fn monthly_totals(
        &self,
        project_id: &str,
        months: i64,
    ) -> Result<Vec<MonthTotal>, Box<dyn Error + Send + Sync>>;
}
