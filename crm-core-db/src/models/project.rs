use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "PascalCase")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Planning => write!(f, "Planning"),
            ProjectStatus::InProgress => write!(f, "InProgress"),
            ProjectStatus::Completed => write!(f, "Completed"),
            ProjectStatus::OnHold => write!(f, "OnHold"),
            ProjectStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Planning" => Ok(ProjectStatus::Planning),
            "InProgress" => Ok(ProjectStatus::InProgress),
            "Completed" => Ok(ProjectStatus::Completed),
            "OnHold" => Ok(ProjectStatus::OnHold),
            "Cancelled" => Ok(ProjectStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// The aggregation root. The derived fields below are a denormalized cache
/// of source-domain data; they may transiently diverge and are reconciled
/// by full recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectModel {
    pub id: i64,
    /// External unique id, distinct from the storage key.
    pub project_unique_id: String,
    pub project_name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub budget: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_to: Option<i64>,

    // Purchase order aggregates
    pub total_po_count: i32,
    pub total_po_value: Decimal,
    pub delivered_po_count: i32,
    pub delivered_po_value: Decimal,
    pub pending_po_value: Decimal,
    pub cancelled_po_value: Decimal,

    // Quotation aggregates
    pub total_quotation_count: i32,
    pub total_quotation_value: Decimal,
    pub approved_quotation_count: i32,
    pub approved_quotation_value: Decimal,

    // Bill aggregates (vendor-side spend)
    pub total_bill_count: i32,
    pub total_bill_value: Decimal,
    pub paid_bill_count: i32,
    pub paid_bill_value: Decimal,
    pub pending_payment_value: Decimal,

    // Invoice aggregates (client-side billing)
    pub total_invoice_count: i32,
    pub total_invoice_value: Decimal,
    pub paid_invoice_count: i32,
    pub paid_invoice_value: Decimal,
    pub pending_invoice_value: Decimal,

    // Vendor aggregates
    pub active_vendor_count: i32,
    pub total_vendor_spend: Decimal,

    // Derived financial metrics
    pub budget_utilized: Decimal,
    pub budget_utilization_percent: Decimal,
    pub projected_profit: Decimal,
    pub profit_margin_percent: Decimal,

    pub last_procurement_update: Option<DateTime<Utc>>,
    pub stats_calculated_at: Option<DateTime<Utc>>,
}

impl ProjectModel {
    /// New project with every aggregate zero-initialized. No aggregate field
    /// is ever null: calculation passes assign all of them.
    pub fn new(
        id: i64,
        project_unique_id: impl Into<String>,
        project_name: impl Into<String>,
        status: ProjectStatus,
        budget: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            project_unique_id: project_unique_id.into(),
            project_name: project_name.into(),
            description: None,
            location: None,
            start_date: None,
            end_date: None,
            status,
            budget,
            is_active: true,
            created_at: now,
            updated_at: now,
            assigned_to: None,
            total_po_count: 0,
            total_po_value: Decimal::ZERO,
            delivered_po_count: 0,
            delivered_po_value: Decimal::ZERO,
            pending_po_value: Decimal::ZERO,
            cancelled_po_value: Decimal::ZERO,
            total_quotation_count: 0,
            total_quotation_value: Decimal::ZERO,
            approved_quotation_count: 0,
            approved_quotation_value: Decimal::ZERO,
            total_bill_count: 0,
            total_bill_value: Decimal::ZERO,
            paid_bill_count: 0,
            paid_bill_value: Decimal::ZERO,
            pending_payment_value: Decimal::ZERO,
            total_invoice_count: 0,
            total_invoice_value: Decimal::ZERO,
            paid_invoice_count: 0,
            paid_invoice_value: Decimal::ZERO,
            pending_invoice_value: Decimal::ZERO,
            active_vendor_count: 0,
            total_vendor_spend: Decimal::ZERO,
            budget_utilized: Decimal::ZERO,
            budget_utilization_percent: Decimal::ZERO,
            projected_profit: Decimal::ZERO,
            profit_margin_percent: Decimal::ZERO,
            last_procurement_update: None,
            stats_calculated_at: None,
        }
    }

    /// Stats are stale when never calculated or older than the cutoff.
    pub fn stats_older_than(&self, cutoff: DateTime<Utc>) -> bool {
        match self.stats_calculated_at {
            None => true,
            Some(at) => at < cutoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn new_project_zero_initializes_aggregates() {
        let project = ProjectModel::new(1, "PRJ-0001", "Warehouse fit-out", ProjectStatus::Planning, dec!(100000));
        assert_eq!(project.total_po_value, Decimal::ZERO);
        assert_eq!(project.pending_payment_value, Decimal::ZERO);
        assert_eq!(project.profit_margin_percent, Decimal::ZERO);
        assert!(project.is_active);
        assert!(project.stats_calculated_at.is_none());
    }

    #[test]
    fn stats_older_than_handles_missing_timestamp() {
        let mut project =
            ProjectModel::new(1, "PRJ-0001", "Warehouse fit-out", ProjectStatus::InProgress, dec!(1));
        let cutoff = Utc::now() - Duration::hours(24);
        assert!(project.stats_older_than(cutoff));

        project.stats_calculated_at = Some(Utc::now());
        assert!(!project.stats_older_than(cutoff));

        project.stats_calculated_at = Some(cutoff - Duration::hours(1));
        assert!(project.stats_older_than(cutoff));
    }

    #[test]
    fn project_status_round_trips_through_str() {
        for status in [
            ProjectStatus::Planning,
            ProjectStatus::InProgress,
            ProjectStatus::Completed,
            ProjectStatus::OnHold,
            ProjectStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<ProjectStatus>(), Ok(status));
        }
        assert!("Unknown".parse::<ProjectStatus>().is_err());
    }
}
