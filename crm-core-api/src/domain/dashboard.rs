use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A dashboard sub-section that degrades to a tagged placeholder instead of
/// failing the whole request when its backing query errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Section<T> {
    Ready { data: T },
    Degraded { reason: String },
}

impl<T> Section<T> {
    pub fn ready(data: T) -> Self {
        Section::Ready { data }
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Section::Degraded {
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Section::Degraded { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Ready { data } => Some(data),
            Section::Degraded { .. } => None,
        }
    }
}

/// Composite read view for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDashboard {
    pub project_id: String,
    pub project_name: String,
    pub location: Option<String>,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager: String,
    pub budget: Decimal,
    pub financial_data: FinancialData,
    pub procurement_data: ProcurementData,
    pub recent_activities: Section<Vec<ActivityEntry>>,
    pub top_vendors: Section<Vec<VendorSummary>>,
    pub spending_trend: Section<Vec<SpendingTrendPoint>>,
    pub project_timeline: Section<Vec<TimelineMilestone>>,
    pub payment_method_distribution: Section<Vec<ChartSlice>>,
    pub payment_timeline: Section<Vec<PaymentTrendPoint>>,
    pub last_update: Option<DateTime<Utc>>,
    pub stats_calculated_at: Option<DateTime<Utc>>,
}

/// Financial metrics on the cash basis: spend is money actually paid to
/// vendors, profit switches to realized once the project completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialData {
    pub total_project_value: Decimal,
    pub total_spent: Decimal,
    pub total_committed: Decimal,
    pub remaining: Decimal,

    // Client billing (invoices)
    pub amount_to_be_received: Decimal,
    pub amount_received: Decimal,
    pub pending_receipts: Decimal,
    pub billing_percentage: Decimal,

    // Vendor payments (bills)
    pub total_payable: Decimal,
    pub amount_paid: Decimal,
    pub pending_payments: Decimal,
    pub payment_percentage: Decimal,

    // Profit
    pub projected_profit: Decimal,
    pub profit_margin: Decimal,
    pub is_completed: bool,

    // Budget
    pub budget_utilized: Decimal,
    pub budget_utilization_percent: Decimal,

    // Cash flow
    pub cash_in_hand: Decimal,
    pub cash_deficit: Decimal,
    pub burn_rate: Decimal,
}

/// Procurement breakdown: live status counts on top of the stored aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcurementData {
    pub total_pos: i64,
    pub total_po_value: Decimal,
    pub avg_po_value: Decimal,
    pub draft_pos: i64,
    pub approved_pos: i64,
    pub ordered_pos: i64,
    pub in_transit_pos: i64,
    pub delivered_pos: i64,
    pub cancelled_pos: i64,
    pub total_items_ordered: i64,
    pub total_items_delivered: i64,
    pub delivery_rate: Decimal,
    pub total_quotations: i64,
    pub total_quotation_value: Decimal,
    pub new_quotations: i64,
    pub under_review_quotations: i64,
    pub approved_quotations: i64,
    pub rejected_quotations: i64,
    pub total_vendors: i64,
    pub active_vendors: i64,
    pub total_vendor_spend: Decimal,
    pub avg_vendor_rating: Decimal,
    pub pos_by_status: Vec<ChartSlice>,
    pub quotations_by_status: Vec<ChartSlice>,
    pub category_distribution: Vec<ChartSlice>,
}

/// One entry of the merged recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub action: String,
    pub status: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSummary {
    pub id: i64,
    pub name: String,
    pub total_orders: i64,
    pub rating: Decimal,
    pub total_purchase_value: Decimal,
}

/// One calendar month of the trailing spending trend. Months without orders
/// report zero spend and zero average, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingTrendPoint {
    pub month: String,
    pub spending: Decimal,
    pub orders: i64,
    pub avg_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineMilestone {
    pub date: Option<NaiveDate>,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub amount: Option<Decimal>,
    pub reference: Option<String>,
}

/// Generic name/value pair for status, category and payment-method charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTrendPoint {
    pub month: String,
    pub total_amount: Decimal,
    pub payment_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_serializes_with_state_tag() {
        let ready: Section<Vec<ChartSlice>> = Section::ready(vec![]);
        let json = serde_json::to_value(&ready).unwrap();
        assert_eq!(json["state"], "ready");

        let degraded: Section<Vec<ChartSlice>> = Section::degraded("query failed");
        let json = serde_json::to_value(&degraded).unwrap();
        assert_eq!(json["state"], "degraded");
        assert_eq!(json["reason"], "query failed");
    }

    #[test]
    fn degraded_section_has_no_data() {
        let section: Section<Vec<ActivityEntry>> = Section::degraded("unavailable");
        assert!(section.is_degraded());
        assert!(section.data().is_none());
    }
}
