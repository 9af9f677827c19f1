use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crm_core_api::{
    ActivityEntry, ApiError, ApiResult, ChartSlice, FinancialData, PaymentTrendPoint,
    ProcurementData, ProjectDashboard, ProjectDashboardService, Section, SpendingTrendPoint,
    TimelineMilestone, VendorSummary,
};
use crm_core_db::models::billing::bill::bill_status;
use crm_core_db::models::billing::invoice::invoice_status;
use crm_core_db::models::project::{ProjectModel, ProjectStatus};
use crm_core_db::models::procurement::purchase_order::po_status;
use crm_core_db::models::procurement::quotation::quotation_status;
use crm_core_db::repository::{
    BillReader, InvoiceReader, PaymentReader, ProjectRepository, PurchaseOrderReader,
    QuotationReader, StatusCount, VendorReader,
};

use crate::financial::{percent_of, ratio_of, round_money, CashBasisMetrics, FinancialMetrics};
use crate::stats::locks::ProjectLocks;

const RECENT_ACTIVITY_LIMIT: usize = 10;
const TOP_VENDOR_LIMIT: i64 = 5;
const CATEGORY_LIMIT: i64 = 5;
const SPENDING_TREND_MONTHS: u32 = 6;
const PAYMENT_TREND_MONTHS: i64 = 12;

/// Builds the composite dashboard view from the stored project record plus
/// fresh cross-domain queries.
///
/// Composing the financial section recomputes the cash-basis metrics and
/// persists them, so reading the dashboard is not purely read-only.
pub struct DashboardComposer {
    projects: Arc<dyn ProjectRepository>,
    purchase_orders: Arc<dyn PurchaseOrderReader>,
    quotations: Arc<dyn QuotationReader>,
    bills: Arc<dyn BillReader>,
    vendors: Arc<dyn VendorReader>,
    invoices: Arc<dyn InvoiceReader>,
    payments: Arc<dyn PaymentReader>,
    metrics: Arc<dyn FinancialMetrics>,
    locks: Arc<ProjectLocks>,
}

impl DashboardComposer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        purchase_orders: Arc<dyn PurchaseOrderReader>,
        quotations: Arc<dyn QuotationReader>,
        bills: Arc<dyn BillReader>,
        vendors: Arc<dyn VendorReader>,
        invoices: Arc<dyn InvoiceReader>,
        payments: Arc<dyn PaymentReader>,
        locks: Arc<ProjectLocks>,
    ) -> Self {
        Self {
            projects,
            purchase_orders,
            quotations,
            bills,
            vendors,
            invoices,
            payments,
            metrics: Arc::new(CashBasisMetrics),
            locks,
        }
    }

    /// Replace the dashboard financial formula.
    pub fn with_metrics(mut self, metrics: Arc<dyn FinancialMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    async fn load_project(&self, project_unique_id: &str) -> ApiResult<ProjectModel> {
        self.projects
            .find_by_unique_id(project_unique_id)
            .await
            .map_err(ApiError::database)?
            .ok_or_else(|| ApiError::NotFound(format!("Project not found: {project_unique_id}")))
    }

    fn section<T>(name: &str, result: ApiResult<T>) -> Section<T> {
        match result {
            Ok(data) => Section::ready(data),
            Err(err) => {
                warn!(section = name, error = %err, "dashboard section degraded");
                Section::degraded(err.to_string())
            }
        }
    }

    /// Cash-basis financial view. Persists the recomputed metric subset as a
    /// side effect; a failed persist degrades to a warning, never a request
    /// failure.
    async fn build_financial_data(&self, project: &mut ProjectModel) -> FinancialData {
        let budget = project.budget;
        let is_completed = project.status == ProjectStatus::Completed;
        let paid_invoice_value = project.paid_invoice_value;
        let total_bill_value = project.total_bill_value;
        let paid_bill_value = project.paid_bill_value;
        let pending_payment_value = project.pending_payment_value;
        let amount_spent = paid_bill_value;

        self.metrics.apply(project);
        project.stats_calculated_at = Some(Utc::now());

        {
            let _guard = self.locks.acquire(&project.project_unique_id).await;
            if let Err(err) = self.projects.update_stats(project).await {
                warn!(
                    project_id = %project.project_unique_id,
                    error = %err,
                    "could not persist recomputed financial metrics"
                );
            }
        }

        let mut cash_in_hand = paid_invoice_value - paid_bill_value;
        let mut cash_deficit = Decimal::ZERO;
        if cash_in_hand < Decimal::ZERO {
            cash_deficit = cash_in_hand.abs();
            cash_in_hand = Decimal::ZERO;
        }

        FinancialData {
            total_project_value: budget,
            total_spent: amount_spent,
            total_committed: project.total_po_value,
            remaining: budget - amount_spent,
            amount_to_be_received: budget,
            amount_received: paid_invoice_value,
            pending_receipts: budget - paid_invoice_value,
            billing_percentage: percent_of(paid_invoice_value, budget),
            total_payable: total_bill_value,
            amount_paid: paid_bill_value,
            pending_payments: pending_payment_value,
            payment_percentage: percent_of(paid_bill_value, total_bill_value),
            projected_profit: project.projected_profit,
            profit_margin: project.profit_margin_percent,
            is_completed,
            budget_utilized: project.budget_utilized,
            budget_utilization_percent: project.budget_utilization_percent,
            cash_in_hand,
            cash_deficit,
            burn_rate: ratio_of(amount_spent, budget),
        }
    }

    async fn build_procurement_data(&self, project: &ProjectModel) -> ApiResult<ProcurementData> {
        let project_id = project.project_unique_id.as_str();

        let po_by_status = self
            .purchase_orders
            .count_grouped_by_status(project_id)
            .await
            .map_err(ApiError::database)?;
        let quotations_by_status = self
            .quotations
            .count_grouped_by_status(project_id)
            .await
            .map_err(ApiError::database)?;
        let category_spend = self
            .purchase_orders
            .sum_value_grouped_by_category(project_id, CATEGORY_LIMIT)
            .await
            .map_err(ApiError::database)?;

        let items_ordered = self
            .purchase_orders
            .sum_items_ordered(project_id)
            .await
            .map_err(ApiError::database)?;
        let items_delivered = self
            .purchase_orders
            .sum_items_delivered(project_id)
            .await
            .map_err(ApiError::database)?;
        let delivery_rate = percent_of(Decimal::from(items_delivered), Decimal::from(items_ordered));

        let avg_po_value = if project.total_po_count > 0 {
            round_money(project.total_po_value / Decimal::from(project.total_po_count))
        } else {
            Decimal::ZERO
        };

        let total_vendors = self
            .vendors
            .count_by_project(project_id)
            .await
            .map_err(ApiError::database)?;
        let avg_vendor_rating = self
            .vendors
            .average_rating_by_project(project_id)
            .await
            .map_err(ApiError::database)?
            .map(round_money)
            .unwrap_or(Decimal::ZERO);

        Ok(ProcurementData {
            total_pos: i64::from(project.total_po_count),
            total_po_value: project.total_po_value,
            avg_po_value,
            draft_pos: count_for(&po_by_status, po_status::DRAFT),
            approved_pos: count_for(&po_by_status, po_status::APPROVED),
            ordered_pos: count_for(&po_by_status, po_status::ORDERED),
            in_transit_pos: count_for(&po_by_status, po_status::IN_TRANSIT),
            delivered_pos: i64::from(project.delivered_po_count),
            cancelled_pos: count_for(&po_by_status, po_status::CANCELLED),
            total_items_ordered: items_ordered,
            total_items_delivered: items_delivered,
            delivery_rate,
            total_quotations: i64::from(project.total_quotation_count),
            total_quotation_value: project.total_quotation_value,
            new_quotations: count_for(&quotations_by_status, quotation_status::NEW),
            under_review_quotations: count_for(&quotations_by_status, quotation_status::UNDER_REVIEW),
            approved_quotations: i64::from(project.approved_quotation_count),
            rejected_quotations: count_for(&quotations_by_status, quotation_status::REJECTED),
            total_vendors,
            active_vendors: i64::from(project.active_vendor_count),
            total_vendor_spend: project.total_vendor_spend,
            avg_vendor_rating,
            pos_by_status: status_slices(&po_by_status),
            quotations_by_status: status_slices(&quotations_by_status),
            category_distribution: category_spend
                .into_iter()
                .map(|c| ChartSlice {
                    name: c.category,
                    value: c.value,
                    count: None,
                })
                .collect(),
        })
    }

    async fn build_recent_activities(&self, project_id: &str) -> ApiResult<Vec<ActivityEntry>> {
        let mut activities = Vec::new();

        for po in self
            .purchase_orders
            .find_recent(project_id, 5)
            .await
            .map_err(ApiError::database)?
        {
            activities.push(ActivityEntry {
                activity_type: "Purchase Order".to_string(),
                action: format!("PO {} {}", po.po_no, po.status.to_lowercase()),
                status: po.status,
                amount: po.total_value,
                date: po.created_at,
                reference: Some(po.po_no),
            });
        }

        for quotation in self
            .quotations
            .find_recent(project_id, 5)
            .await
            .map_err(ApiError::database)?
        {
            activities.push(ActivityEntry {
                activity_type: "Quotation".to_string(),
                action: format!(
                    "Quotation {} {}",
                    quotation.quote_no,
                    quotation.status.to_lowercase()
                ),
                status: quotation.status,
                amount: quotation.total_value,
                date: quotation.uploaded_at,
                reference: Some(quotation.quote_no),
            });
        }

        for payment in self
            .payments
            .find_recent(project_id, RECENT_ACTIVITY_LIMIT as i64)
            .await
            .map_err(ApiError::database)?
        {
            activities.push(ActivityEntry {
                activity_type: "Payment Received".to_string(),
                action: format!("Payment via {}", payment.payment_method),
                status: "Completed".to_string(),
                amount: payment.amount,
                date: payment.payment_date,
                reference: payment.transaction_reference,
            });
        }

        activities.sort_by(|a, b| b.date.cmp(&a.date));
        activities.truncate(RECENT_ACTIVITY_LIMIT);
        Ok(activities)
    }

    async fn build_top_vendors(&self, project_id: &str) -> ApiResult<Vec<VendorSummary>> {
        let vendors = self
            .vendors
            .find_top_by_purchase_value(project_id, TOP_VENDOR_LIMIT)
            .await
            .map_err(ApiError::database)?;

        let mut summaries = Vec::with_capacity(vendors.len());
        for vendor in vendors {
            let total_orders = self
                .purchase_orders
                .count_by_vendor(vendor.id)
                .await
                .map_err(ApiError::database)?;
            summaries.push(VendorSummary {
                id: vendor.id,
                name: vendor.name,
                total_orders,
                rating: vendor.rating.unwrap_or(Decimal::ZERO),
                total_purchase_value: vendor.total_purchase_value,
            });
        }
        Ok(summaries)
    }

    /// Exactly one point per trailing calendar month, oldest first. Months
    /// without orders report zero spend and zero average.
    async fn build_spending_trend(&self, project_id: &str) -> ApiResult<Vec<SpendingTrendPoint>> {
        let today = Utc::now().date_naive();
        let current_month = month_start(today)?;

        let mut trend = Vec::with_capacity(SPENDING_TREND_MONTHS as usize);
        for back in (0..SPENDING_TREND_MONTHS).rev() {
            let start = current_month
                .checked_sub_months(Months::new(back))
                .ok_or_else(|| ApiError::InternalError("month arithmetic overflow".to_string()))?;
            let end = start
                .checked_add_months(Months::new(1))
                .ok_or_else(|| ApiError::InternalError("month arithmetic overflow".to_string()))?;
            let start_at = month_boundary(start);
            let end_at = month_boundary(end);

            let spending = self
                .purchase_orders
                .sum_value_in_range(project_id, start_at, end_at)
                .await
                .map_err(ApiError::database)?;
            let orders = self
                .purchase_orders
                .count_in_range(project_id, start_at, end_at)
                .await
                .map_err(ApiError::database)?;
            let avg_order_value = if orders > 0 {
                round_money(spending / Decimal::from(orders))
            } else {
                Decimal::ZERO
            };

            trend.push(SpendingTrendPoint {
                month: start.format("%b %y").to_string(),
                spending,
                orders,
                avg_order_value,
            });
        }
        Ok(trend)
    }

    async fn build_timeline(&self, project: &ProjectModel) -> ApiResult<Vec<TimelineMilestone>> {
        let project_id = project.project_unique_id.as_str();
        let mut timeline = Vec::new();

        if let Some(start) = project.start_date {
            timeline.push(TimelineMilestone {
                date: Some(start),
                title: "Project Kickoff".to_string(),
                description: format!("{} started", project.project_name),
                kind: "milestone".to_string(),
                status: "completed".to_string(),
                amount: None,
                reference: None,
            });
        }

        for po in self
            .purchase_orders
            .find_by_project_and_status(project_id, po_status::DELIVERED)
            .await
            .map_err(ApiError::database)?
        {
            let date = po
                .expected_delivery
                .or(po.order_date)
                .map(|at| at.date_naive());
            timeline.push(TimelineMilestone {
                date,
                title: "PO Delivered".to_string(),
                description: format!("PO {} delivered", po.po_no),
                kind: "po_delivered".to_string(),
                status: "completed".to_string(),
                amount: Some(po.total_value),
                reference: Some(po.po_no),
            });
        }

        for bill in self
            .bills
            .find_by_project_excluding_status(project_id, bill_status::PENDING)
            .await
            .map_err(ApiError::database)?
        {
            let paid = bill.status == bill_status::PAID;
            timeline.push(TimelineMilestone {
                date: bill.bill_date,
                title: if paid { "Bill Paid" } else { "Bill Received" }.to_string(),
                description: format!("Bill {} - {}", bill.bill_no, bill.status),
                kind: if paid { "bill_paid" } else { "bill_received" }.to_string(),
                status: if paid { "completed" } else { "in-progress" }.to_string(),
                amount: Some(bill.total_amount),
                reference: Some(bill.bill_no),
            });
        }

        for invoice in self
            .invoices
            .find_by_project(project_id)
            .await
            .map_err(ApiError::database)?
        {
            let paid = invoice.status == invoice_status::PAID;
            timeline.push(TimelineMilestone {
                date: invoice.invoice_date,
                title: if paid { "Invoice Paid" } else { "Invoice Raised" }.to_string(),
                description: format!("Invoice {} - {}", invoice.invoice_no, invoice.status),
                kind: if paid { "invoice_paid" } else { "invoice_raised" }.to_string(),
                status: if paid { "completed" } else { "in-progress" }.to_string(),
                amount: Some(invoice.total_amount),
                reference: Some(invoice.invoice_no),
            });
        }

        if let Some(end) = project.end_date {
            let today = Utc::now().date_naive();
            let status = if today > end {
                "overdue"
            } else if today > end - Duration::days(30) {
                "in-progress"
            } else {
                "upcoming"
            };
            timeline.push(TimelineMilestone {
                date: Some(end),
                title: "Project Completion".to_string(),
                description: "Target completion date".to_string(),
                kind: "milestone".to_string(),
                status: status.to_string(),
                amount: None,
                reference: None,
            });
        }

        // Chronological; entries without a date sort last.
        timeline.sort_by(|a, b| match (a.date, b.date) {
            (None, None) => std::cmp::Ordering::Equal,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (Some(_), None) => std::cmp::Ordering::Less,
            (Some(x), Some(y)) => x.cmp(&y),
        });
        Ok(timeline)
    }

    async fn build_payment_distribution(&self, project_id: &str) -> ApiResult<Vec<ChartSlice>> {
        Ok(self
            .payments
            .method_distribution(project_id)
            .await
            .map_err(ApiError::database)?
            .into_iter()
            .map(|m| ChartSlice {
                name: m.method,
                value: m.value,
                count: Some(m.count),
            })
            .collect())
    }

    async fn build_payment_timeline(&self, project_id: &str) -> ApiResult<Vec<PaymentTrendPoint>> {
        Ok(self
            .payments
            .monthly_totals(project_id, PAYMENT_TREND_MONTHS)
            .await
            .map_err(ApiError::database)?
            .into_iter()
            .map(|m| PaymentTrendPoint {
                month: m.month,
                total_amount: m.value,
                payment_count: m.count,
            })
            .collect())
    }
}

fn count_for(counts: &[StatusCount], status: &str) -> i64 {
    counts
        .iter()
        .find(|c| c.status == status)
        .map(|c| c.count)
        .unwrap_or(0)
}

fn status_slices(counts: &[StatusCount]) -> Vec<ChartSlice> {
    counts
        .iter()
        .map(|c| ChartSlice {
            name: c.status.clone(),
            value: Decimal::from(c.count),
            count: None,
        })
        .collect()
}

fn month_start(date: NaiveDate) -> ApiResult<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .ok_or_else(|| ApiError::InternalError("invalid month start".to_string()))
}

fn month_boundary(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[async_trait]
impl ProjectDashboardService for DashboardComposer {
    async fn dashboard(&self, project_unique_id: &str) -> ApiResult<ProjectDashboard> {
        info!(project_id = project_unique_id, "composing project dashboard");

        let mut project = self.load_project(project_unique_id).await?;
        let project_id = project.project_unique_id.clone();

        let procurement_data = self.build_procurement_data(&project).await?;
        let recent_activities =
            Self::section("recent_activities", self.build_recent_activities(&project_id).await);
        let top_vendors = Self::section("top_vendors", self.build_top_vendors(&project_id).await);
        let spending_trend =
            Self::section("spending_trend", self.build_spending_trend(&project_id).await);
        let project_timeline =
            Self::section("project_timeline", self.build_timeline(&project).await);
        let payment_method_distribution = Self::section(
            "payment_method_distribution",
            self.build_payment_distribution(&project_id).await,
        );
        let payment_timeline =
            Self::section("payment_timeline", self.build_payment_timeline(&project_id).await);

        // Last: mutates the project record (persisted metric subset).
        let financial_data = self.build_financial_data(&mut project).await;

        let manager = if project.assigned_to.is_some() {
            "Project Manager".to_string()
        } else {
            "Not Assigned".to_string()
        };

        Ok(ProjectDashboard {
            project_id: project.project_unique_id.clone(),
            project_name: project.project_name.clone(),
            location: project.location.clone(),
            status: project.status.to_string(),
            start_date: project.start_date,
            end_date: project.end_date,
            manager,
            budget: project.budget,
            financial_data,
            procurement_data,
            recent_activities,
            top_vendors,
            spending_trend,
            project_timeline,
            payment_method_distribution,
            payment_timeline,
            last_update: Some(project.updated_at),
            stats_calculated_at: project.stats_calculated_at,
        })
    }

    async fn financial_data(&self, project_unique_id: &str) -> ApiResult<FinancialData> {
        let mut project = self.load_project(project_unique_id).await?;
        Ok(self.build_financial_data(&mut project).await)
    }

    async fn procurement_data(&self, project_unique_id: &str) -> ApiResult<ProcurementData> {
        let project = self.load_project(project_unique_id).await?;
        self.build_procurement_data(&project).await
    }
}
