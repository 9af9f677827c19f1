use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, error, info};

use crm_core_api::{
    ApiError, ApiResult, ProjectStatsService, RecalculationSummary, StatsDomain,
};
use crm_core_db::models::billing::bill::bill_status;
use crm_core_db::models::billing::invoice::invoice_status;
use crm_core_db::models::procurement::purchase_order::po_status;
use crm_core_db::models::procurement::quotation::quotation_status;
use crm_core_db::models::procurement::vendor::vendor_status;
use crm_core_db::models::project::ProjectModel;
use crm_core_db::repository::{
    BillReader, InvoiceReader, ProjectRepository, PurchaseOrderReader, QuotationReader,
    VendorReader,
};

use crate::calculator::{
    apply_bill_stats, apply_invoice_stats, apply_po_stats, apply_quotation_stats,
    apply_vendor_stats, BillAggregates, InvoiceAggregates, PoAggregates, QuotationAggregates,
    VendorAggregates,
};
use crate::financial::{CommittedSpendMetrics, FinancialMetrics};
use crate::stats::locks::ProjectLocks;
use crate::stats::verifier::ConsistencyVerifier;

/// Recalculation orchestrator: full recompute, targeted per-domain updates,
/// bulk recompute over active projects, and drift-driven repair.
pub struct ProjectStatsEngine {
    projects: Arc<dyn ProjectRepository>,
    purchase_orders: Arc<dyn PurchaseOrderReader>,
    quotations: Arc<dyn QuotationReader>,
    bills: Arc<dyn BillReader>,
    vendors: Arc<dyn VendorReader>,
    invoices: Arc<dyn InvoiceReader>,
    metrics: Arc<dyn FinancialMetrics>,
    verifier: ConsistencyVerifier,
    locks: Arc<ProjectLocks>,
}

impl ProjectStatsEngine {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        purchase_orders: Arc<dyn PurchaseOrderReader>,
        quotations: Arc<dyn QuotationReader>,
        bills: Arc<dyn BillReader>,
        vendors: Arc<dyn VendorReader>,
        invoices: Arc<dyn InvoiceReader>,
        locks: Arc<ProjectLocks>,
    ) -> Self {
        let verifier = ConsistencyVerifier::new(purchase_orders.clone());
        Self {
            projects,
            purchase_orders,
            quotations,
            bills,
            vendors,
            invoices,
            metrics: Arc::new(CommittedSpendMetrics),
            verifier,
            locks,
        }
    }

    /// Replace the full-recalculation financial formula.
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

    async fn gather_po_aggregates(&self, project_id: &str) -> ApiResult<PoAggregates> {
        let total_count = self
            .purchase_orders
            .count_by_project(project_id)
            .await
            .map_err(ApiError::database)?;
        let total_value = self
            .purchase_orders
            .sum_value_by_project(project_id)
            .await
            .map_err(ApiError::database)?;
        let delivered_count = self
            .purchase_orders
            .count_by_project_and_status(project_id, po_status::DELIVERED)
            .await
            .map_err(ApiError::database)?;
        let delivered_value = self
            .purchase_orders
            .sum_value_by_project_and_status(project_id, po_status::DELIVERED)
            .await
            .map_err(ApiError::database)?;

        let mut pending_value = Decimal::ZERO;
        for status in po_status::PENDING {
            pending_value += self
                .purchase_orders
                .sum_value_by_project_and_status(project_id, status)
                .await
                .map_err(ApiError::database)?;
        }

        let cancelled_value = self
            .purchase_orders
            .sum_value_by_project_and_status(project_id, po_status::CANCELLED)
            .await
            .map_err(ApiError::database)?;

        Ok(PoAggregates {
            total_count,
            total_value,
            delivered_count,
            delivered_value,
            pending_value,
            cancelled_value,
        })
    }

    async fn gather_quotation_aggregates(&self, project_id: &str) -> ApiResult<QuotationAggregates> {
        Ok(QuotationAggregates {
            total_count: self
                .quotations
                .count_by_project(project_id)
                .await
                .map_err(ApiError::database)?,
            total_value: self
                .quotations
                .sum_value_by_project(project_id)
                .await
                .map_err(ApiError::database)?,
            approved_count: self
                .quotations
                .count_by_project_and_status(project_id, quotation_status::APPROVED)
                .await
                .map_err(ApiError::database)?,
            approved_value: self
                .quotations
                .sum_value_by_project_and_status(project_id, quotation_status::APPROVED)
                .await
                .map_err(ApiError::database)?,
        })
    }

    async fn gather_bill_aggregates(&self, project_id: &str) -> ApiResult<BillAggregates> {
        Ok(BillAggregates {
            total_count: self
                .bills
                .count_by_project(project_id)
                .await
                .map_err(ApiError::database)?,
            total_value: self
                .bills
                .sum_total_amount_by_project(project_id)
                .await
                .map_err(ApiError::database)?,
            paid_count: self
                .bills
                .count_by_project_and_status(project_id, bill_status::PAID)
                .await
                .map_err(ApiError::database)?,
            paid_value: self
                .bills
                .sum_paid_amount_by_project(project_id)
                .await
                .map_err(ApiError::database)?,
            balance_value: self
                .bills
                .sum_balance_amount_by_project(project_id)
                .await
                .map_err(ApiError::database)?,
        })
    }

    async fn gather_vendor_aggregates(&self, project_id: &str) -> ApiResult<VendorAggregates> {
        Ok(VendorAggregates {
            active_count: self
                .vendors
                .count_by_project_and_status(project_id, vendor_status::ACTIVE)
                .await
                .map_err(ApiError::database)?,
            total_spend: self
                .vendors
                .sum_purchase_value_by_project(project_id)
                .await
                .map_err(ApiError::database)?,
        })
    }

    async fn gather_invoice_aggregates(&self, project_id: &str) -> ApiResult<InvoiceAggregates> {
        Ok(InvoiceAggregates {
            total_count: self
                .invoices
                .count_by_project(project_id)
                .await
                .map_err(ApiError::database)?,
            total_value: self
                .invoices
                .sum_amount_by_project(project_id)
                .await
                .map_err(ApiError::database)?,
            paid_count: self
                .invoices
                .count_by_project_and_status(project_id, invoice_status::PAID)
                .await
                .map_err(ApiError::database)?,
            paid_value: self
                .invoices
                .sum_amount_by_project_and_status(project_id, invoice_status::PAID)
                .await
                .map_err(ApiError::database)?,
            pending_value: self
                .invoices
                .sum_amount_excluding_status(project_id, invoice_status::PAID)
                .await
                .map_err(ApiError::database)?,
        })
    }

    /// Recompute every domain onto the loaded project and persist.
    /// Caller holds the project lock.
    async fn recalculate_locked(&self, project: &mut ProjectModel) -> ApiResult<()> {
        let project_id = project.project_unique_id.clone();

        apply_po_stats(project, &self.gather_po_aggregates(&project_id).await?);
        apply_quotation_stats(project, &self.gather_quotation_aggregates(&project_id).await?);
        apply_bill_stats(project, &self.gather_bill_aggregates(&project_id).await?);
        apply_vendor_stats(project, &self.gather_vendor_aggregates(&project_id).await?);
        apply_invoice_stats(project, &self.gather_invoice_aggregates(&project_id).await?);
        self.metrics.apply(project);

        let now = Utc::now();
        project.stats_calculated_at = Some(now);
        project.last_procurement_update = Some(now);

        self.projects
            .update_stats(project)
            .await
            .map_err(ApiError::database)
    }
}

#[async_trait]
impl ProjectStatsService for ProjectStatsEngine {
    async fn recalculate_project_stats(&self, project_unique_id: &str) -> ApiResult<()> {
        info!(project_id = project_unique_id, "recalculating project statistics");

        let _guard = self.locks.acquire(project_unique_id).await;
        let mut project = self.load_project(project_unique_id).await?;
        self.recalculate_locked(&mut project).await?;

        info!(project_id = project_unique_id, "project statistics recalculated");
        Ok(())
    }

    async fn update_after_domain_change(
        &self,
        project_unique_id: &str,
        domain: StatsDomain,
    ) -> ApiResult<()> {
        debug!(project_id = project_unique_id, %domain, "targeted stats update");

        let _guard = self.locks.acquire(project_unique_id).await;
        let mut project = self.load_project(project_unique_id).await?;
        let project_id = project.project_unique_id.clone();

        match domain {
            StatsDomain::PurchaseOrders => {
                apply_po_stats(&mut project, &self.gather_po_aggregates(&project_id).await?);
                // Derived metrics depend on the PO aggregates.
                self.metrics.apply(&mut project);
            }
            StatsDomain::Quotations => {
                apply_quotation_stats(
                    &mut project,
                    &self.gather_quotation_aggregates(&project_id).await?,
                );
            }
            StatsDomain::Bills => {
                apply_bill_stats(&mut project, &self.gather_bill_aggregates(&project_id).await?);
            }
            StatsDomain::Vendors => {
                apply_vendor_stats(
                    &mut project,
                    &self.gather_vendor_aggregates(&project_id).await?,
                );
            }
            StatsDomain::Invoices => {
                apply_invoice_stats(
                    &mut project,
                    &self.gather_invoice_aggregates(&project_id).await?,
                );
            }
        }

        let now = Utc::now();
        project.last_procurement_update = Some(now);
        project.stats_calculated_at = Some(now);

        self.projects
            .update_stats(&project)
            .await
            .map_err(ApiError::database)
    }

    async fn recalculate_all_active_projects(&self) -> ApiResult<RecalculationSummary> {
        info!("starting recalculation for all active projects");

        let projects = self
            .projects
            .find_active()
            .await
            .map_err(ApiError::database)?;

        let mut summary = RecalculationSummary::default();
        for project in &projects {
            match self
                .recalculate_project_stats(&project.project_unique_id)
                .await
            {
                Ok(()) => summary.success_count += 1,
                Err(err) => {
                    summary.fail_count += 1;
                    error!(
                        project_id = %project.project_unique_id,
                        error = %err,
                        "failed to recalculate stats for project"
                    );
                }
            }
        }

        info!(
            success = summary.success_count,
            failed = summary.fail_count,
            "completed recalculation for all active projects"
        );
        Ok(summary)
    }

    async fn find_projects_needing_recalculation(
        &self,
        staleness: chrono::Duration,
    ) -> ApiResult<Vec<String>> {
        let cutoff = Utc::now() - staleness;
        let projects = self
            .projects
            .find_active()
            .await
            .map_err(ApiError::database)?;

        Ok(projects
            .into_iter()
            .filter(|p| p.stats_older_than(cutoff))
            .map(|p| p.project_unique_id)
            .collect())
    }

    async fn verify_project_stats(&self, project_unique_id: &str) -> ApiResult<bool> {
        let project = self.load_project(project_unique_id).await?;
        self.verifier.verify(&project).await
    }

    async fn fix_inconsistent_stats(&self) -> ApiResult<u32> {
        info!("starting to fix inconsistent project stats");

        let projects = self
            .projects
            .find_active()
            .await
            .map_err(ApiError::database)?;

        let mut fixed = 0u32;
        for project in &projects {
            let project_id = project.project_unique_id.as_str();
            match self.verifier.verify(project).await {
                Ok(true) => {}
                Ok(false) => match self.recalculate_project_stats(project_id).await {
                    Ok(()) => fixed += 1,
                    Err(err) => {
                        error!(project_id, error = %err, "could not repair project stats");
                    }
                },
                Err(err) => {
                    error!(project_id, error = %err, "could not verify project stats");
                }
            }
        }

        info!(fixed, "fixed inconsistent project stats");
        Ok(fixed)
    }
}
