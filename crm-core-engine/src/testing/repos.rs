use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crm_core_db::models::billing::bill::BillModel;
use crm_core_db::models::billing::invoice::InvoiceModel;
use crm_core_db::models::billing::payment::PaymentModel;
use crm_core_db::models::procurement::purchase_order::PurchaseOrderModel;
use crm_core_db::models::procurement::quotation::QuotationModel;
use crm_core_db::models::procurement::vendor::VendorModel;
use crm_core_db::models::project::ProjectModel;
use crm_core_db::repository::{
    BillReader, CategoryValue, InvoiceReader, MethodTotal, MonthTotal, PaymentReader,
    ProjectRepository, PurchaseOrderReader, QuotationReader, StatusCount, VendorReader,
};

/// One in-memory store implementing every repository trait. Pass the same
/// `Arc<InMemoryCrm>` for each `Arc<dyn ...>` the engine expects.
#[derive(Default)]
pub struct InMemoryCrm {
    pub projects: RwLock<Vec<ProjectModel>>,
    pub purchase_orders: RwLock<Vec<PurchaseOrderModel>>,
    pub quotations: RwLock<Vec<QuotationModel>>,
    pub bills: RwLock<Vec<BillModel>>,
    pub vendors: RwLock<Vec<VendorModel>>,
    pub invoices: RwLock<Vec<InvoiceModel>>,
    pub payments: RwLock<Vec<PaymentModel>>,

    /// Unique ids that `find_by_unique_id` pretends not to know while
    /// `find_active` still lists them (models a project deleted mid-batch).
    pub hidden_from_lookup: RwLock<HashSet<String>>,
    /// Domains whose queries fail with an injected error.
    pub failing: RwLock<HashSet<String>>,
    /// Makes `update_stats` fail.
    pub fail_project_updates: AtomicBool,
}

impl InMemoryCrm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&self, project: ProjectModel) {
        self.projects.write().push(project);
    }

    pub fn add_purchase_order(&self, po: PurchaseOrderModel) {
        self.purchase_orders.write().push(po);
    }

    pub fn add_quotation(&self, quotation: QuotationModel) {
        self.quotations.write().push(quotation);
    }

    pub fn add_bill(&self, bill: BillModel) {
        self.bills.write().push(bill);
    }

    pub fn add_vendor(&self, vendor: VendorModel) {
        self.vendors.write().push(vendor);
    }

    pub fn add_invoice(&self, invoice: InvoiceModel) {
        self.invoices.write().push(invoice);
    }

    pub fn add_payment(&self, payment: PaymentModel) {
        self.payments.write().push(payment);
    }

    pub fn hide_from_lookup(&self, project_unique_id: &str) {
        self.hidden_from_lookup
            .write()
            .insert(project_unique_id.to_string());
    }

    pub fn fail_domain(&self, domain: &str) {
        self.failing.write().insert(domain.to_string());
    }

    pub fn stored_project(&self, project_unique_id: &str) -> Option<ProjectModel> {
        self.projects
            .read()
            .iter()
            .find(|p| p.project_unique_id == project_unique_id)
            .cloned()
    }

    fn fail_if(&self, domain: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.failing.read().contains(domain) {
            return Err(format!("injected {domain} failure").into());
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for InMemoryCrm {
    async fn find_by_unique_id(
        &self,
        project_unique_id: &str,
    ) -> Result<Option<ProjectModel>, Box<dyn Error + Send + Sync>> {
        if self.hidden_from_lookup.read().contains(project_unique_id) {
            return Ok(None);
        }
        Ok(self.stored_project(project_unique_id))
    }

    async fn find_active(&self) -> Result<Vec<ProjectModel>, Box<dyn Error + Send + Sync>> {
        Ok(self
            .projects
            .read()
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }

    async fn create(&self, project: &ProjectModel) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.projects.write().push(project.clone());
        Ok(())
    }

    async fn update_stats(
        &self,
        project: &ProjectModel,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.fail_project_updates.load(Ordering::SeqCst) {
            return Err("injected project update failure".into());
        }
        let mut projects = self.projects.write();
        match projects
            .iter_mut()
            .find(|p| p.project_unique_id == project.project_unique_id)
        {
            Some(stored) => {
                *stored = project.clone();
                Ok(())
            }
            None => Err(format!("no such project: {}", project.project_unique_id).into()),
        }
    }
}

#[async_trait]
impl PurchaseOrderReader for InMemoryCrm {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id)
            .count() as i64)
    }

    async fn sum_value_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        Ok(self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id)
            .map(|po| po.total_value)
            .sum())
    }

    async fn count_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id && po.status == status)
            .count() as i64)
    }

    async fn sum_value_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        Ok(self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id && po.status == status)
            .map(|po| po.total_value)
            .sum())
    }

    async fn count_grouped_by_status(
        &self,
        project_id: &str,
    ) -> Result<Vec<StatusCount>, Box<dyn Error + Send + Sync>> {
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for po in self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id)
        {
            *counts.entry(po.status.clone()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn sum_value_grouped_by_category(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<CategoryValue>, Box<dyn Error + Send + Sync>> {
        let mut sums: BTreeMap<String, Decimal> = BTreeMap::new();
        for po in self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id)
        {
            if let Some(category) = &po.category {
                *sums.entry(category.clone()).or_default() += po.total_value;
            }
        }
        let mut values: Vec<CategoryValue> = sums
            .into_iter()
            .map(|(category, value)| CategoryValue { category, value })
            .collect();
        values.sort_by(|a, b| b.value.cmp(&a.value));
        values.truncate(limit as usize);
        Ok(values)
    }

    async fn sum_items_ordered(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id)
            .map(|po| i64::from(po.total_items_ordered))
            .sum())
    }

    async fn sum_items_delivered(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id)
            .map(|po| i64::from(po.total_items_delivered))
            .sum())
    }

    async fn count_in_range(
        &self,
        project_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        self.fail_if("po-range")?;
        Ok(self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id && po.created_at >= start && po.created_at < end)
            .count() as i64)
    }

    async fn sum_value_in_range(
        &self,
        project_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        self.fail_if("po-range")?;
        Ok(self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id && po.created_at >= start && po.created_at < end)
            .map(|po| po.total_value)
            .sum())
    }

    async fn find_recent(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<PurchaseOrderModel>, Box<dyn Error + Send + Sync>> {
        let mut orders: Vec<PurchaseOrderModel> = self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit as usize);
        Ok(orders)
    }

    async fn find_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Vec<PurchaseOrderModel>, Box<dyn Error + Send + Sync>> {
        Ok(self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.project_id == project_id && po.status == status)
            .cloned()
            .collect())
    }

    async fn count_by_vendor(&self, vendor_id: i64) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .purchase_orders
            .read()
            .iter()
            .filter(|po| po.vendor_id == vendor_id)
            .count() as i64)
    }
}

#[async_trait]
impl QuotationReader for InMemoryCrm {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .quotations
            .read()
            .iter()
            .filter(|q| q.project_id == project_id)
            .count() as i64)
    }

    async fn sum_value_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        Ok(self
            .quotations
            .read()
            .iter()
            .filter(|q| q.project_id == project_id)
            .map(|q| q.total_value)
            .sum())
    }

    async fn count_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .quotations
            .read()
            .iter()
            .filter(|q| q.project_id == project_id && q.status == status)
            .count() as i64)
    }

    async fn sum_value_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        Ok(self
            .quotations
            .read()
            .iter()
            .filter(|q| q.project_id == project_id && q.status == status)
            .map(|q| q.total_value)
            .sum())
    }

    async fn count_grouped_by_status(
        &self,
        project_id: &str,
    ) -> Result<Vec<StatusCount>, Box<dyn Error + Send + Sync>> {
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for quotation in self
            .quotations
            .read()
            .iter()
            .filter(|q| q.project_id == project_id)
        {
            *counts.entry(quotation.status.clone()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn find_recent(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<QuotationModel>, Box<dyn Error + Send + Sync>> {
        let mut quotations: Vec<QuotationModel> = self
            .quotations
            .read()
            .iter()
            .filter(|q| q.project_id == project_id)
            .cloned()
            .collect();
        quotations.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        quotations.truncate(limit as usize);
        Ok(quotations)
    }
}

#[async_trait]
impl BillReader for InMemoryCrm {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .bills
            .read()
            .iter()
            .filter(|b| b.project_id == project_id)
            .count() as i64)
    }

    async fn sum_total_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        Ok(self
            .bills
            .read()
            .iter()
            .filter(|b| b.project_id == project_id)
            .map(|b| b.total_amount)
            .sum())
    }

    async fn count_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .bills
            .read()
            .iter()
            .filter(|b| b.project_id == project_id && b.status == status)
            .count() as i64)
    }

    async fn sum_paid_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        Ok(self
            .bills
            .read()
            .iter()
            .filter(|b| b.project_id == project_id)
            .map(|b| b.paid_amount)
            .sum())
    }

    async fn sum_balance_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        Ok(self
            .bills
            .read()
            .iter()
            .filter(|b| b.project_id == project_id)
            .map(|b| b.balance_amount)
            .sum())
    }

    async fn find_by_project_excluding_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Vec<BillModel>, Box<dyn Error + Send + Sync>> {
        self.fail_if("bills")?;
        Ok(self
            .bills
            .read()
            .iter()
            .filter(|b| b.project_id == project_id && b.status != status)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VendorReader for InMemoryCrm {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .vendors
            .read()
            .iter()
            .filter(|v| v.project_id == project_id)
            .count() as i64)
    }

    async fn count_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .vendors
            .read()
            .iter()
            .filter(|v| v.project_id == project_id && v.status == status)
            .count() as i64)
    }

    async fn sum_purchase_value_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        Ok(self
            .vendors
            .read()
            .iter()
            .filter(|v| v.project_id == project_id)
            .map(|v| v.total_purchase_value)
            .sum())
    }

    async fn average_rating_by_project(
        &self,
        project_id: &str,
    ) -> Result<Option<Decimal>, Box<dyn Error + Send + Sync>> {
        let vendors = self.vendors.read();
        let rated: Vec<Decimal> = vendors
            .iter()
            .filter(|v| v.project_id == project_id)
            .filter_map(|v| v.rating)
            .collect();
        if rated.is_empty() {
            return Ok(None);
        }
        let total: Decimal = rated.iter().copied().sum();
        Ok(Some(total / Decimal::from(rated.len() as i64)))
    }

    async fn find_top_by_purchase_value(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<VendorModel>, Box<dyn Error + Send + Sync>> {
        self.fail_if("vendors")?;
        let mut vendors: Vec<VendorModel> = self
            .vendors
            .read()
            .iter()
            .filter(|v| v.project_id == project_id)
            .cloned()
            .collect();
        vendors.sort_by(|a, b| b.total_purchase_value.cmp(&a.total_purchase_value));
        vendors.truncate(limit as usize);
        Ok(vendors)
    }
}

#[async_trait]
impl InvoiceReader for InMemoryCrm {
    async fn count_by_project(
        &self,
        project_id: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .invoices
            .read()
            .iter()
            .filter(|i| i.project_id == project_id && i.deleted_at.is_none())
            .count() as i64)
    }

    async fn sum_amount_by_project(
        &self,
        project_id: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        Ok(self
            .invoices
            .read()
            .iter()
            .filter(|i| i.project_id == project_id && i.deleted_at.is_none())
            .map(|i| i.total_amount)
            .sum())
    }

    async fn count_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Ok(self
            .invoices
            .read()
            .iter()
            .filter(|i| i.project_id == project_id && i.deleted_at.is_none() && i.status == status)
            .count() as i64)
    }

    async fn sum_amount_by_project_and_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        Ok(self
            .invoices
            .read()
            .iter()
            .filter(|i| i.project_id == project_id && i.deleted_at.is_none() && i.status == status)
            .map(|i| i.total_amount)
            .sum())
    }

    async fn sum_amount_excluding_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> Result<Decimal, Box<dyn Error + Send + Sync>> {
        Ok(self
            .invoices
            .read()
            .iter()
            .filter(|i| i.project_id == project_id && i.deleted_at.is_none() && i.status != status)
            .map(|i| i.total_amount)
            .sum())
    }

    async fn find_by_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<InvoiceModel>, Box<dyn Error + Send + Sync>> {
        self.fail_if("invoices")?;
        Ok(self
            .invoices
            .read()
            .iter()
            .filter(|i| i.project_id == project_id && i.deleted_at.is_none())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PaymentReader for InMemoryCrm {
    async fn find_recent(
        &self,
        project_id: &str,
        limit: i64,
    ) -> Result<Vec<PaymentModel>, Box<dyn Error + Send + Sync>> {
        self.fail_if("payments")?;
        let mut payments: Vec<PaymentModel> = self
            .payments
            .read()
            .iter()
            .filter(|p| p.project_id == project_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        payments.truncate(limit as usize);
        Ok(payments)
    }

    async fn method_distribution(
        &self,
        project_id: &str,
    ) -> Result<Vec<MethodTotal>, Box<dyn Error + Send + Sync>> {
        self.fail_if("payments")?;
        let mut totals: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
        for payment in self
            .payments
            .read()
            .iter()
            .filter(|p| p.project_id == project_id)
        {
            let entry = totals.entry(payment.payment_method.clone()).or_default();
            entry.0 += payment.amount;
            entry.1 += 1;
        }
        Ok(totals
            .into_iter()
            .map(|(method, (value, count))| MethodTotal {
                method,
                value,
                count,
            })
            .collect())
    }

    async fn monthly_totals(
        &self,
        project_id: &str,
        months: i64,
    ) -> Result<Vec<MonthTotal>, Box<dyn Error + Send + Sync>> {
        self.fail_if("payments")?;
        let mut totals: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
        for payment in self
            .payments
            .read()
            .iter()
            .filter(|p| p.project_id == project_id)
        {
            let month = payment.payment_date.format("%Y-%m").to_string();
            let entry = totals.entry(month).or_default();
            entry.0 += payment.amount;
            entry.1 += 1;
        }
        let mut rows: Vec<MonthTotal> = totals
            .into_iter()
            .map(|(month, (value, count))| MonthTotal {
                month,
                value,
                count,
            })
            .collect();
        // Trailing window: keep the most recent `months` entries.
        if rows.len() > months as usize {
            rows.drain(..rows.len() - months as usize);
        }
        Ok(rows)
    }
}
