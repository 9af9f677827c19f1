use std::sync::Arc;

use sqlx::PgPool;

use crate::repository::billing::{BillReaderImpl, InvoiceReaderImpl, PaymentReaderImpl};
use crate::repository::procurement::{
    PurchaseOrderReaderImpl, QuotationReaderImpl, VendorReaderImpl,
};
use crate::repository::project_repository::ProjectRepositoryImpl;

/// Factory wiring every repository to one shared connection pool.
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn project_repository(&self) -> Arc<ProjectRepositoryImpl> {
        Arc::new(ProjectRepositoryImpl::new(self.pool.clone()))
    }

    pub fn purchase_order_reader(&self) -> Arc<PurchaseOrderReaderImpl> {
        Arc::new(PurchaseOrderReaderImpl::new(self.pool.clone()))
    }

    pub fn quotation_reader(&self) -> Arc<QuotationReaderImpl> {
        Arc::new(QuotationReaderImpl::new(self.pool.clone()))
    }

    pub fn vendor_reader(&self) -> Arc<VendorReaderImpl> {
        Arc::new(VendorReaderImpl::new(self.pool.clone()))
    }

    pub fn bill_reader(&self) -> Arc<BillReaderImpl> {
        Arc::new(BillReaderImpl::new(self.pool.clone()))
    }

    pub fn invoice_reader(&self) -> Arc<InvoiceReaderImpl> {
        Arc::new(InvoiceReaderImpl::new(self.pool.clone()))
    }

    pub fn payment_reader(&self) -> Arc<PaymentReaderImpl> {
        Arc::new(PaymentReaderImpl::new(self.pool.clone()))
    }
}
