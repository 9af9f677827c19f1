//! Builders for source-domain records with sensible defaults.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crm_core_db::models::billing::bill::BillModel;
use crm_core_db::models::billing::invoice::InvoiceModel;
use crm_core_db::models::billing::payment::PaymentModel;
use crm_core_db::models::procurement::purchase_order::PurchaseOrderModel;
use crm_core_db::models::procurement::quotation::QuotationModel;
use crm_core_db::models::procurement::vendor::{vendor_status, VendorModel};
use crm_core_db::models::project::{ProjectModel, ProjectStatus};

static NEXT_ID: AtomicI64 = AtomicI64::new(1);

fn next_id() -> i64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

pub fn unique_project_id() -> String {
    format!("PRJ-{}", Uuid::new_v4().simple())
}

pub fn project(budget: Decimal) -> ProjectModel {
    ProjectModel::new(
        next_id(),
        unique_project_id(),
        "Test Project",
        ProjectStatus::InProgress,
        budget,
    )
}

pub fn purchase_order(project_id: &str, status: &str, value: Decimal) -> PurchaseOrderModel {
    let id = next_id();
    let now = Utc::now();
    PurchaseOrderModel {
        id,
        po_no: format!("PO-{id:04}"),
        project_id: project_id.to_string(),
        vendor_id: 1,
        status: status.to_string(),
        category: None,
        total_value: value,
        total_items_ordered: 0,
        total_items_delivered: 0,
        order_date: Some(now),
        expected_delivery: None,
        created_at: now,
    }
}

pub fn quotation(project_id: &str, status: &str, value: Decimal) -> QuotationModel {
    let id = next_id();
    QuotationModel {
        id,
        quote_no: format!("QT-{id:04}"),
        project_id: project_id.to_string(),
        status: status.to_string(),
        total_value: value,
        uploaded_at: Utc::now(),
    }
}

pub fn bill(
    project_id: &str,
    status: &str,
    total: Decimal,
    paid: Decimal,
    balance: Decimal,
) -> BillModel {
    let id = next_id();
    BillModel {
        id,
        bill_no: format!("BILL-{id:04}"),
        project_id: project_id.to_string(),
        vendor_id: Some(1),
        status: status.to_string(),
        total_amount: total,
        paid_amount: paid,
        balance_amount: balance,
        bill_date: Some(Utc::now().date_naive()),
    }
}

pub fn vendor(project_id: &str, purchase_value: Decimal) -> VendorModel {
    let id = next_id();
    VendorModel {
        id,
        name: format!("Vendor {id}"),
        project_id: project_id.to_string(),
        status: vendor_status::ACTIVE.to_string(),
        rating: Some(Decimal::from(4)),
        total_purchase_value: purchase_value,
        last_purchase_amount: None,
    }
}

pub fn invoice(project_id: &str, status: &str, amount: Decimal) -> InvoiceModel {
    let id = next_id();
    InvoiceModel {
        id,
        invoice_no: format!("INV-{id:04}"),
        project_id: project_id.to_string(),
        status: status.to_string(),
        total_amount: amount,
        invoice_date: Some(Utc::now().date_naive()),
        deleted_at: None,
    }
}

pub fn payment(project_id: &str, method: &str, amount: Decimal) -> PaymentModel {
    let id = next_id();
    PaymentModel {
        id,
        project_id: project_id.to_string(),
        amount,
        payment_method: method.to_string(),
        payment_date: Utc::now(),
        transaction_reference: Some(format!("TXN-{id:06}")),
    }
}
