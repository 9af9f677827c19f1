//! Pure application of aggregate reader outputs onto the project record.
//!
//! Nothing here touches the repositories; the orchestrator gathers the
//! aggregates and persists the result.

use rust_decimal::Decimal;

use crm_core_db::models::project::ProjectModel;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoAggregates {
    pub total_count: i64,
    pub total_value: Decimal,
    pub delivered_count: i64,
    pub delivered_value: Decimal,
    pub pending_value: Decimal,
    pub cancelled_value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotationAggregates {
    pub total_count: i64,
    pub total_value: Decimal,
    pub approved_count: i64,
    pub approved_value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillAggregates {
    pub total_count: i64,
    pub total_value: Decimal,
    pub paid_count: i64,
    pub paid_value: Decimal,
    /// Outstanding balance summed per bill; never derived as total minus
    /// paid, since partial payments exist.
    pub balance_value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorAggregates {
    pub active_count: i64,
    pub total_spend: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceAggregates {
    pub total_count: i64,
    pub total_value: Decimal,
    pub paid_count: i64,
    pub paid_value: Decimal,
    pub pending_value: Decimal,
}

pub fn apply_po_stats(project: &mut ProjectModel, agg: &PoAggregates) {
    project.total_po_count = agg.total_count as i32;
    project.total_po_value = agg.total_value;
    project.delivered_po_count = agg.delivered_count as i32;
    project.delivered_po_value = agg.delivered_value;
    project.pending_po_value = agg.pending_value;
    project.cancelled_po_value = agg.cancelled_value;
}

pub fn apply_quotation_stats(project: &mut ProjectModel, agg: &QuotationAggregates) {
    project.total_quotation_count = agg.total_count as i32;
    project.total_quotation_value = agg.total_value;
    project.approved_quotation_count = agg.approved_count as i32;
    project.approved_quotation_value = agg.approved_value;
}

pub fn apply_bill_stats(project: &mut ProjectModel, agg: &BillAggregates) {
    project.total_bill_count = agg.total_count as i32;
    project.total_bill_value = agg.total_value;
    project.paid_bill_count = agg.paid_count as i32;
    project.paid_bill_value = agg.paid_value;
    project.pending_payment_value = agg.balance_value;
}

pub fn apply_vendor_stats(project: &mut ProjectModel, agg: &VendorAggregates) {
    project.active_vendor_count = agg.active_count as i32;
    project.total_vendor_spend = agg.total_spend;
}

pub fn apply_invoice_stats(project: &mut ProjectModel, agg: &InvoiceAggregates) {
    project.total_invoice_count = agg.total_count as i32;
    project.total_invoice_value = agg.total_value;
    project.paid_invoice_count = agg.paid_count as i32;
    project.paid_invoice_value = agg.paid_value;
    project.pending_invoice_value = agg.pending_value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core_db::models::project::ProjectStatus;
    use rust_decimal_macros::dec;

    fn project() -> ProjectModel {
        ProjectModel::new(1, "PRJ-0001", "Test", ProjectStatus::InProgress, dec!(100000))
    }

    #[test]
    fn po_stats_fill_every_field() {
        let mut p = project();
        apply_po_stats(
            &mut p,
            &PoAggregates {
                total_count: 4,
                total_value: dec!(40000),
                delivered_count: 1,
                delivered_value: dec!(5000),
                pending_value: dec!(25000),
                cancelled_value: dec!(10000),
            },
        );
        assert_eq!(p.total_po_count, 4);
        assert_eq!(p.total_po_value, dec!(40000));
        assert_eq!(p.delivered_po_count, 1);
        assert_eq!(p.delivered_po_value, dec!(5000));
        assert_eq!(p.pending_po_value, dec!(25000));
        assert_eq!(p.cancelled_po_value, dec!(10000));
    }

    #[test]
    fn bill_stats_carry_balance_separately() {
        let mut p = project();
        apply_bill_stats(
            &mut p,
            &BillAggregates {
                total_count: 3,
                total_value: dec!(9000),
                paid_count: 1,
                paid_value: dec!(2500),
                balance_value: dec!(6000),
            },
        );
        // 9000 - 2500 != 6000: the balance is its own aggregate.
        assert_eq!(p.pending_payment_value, dec!(6000));
    }

    #[test]
    fn empty_aggregates_reset_to_zero() {
        let mut p = project();
        p.total_quotation_count = 7;
        p.total_quotation_value = dec!(1234);
        apply_quotation_stats(&mut p, &QuotationAggregates::default());
        assert_eq!(p.total_quotation_count, 0);
        assert_eq!(p.total_quotation_value, Decimal::ZERO);
    }
}
