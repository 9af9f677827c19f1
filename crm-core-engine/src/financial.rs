//! Derived financial metrics.
//!
//! Two formulas exist for budget utilization and profit: the committed-spend
//! variant used by full recalculation and the cash-basis variant used when
//! composing the dashboard. Both are named strategies behind one trait so
//! each call site states which formula it runs.

use rust_decimal::{Decimal, RoundingStrategy};

use crm_core_db::models::project::{ProjectModel, ProjectStatus};

/// Half-up to 2 decimal places, for currency amounts and percentages.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole * 100`, 0 when `whole <= 0`.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_money(part / whole * Decimal::ONE_HUNDRED)
}

/// `part / whole` at 2 decimal places, 0 when `whole <= 0`.
pub fn ratio_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_money(part / whole)
}

/// Writes `budget_utilized`, `budget_utilization_percent`,
/// `projected_profit` and `profit_margin_percent` onto the project.
pub trait FinancialMetrics: Send + Sync {
    fn apply(&self, project: &mut ProjectModel);
}

/// Committed-spend formula: utilization is the committed purchase order
/// value net of cancellations, profit is budget minus that commitment.
pub struct CommittedSpendMetrics;

impl FinancialMetrics for CommittedSpendMetrics {
    fn apply(&self, project: &mut ProjectModel) {
        let budget = project.budget;
        let utilized = project.total_po_value - project.cancelled_po_value;
        project.budget_utilized = round_money(utilized);
        project.budget_utilization_percent = percent_of(utilized, budget);

        let profit = budget - utilized;
        project.projected_profit = round_money(profit);
        project.profit_margin_percent = percent_of(profit, budget);
    }
}

/// Cash-basis formula: utilization is money actually paid to vendors.
/// Once the project completes, profit becomes realized: client receipts
/// minus vendor payments, with the margin taken over receipts.
pub struct CashBasisMetrics;

impl FinancialMetrics for CashBasisMetrics {
    fn apply(&self, project: &mut ProjectModel) {
        let budget = project.budget;
        let spent = project.paid_bill_value;
        project.budget_utilized = round_money(spent);
        project.budget_utilization_percent = percent_of(spent, budget);

        let (profit, margin) = if project.status == ProjectStatus::Completed {
            let realized = project.paid_invoice_value - project.paid_bill_value;
            (realized, percent_of(realized, project.paid_invoice_value))
        } else {
            let projected = budget - spent;
            (projected, percent_of(projected, budget))
        };
        project.projected_profit = round_money(profit);
        project.profit_margin_percent = margin;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn project(budget: Decimal) -> ProjectModel {
        ProjectModel::new(1, "PRJ-0001", "Test", ProjectStatus::InProgress, budget)
    }

    #[test]
    fn committed_spend_scenario() {
        let mut p = project(dec!(100000));
        p.total_po_value = dec!(40000);
        p.cancelled_po_value = dec!(10000);

        CommittedSpendMetrics.apply(&mut p);

        assert_eq!(p.budget_utilized, dec!(30000));
        assert_eq!(p.budget_utilization_percent, dec!(30.00));
        assert_eq!(p.projected_profit, dec!(70000));
        assert_eq!(p.profit_margin_percent, dec!(70.00));
    }

    #[test]
    fn cash_basis_completed_uses_realized_profit() {
        let mut p = project(dec!(100000));
        p.status = ProjectStatus::Completed;
        p.paid_invoice_value = dec!(90000);
        p.paid_bill_value = dec!(30000);

        CashBasisMetrics.apply(&mut p);

        assert_eq!(p.projected_profit, dec!(60000));
        assert_eq!(p.profit_margin_percent, dec!(66.67));
        assert_eq!(p.budget_utilized, dec!(30000));
        assert_eq!(p.budget_utilization_percent, dec!(30.00));
    }

    #[test]
    fn cash_basis_in_progress_projects_from_budget() {
        let mut p = project(dec!(200000));
        p.paid_bill_value = dec!(50000);

        CashBasisMetrics.apply(&mut p);

        assert_eq!(p.projected_profit, dec!(150000));
        assert_eq!(p.profit_margin_percent, dec!(75.00));
    }

    #[test]
    fn zero_budget_never_divides() {
        for budget in [Decimal::ZERO, dec!(-5)] {
            let mut p = project(budget);
            p.total_po_value = dec!(40000);
            CommittedSpendMetrics.apply(&mut p);
            assert_eq!(p.budget_utilization_percent, Decimal::ZERO);
            assert_eq!(p.profit_margin_percent, Decimal::ZERO);

            let mut p = project(budget);
            p.paid_bill_value = dec!(100);
            CashBasisMetrics.apply(&mut p);
            assert_eq!(p.budget_utilization_percent, Decimal::ZERO);
            assert_eq!(p.profit_margin_percent, Decimal::ZERO);
        }
    }

    #[test]
    fn completed_with_no_receipts_has_zero_margin() {
        let mut p = project(dec!(1000));
        p.status = ProjectStatus::Completed;
        p.paid_bill_value = dec!(400);

        CashBasisMetrics.apply(&mut p);

        assert_eq!(p.projected_profit, dec!(-400));
        assert_eq!(p.profit_margin_percent, Decimal::ZERO);
    }

    #[test]
    fn percentages_round_half_up() {
        assert_eq!(percent_of(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(percent_of(dec!(2), dec!(3)), dec!(66.67));
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
    }
}
