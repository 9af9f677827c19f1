use std::fmt;

use serde::{Deserialize, Serialize};

/// Source domain whose mutation triggers a targeted stats update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsDomain {
    PurchaseOrders,
    Quotations,
    Bills,
    Vendors,
    Invoices,
}

impl fmt::Display for StatsDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsDomain::PurchaseOrders => write!(f, "purchase-orders"),
            StatsDomain::Quotations => write!(f, "quotations"),
            StatsDomain::Bills => write!(f, "bills"),
            StatsDomain::Vendors => write!(f, "vendors"),
            StatsDomain::Invoices => write!(f, "invoices"),
        }
    }
}

/// Outcome of a bulk recalculation over all active projects.
///
/// A failed project never aborts the batch; it is logged and counted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationSummary {
    pub success_count: u32,
    pub fail_count: u32,
}

impl RecalculationSummary {
    pub fn total(&self) -> u32 {
        self.success_count + self.fail_count
    }
}

/// Staleness threshold after which a project is due for recalculation.
pub fn default_staleness() -> chrono::Duration {
    chrono::Duration::hours(24)
}
