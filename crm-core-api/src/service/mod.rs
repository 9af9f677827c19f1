pub mod project_dashboard;
pub mod project_stats;

pub use project_dashboard::*;
pub use project_stats::*;
