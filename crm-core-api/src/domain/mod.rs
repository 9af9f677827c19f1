pub mod dashboard;
pub mod stats;

pub use dashboard::*;
pub use stats::*;
