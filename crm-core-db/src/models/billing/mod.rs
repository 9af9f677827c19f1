pub mod bill;
pub mod invoice;
pub mod payment;

pub use bill::*;
pub use invoice::*;
pub use payment::*;
