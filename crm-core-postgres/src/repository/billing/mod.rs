pub mod bill_reader;
pub mod invoice_reader;
pub mod payment_reader;

pub use bill_reader::BillReaderImpl;
pub use invoice_reader::InvoiceReaderImpl;
pub use payment_reader::PaymentReaderImpl;
