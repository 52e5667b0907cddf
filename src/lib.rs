pub mod drive;
pub mod error;
pub mod invoice;
pub mod pdf;
pub mod store;

pub use error::{InvoiceError, Result};
pub use invoice::{create_invoice, CreateInvoice};
pub use store::{Invoice, Ledger, LineItem, Party, Profile};
