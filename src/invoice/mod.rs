mod composer;
mod lines;
mod number;

pub use composer::{
    attach_file, create_invoice, delete_invoice, resolve_invoice_number, CreateInvoice,
};
pub use lines::{format_amount, group_line_items, invoice_total, FormattedItem, LineBlock};
pub use number::{is_well_formed, next_invoice_number};
