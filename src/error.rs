use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("Config directory not found at {0}. Run 'facture init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Party '{0}' not found in parties.toml")]
    PartyNotFound(String),

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invalid invoice index '{0}'. Use 'facture list' to see available invoices.")]
    InvalidInvoiceIndex(String),

    #[error("Business details not configured. Edit business.toml before creating invoices.")]
    BusinessProfileMissing,

    #[error("Invoice number '{0}' already exists")]
    DuplicateInvoiceNumber(String),

    #[error("Invalid invoice number '{0}'. Expected 8 digits in YYYYMMNN format.")]
    InvalidInvoiceNumber(String),

    #[error("Invalid item format '{0}'. Expected 'description:rate:quantity[:unit[:group]]'")]
    InvalidItemFormat(String),

    #[error("Invalid rate '{rate}' for item '{item}': {reason}")]
    InvalidRate {
        item: String,
        rate: String,
        reason: String,
    },

    #[error("Invalid quantity '{qty}' for item '{item}': {reason}")]
    InvalidQuantity {
        item: String,
        qty: String,
        reason: String,
    },

    #[error("No items specified. Use --item <description>:<rate>:<quantity> to add line items.")]
    NoItems,

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Drive credentials not found: {0}")]
    AuthenticationRequired(String),

    #[error("Drive API error during {op}: {detail}")]
    Upstream { op: String, detail: String },

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("Attachment file not found: {0}")]
    AttachmentNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
