mod invoice;
mod party;
mod profile;

pub use invoice::{Invoice, Ledger, LineItem};
pub use party::Party;
pub use profile::Profile;

use crate::error::{InvoiceError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.facture/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "facture") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.facture/
    let home = dirs_home().ok_or_else(|| {
        InvoiceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".facture"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Load parties.toml as a HashMap keyed by party id
pub fn load_parties(config_dir: &Path) -> Result<HashMap<String, Party>> {
    let path = config_dir.join("parties.toml");
    if !path.exists() {
        return Err(InvoiceError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })
}

/// Load the business profile. The file being absent is a valid state
/// (no profile configured yet), so this returns an Option.
pub fn load_profile(config_dir: &Path) -> Result<Option<Profile>> {
    let path = config_dir.join("business.toml");
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let profile = toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })?;
    Ok(Some(profile))
}

/// Load invoices.toml (empty ledger if missing)
pub fn load_ledger(config_dir: &Path) -> Result<Ledger> {
    let path = config_dir.join("invoices.toml");
    if !path.exists() {
        return Ok(Ledger::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })
}

/// Save invoices.toml. The invoice header and its line items are nested
/// in one record, so a single write commits them as one logical unit.
pub fn save_ledger(config_dir: &Path, ledger: &Ledger) -> Result<()> {
    let path = config_dir.join("invoices.toml");
    let content = toml::to_string_pretty(ledger).map_err(|e| {
        InvoiceError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for business.toml
pub const BUSINESS_TEMPLATE: &str = r#"brand_name = "YOUR BRAND NAME"
legal_name = "YOUR LEGAL NAME"
# siret = "123 456 789 00012"
# phone = "+33 6 12 34 56 78"
# email = "billing@example.com"
# address = "1 rue de l'Exemple, 75001 Paris"
# iban = "FR76 1234 5678 9012 3456 7890 123"
# bic = "EXAMPFRPP"
vat_note = "VAT not applicable, Art. 293 B of the French Tax Code"
"#;

/// Template content for parties.toml
pub const PARTIES_TEMPLATE: &str = r#"# Define your clients here. The table name (e.g., [acme]) is used
# as the party identifier in the create command.
#
# Example:
#   facture create --party acme --item "Development:650:3"

[example-party]
company_name = "Example Client Inc."
contact_person = "Jane Smith"     # optional
address = "456 Client Avenue"     # optional
city = "Los Angeles"              # optional
vat_number = "FR 12 345 678 901"  # optional
payment_term = "30 days"          # optional, defaults to "30 days"
"#;
