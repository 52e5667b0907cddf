mod drive;
mod error;
mod invoice;
mod pdf;
mod store;

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use crate::drive::DriveClient;
use crate::error::{InvoiceError, Result};
use crate::invoice::{
    attach_file, create_invoice, delete_invoice, format_amount, group_line_items, invoice_total,
    next_invoice_number, CreateInvoice, LineBlock,
};
use crate::pdf::TypstRenderer;
use crate::store::{config_dir, LineItem, BUSINESS_TEMPLATE, PARTIES_TEMPLATE};

#[derive(Parser)]
#[command(name = "facture")]
#[command(version, about = "CLI invoicing system with Google Drive archival", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.facture or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Create a new invoice, render its PDF and archive it to Drive
    Create {
        /// Party identifier from parties.toml
        #[arg(short, long)]
        party: String,

        /// Line items in format "description:rate:quantity[:unit[:group]]"
        /// (can be repeated)
        #[arg(short, long, value_name = "DESC:RATE:QTY")]
        item: Vec<String>,

        /// Explicit invoice number (default: next number for the period)
        #[arg(short, long)]
        number: Option<String>,

        /// Invoice date as YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show the next invoice number without reserving it
    NextNumber,

    /// List invoices
    List {
        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one invoice in detail
    Show {
        /// Invoice number or index from 'list' (e.g., 1 or 20240101)
        invoice: String,
    },

    /// Delete an invoice (and its Drive folder, best effort)
    Delete {
        /// Invoice number or index from 'list' (e.g., 1 or 20240101)
        invoice: String,
    },

    /// Upload a file attachment into an invoice's Drive folder
    Attach {
        /// Invoice number or index from 'list' (e.g., 1 or 20240101)
        invoice: String,

        /// Path to the file to upload
        file: PathBuf,

        /// MIME type (default: inferred from the file extension)
        #[arg(long)]
        mime: Option<String>,
    },

    /// List configured parties
    Parties,

    /// Show the business profile
    Business,
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Create {
            party,
            item,
            number,
            date,
        } => cmd_create(&cfg_dir, &party, &item, number, date),
        Commands::NextNumber => cmd_next_number(&cfg_dir),
        Commands::List { limit } => cmd_list(&cfg_dir, limit),
        Commands::Show { invoice } => cmd_show(&cfg_dir, &invoice),
        Commands::Delete { invoice } => cmd_delete(&cfg_dir, &invoice),
        Commands::Attach {
            invoice,
            file,
            mime,
        } => cmd_attach(&cfg_dir, &invoice, &file, mime.as_deref()),
        Commands::Parties => cmd_parties(&cfg_dir),
        Commands::Business => cmd_business(&cfg_dir),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(InvoiceError::AlreadyInitialized(cfg_dir.clone()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("credentials"))?;

    fs::write(cfg_dir.join("business.toml"), BUSINESS_TEMPLATE)?;
    fs::write(cfg_dir.join("parties.toml"), PARTIES_TEMPLATE)?;

    println!("Initialized facture config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your business details:  $EDITOR {}/business.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Add your parties:            $EDITOR {}/parties.toml",
        cfg_dir.display()
    );
    println!(
        "  3. (optional) Drive archival:   place an access token in {}/credentials/token.json",
        cfg_dir.display()
    );
    println!();
    println!("Then create your first invoice:");
    println!("  facture create --party <party-id> --item \"<description>:<rate>:<quantity>\"");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct PartyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "COMPANY")]
    company: String,
    #[tabled(rename = "CONTACT")]
    contact: String,
    #[tabled(rename = "PAYMENT TERM")]
    payment_term: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "PARTY")]
    party: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "ARCHIVED")]
    archived: String,
}

/// Parse an item input like "Development:650:3:days:Sprint 12"
fn parse_item_input(input: &str) -> Result<LineItem> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() < 3 || parts.len() > 5 {
        return Err(InvoiceError::InvalidItemFormat(input.to_string()));
    }

    let description = parts[0].trim();
    if description.is_empty() {
        return Err(InvoiceError::InvalidItemFormat(input.to_string()));
    }

    let rate: f64 = parts[1].parse().map_err(|_| InvoiceError::InvalidRate {
        item: description.to_string(),
        rate: parts[1].to_string(),
        reason: "must be a number".to_string(),
    })?;

    let quantity: f64 = parts[2].parse().map_err(|_| InvoiceError::InvalidQuantity {
        item: description.to_string(),
        qty: parts[2].to_string(),
        reason: "must be a number".to_string(),
    })?;
    if quantity <= 0.0 {
        return Err(InvoiceError::InvalidQuantity {
            item: description.to_string(),
            qty: parts[2].to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    let unit = match parts.get(3) {
        Some(u) if !u.trim().is_empty() => u.trim().to_string(),
        _ => "days".to_string(),
    };

    let group = parts
        .get(4)
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .map(|g| g.to_string());

    Ok(LineItem {
        description: description.to_string(),
        rate,
        quantity,
        unit,
        group,
    })
}

/// Create a new invoice
fn cmd_create(
    cfg_dir: &PathBuf,
    party: &str,
    items_input: &[String],
    number: Option<String>,
    date: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.clone()));
    }

    if items_input.is_empty() {
        return Err(InvoiceError::NoItems);
    }

    let line_items: Vec<LineItem> = items_input
        .iter()
        .map(|input| parse_item_input(input))
        .collect::<Result<_>>()?;

    let date: NaiveDate = match date {
        Some(s) => {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| InvoiceError::InvalidDate(s))?
        }
        None => Local::now().date_naive(),
    };

    let request = CreateInvoice {
        number,
        date,
        party: party.to_string(),
        line_items,
    };

    let archive = DriveClient::new(cfg_dir.clone());
    let created = create_invoice(cfg_dir, &TypstRenderer, &archive, request)?;

    let parties = store::load_parties(cfg_dir)?;
    let company = parties
        .get(&created.party)
        .map(|p| p.company_name.clone())
        .unwrap_or_else(|| created.party.clone());

    println!("Created {}", created.number);
    println!("  Party:  {company}");
    println!("  Total:  {} €", format_amount(created.total()));
    match &created.drive_file_url {
        Some(url) => println!("  Drive:  {url}"),
        None => println!("  Drive:  not archived (credentials missing or upload failed)"),
    }

    Ok(())
}

/// Show the next invoice number for the current period
fn cmd_next_number(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.clone()));
    }

    let ledger = store::load_ledger(cfg_dir)?;
    let number = next_invoice_number(Local::now().date_naive(), &ledger.numbers());
    println!("{number}");

    Ok(())
}

/// List invoices, newest first
fn cmd_list(cfg_dir: &PathBuf, limit: Option<usize>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.clone()));
    }

    let ledger = store::load_ledger(cfg_dir)?;

    if ledger.invoices.is_empty() {
        println!("No invoices yet.");
        return Ok(());
    }

    let invoices: Vec<_> = ledger.invoices.iter().rev().enumerate().collect();
    let invoices = match limit {
        Some(n) => &invoices[..n.min(invoices.len())],
        None => &invoices[..],
    };

    let rows: Vec<InvoiceRow> = invoices
        .iter()
        .map(|(idx, inv)| InvoiceRow {
            index: idx + 1,
            number: inv.number.clone(),
            date: inv.date.to_string(),
            party: inv.party.clone(),
            total: format_amount(inv.total()),
            archived: if inv.drive_file_id.is_some() {
                "yes".to_string()
            } else {
                "-".to_string()
            },
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    println!();
    println!("Total: {} invoices", ledger.invoices.len());
    println!("Use index number with show/delete/attach (e.g., 'facture show 1')");

    Ok(())
}

/// Show one invoice in detail
fn cmd_show(cfg_dir: &PathBuf, invoice_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.clone()));
    }

    let number = invoice::resolve_invoice_number(cfg_dir, invoice_ref)?;
    let ledger = store::load_ledger(cfg_dir)?;
    let inv = ledger
        .find(&number)
        .ok_or_else(|| InvoiceError::InvoiceNotFound(number.clone()))?;

    let parties = store::load_parties(cfg_dir)?;
    let company = parties
        .get(&inv.party)
        .map(|p| p.company_name.clone())
        .unwrap_or_else(|| inv.party.clone());

    println!("Invoice {}", inv.number);
    println!("  Date:          {}", inv.date);
    println!("  Party:         {company}");
    println!("  Payment term:  {}", inv.payment_term);
    println!();

    for block in group_line_items(&inv.line_items) {
        match block {
            LineBlock::Group { name, items } => {
                println!("  [{name}]");
                for item in items {
                    println!(
                        "    {} - {} x {} {} = {}",
                        item.description, item.rate, item.quantity, item.unit, item.total
                    );
                }
            }
            LineBlock::Item(item) => {
                println!(
                    "  {} - {} x {} {} = {}",
                    item.description, item.rate, item.quantity, item.unit, item.total
                );
            }
        }
    }

    println!();
    println!("  Total: {} €", format_amount(invoice_total(&inv.line_items)));

    if let Some(url) = &inv.drive_file_url {
        println!("  Drive: {url}");
    }
    if let Some(folder) = &inv.drive_folder_id {
        println!("  Drive folder id: {folder}");
    }

    Ok(())
}

/// Delete an invoice and, best effort, its Drive folder
fn cmd_delete(cfg_dir: &PathBuf, invoice_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.clone()));
    }

    let archive = DriveClient::new(cfg_dir.clone());
    let number = delete_invoice(cfg_dir, &archive, invoice_ref)?;

    println!("Deleted {number}");
    Ok(())
}

/// Upload an attachment into an invoice's Drive folder
fn cmd_attach(
    cfg_dir: &PathBuf,
    invoice_ref: &str,
    file: &PathBuf,
    mime: Option<&str>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.clone()));
    }

    if !file.exists() {
        return Err(InvoiceError::AttachmentNotFound(file.clone()));
    }

    let bytes = std::fs::read(file)?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| InvoiceError::AttachmentNotFound(file.clone()))?;

    let archive = DriveClient::new(cfg_dir.clone());
    let uploaded = attach_file(cfg_dir, &archive, invoice_ref, &bytes, filename, mime)?;

    println!("Uploaded {filename}");
    println!("  File id: {}", uploaded.id);
    println!("  URL:     {}", uploaded.url);

    Ok(())
}

/// List configured parties
fn cmd_parties(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.clone()));
    }

    let parties = store::load_parties(cfg_dir)?;

    if parties.is_empty() {
        println!("No parties configured.");
        println!("Add parties to: {}/parties.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = parties.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<PartyRow> = sorted
        .iter()
        .map(|(id, party)| PartyRow {
            id: id.to_string(),
            company: party.company_name.clone(),
            contact: party.contact_person.clone().unwrap_or_else(|| "-".to_string()),
            payment_term: party.payment_term.clone(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Show the business profile
fn cmd_business(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.clone()));
    }

    let Some(profile) = store::load_profile(cfg_dir)? else {
        println!("Business details not configured.");
        println!("Create {}/business.toml to set them.", cfg_dir.display());
        return Ok(());
    };

    println!("Business profile");
    println!("{}", "-".repeat(50));
    println!("Brand name: {}", profile.brand_name);
    println!("Legal name: {}", profile.legal_name);
    if let Some(siret) = &profile.siret {
        println!("SIRET:      {siret}");
    }
    if let Some(phone) = &profile.phone {
        println!("Phone:      {phone}");
    }
    if let Some(email) = &profile.email {
        println!("Email:      {email}");
    }
    if let Some(address) = &profile.address {
        println!("Address:    {address}");
    }
    if let Some(iban) = &profile.iban {
        println!("IBAN:       {iban}");
    }
    if let Some(bic) = &profile.bic {
        println!("BIC:        {bic}");
    }
    println!("VAT note:   {}", profile.vat_note);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_parsing_with_defaults() {
        let item = parse_item_input("Development:650:3").unwrap();
        assert_eq!(item.description, "Development");
        assert_eq!(item.rate, 650.0);
        assert_eq!(item.quantity, 3.0);
        assert_eq!(item.unit, "days");
        assert_eq!(item.group, None);
    }

    #[test]
    fn item_parsing_with_unit_and_group() {
        let item = parse_item_input("Review:400:0.5:hours:Sprint 12").unwrap();
        assert_eq!(item.unit, "hours");
        assert_eq!(item.group.as_deref(), Some("Sprint 12"));
    }

    #[test]
    fn item_parsing_rejects_bad_shapes() {
        assert!(parse_item_input("just-a-description").is_err());
        assert!(parse_item_input("desc:rate:qty:unit:group:extra").is_err());
        assert!(parse_item_input(":650:3").is_err());
        assert!(parse_item_input("desc:abc:3").is_err());
        assert!(parse_item_input("desc:650:0").is_err());
        assert!(parse_item_input("desc:650:-1").is_err());
    }

    #[test]
    fn negative_rate_is_tolerated() {
        // Rates are expected to be >= 0 but deliberately not enforced
        let item = parse_item_input("Credit note:-100:1").unwrap();
        assert_eq!(item.rate, -100.0);
    }
}
