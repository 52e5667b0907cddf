use std::process::Command;

use serde::Serialize;

use super::Renderer;
use crate::error::{InvoiceError, Result};
use crate::invoice::{format_amount, group_line_items, invoice_total, LineBlock};
use crate::store::{Invoice, Party, Profile};

/// Embedded Typst template for invoice generation.
/// Uses a placeholder that gets replaced with the actual JSON file path.
const INVOICE_TEMPLATE: &str = r##"// Invoice Template
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  paper: "a4",
  margin: (top: 2.2cm, bottom: 2.2cm, left: 2cm, right: 2cm),
)

#set text(font: "Helvetica", size: 10pt)

// Header with brand name and invoice details
#grid(
  columns: (1fr, 1fr),
  align: (left, right),
  [
    #text(size: 20pt, weight: "bold")[#data.brand_name]
    #v(0.3em)
    #text(size: 9pt, fill: gray)[#data.legal_name]
  ],
  [
    #text(size: 22pt, weight: "bold")[INVOICE]
    #v(0.5em)
    #table(
      columns: (auto, auto),
      stroke: none,
      align: (right, left),
      inset: 2pt,
      [*Invoice \#:*], [#data.number],
      [*Date:*], [#data.date],
    )
  ]
)

#v(1em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(1em)

// Bill To section
#grid(
  columns: (1fr, 1fr),
  [
    #text(weight: "bold", size: 11pt)[Bill To:]
    #v(0.3em)
    #text(weight: "bold")[#data.party.company_name]
    #if data.party.contact_person != none [
      \ #data.party.contact_person
    ]
    #if data.party.address != none [
      \ #data.party.address
    ]
    #if data.party.city != none [
      \ #data.party.city
    ]
    #if data.party.vat_number != none [
      \ VAT: #data.party.vat_number
    ]
  ],
  []
)

#v(1.5em)

// Line items table: group blocks render as full-width headings
#table(
  columns: (1fr, auto, auto, auto, auto),
  align: (left, right, right, left, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else { (bottom: 0.5pt + gray) },
  inset: 8pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  // Header
  [*Description*], [*Rate*], [*Qty*], [*Unit*], [*Amount*],

  // Blocks
  ..data.blocks.map(block => {
    if block.kind == "group" {
      (table.cell(colspan: 5, fill: luma(250))[#text(weight: "bold")[#block.name]],)
        + block.items.map(item => (
          item.description,
          item.rate,
          item.quantity,
          item.unit,
          item.total,
        )).flatten()
    } else {
      (block.description, block.rate, block.quantity, block.unit, block.total)
    }
  }).flatten()
)

#v(1em)

// Grand total
#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 6pt,
    [*Total:*], [*#data.total €*],
  )
]

#v(1em)

#text(weight: "bold")[Payment Terms:] #data.payment_term

#v(2em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(0.5em)

// Business details footer
#set text(size: 8.5pt, fill: gray)
#data.legal_name
#if data.business.siret != none [
  --- SIRET: #data.business.siret
]
#if data.business.address != none [
  \ #data.business.address
]
#if data.business.phone != none [
  \ #data.business.phone
]
#if data.business.email != none [
  #if data.business.phone == none [ \ ]
  --- #data.business.email
]
#if data.business.iban != none [
  \ IBAN: #data.business.iban
]
#if data.business.bic != none [
  --- BIC: #data.business.bic
]
\ #data.business.vat_note
"##;

#[derive(Debug, Serialize)]
struct PartyData {
    company_name: String,
    contact_person: Option<String>,
    address: Option<String>,
    city: Option<String>,
    vat_number: Option<String>,
}

#[derive(Debug, Serialize)]
struct BusinessData {
    siret: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    iban: Option<String>,
    bic: Option<String>,
    vat_note: String,
}

/// Complete data handed to the template
#[derive(Debug, Serialize)]
struct RenderData {
    brand_name: String,
    legal_name: String,
    number: String,
    date: String,
    party: PartyData,
    blocks: Vec<LineBlock>,
    total: String,
    payment_term: String,
    business: BusinessData,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(InvoiceError::PdfGeneration(format!(
            "missing required field: {field}"
        )));
    }
    Ok(())
}

/// Assemble and validate the template data. Missing required fields fail
/// here, loudly, before any compilation happens.
fn build_render_data(invoice: &Invoice, party: &Party, profile: &Profile) -> Result<RenderData> {
    require("brand_name", &profile.brand_name)?;
    require("legal_name", &profile.legal_name)?;
    require("invoice number", &invoice.number)?;
    require("party company_name", &party.company_name)?;
    if invoice.line_items.is_empty() {
        return Err(InvoiceError::PdfGeneration(
            "invoice has no line items".to_string(),
        ));
    }

    Ok(RenderData {
        brand_name: profile.brand_name.clone(),
        legal_name: profile.legal_name.clone(),
        number: invoice.number.clone(),
        date: invoice.date.format("%d %B %Y").to_string(),
        party: PartyData {
            company_name: party.company_name.clone(),
            contact_person: party.contact_person.clone(),
            address: party.address.clone(),
            city: party.city.clone(),
            vat_number: party.vat_number.clone(),
        },
        blocks: group_line_items(&invoice.line_items),
        total: format_amount(invoice_total(&invoice.line_items)),
        payment_term: invoice.payment_term.clone(),
        business: BusinessData {
            siret: profile.siret.clone(),
            phone: profile.phone.clone(),
            email: profile.email.clone(),
            address: profile.address.clone(),
            iban: profile.iban.clone(),
            bic: profile.bic.clone(),
            vat_note: profile.vat_note.clone(),
        },
    })
}

/// Renders invoices by compiling the embedded template with the Typst CLI
pub struct TypstRenderer;

impl Renderer for TypstRenderer {
    fn render(&self, invoice: &Invoice, party: &Party, profile: &Profile) -> Result<Vec<u8>> {
        let data = build_render_data(invoice, party, profile)?;

        // Check if typst is available
        let typst_check = Command::new("typst").arg("--version").output();
        if typst_check.is_err() {
            return Err(InvoiceError::TypstNotFound);
        }

        // Create temp directory for template
        let temp_dir = std::env::temp_dir().join("facture");
        std::fs::create_dir_all(&temp_dir)?;

        let json_data = serde_json::to_string(&data)
            .map_err(|e| InvoiceError::PdfGeneration(e.to_string()))?;

        let json_name = format!("{}.json", invoice.number);
        let json_path = temp_dir.join(&json_name);
        std::fs::write(&json_path, &json_data)?;

        // Write template with relative JSON path (same directory)
        let template_content = INVOICE_TEMPLATE.replace("DATA_JSON_PATH", &json_name);
        let template_path = temp_dir.join(format!("{}.typ", invoice.number));
        std::fs::write(&template_path, &template_content)?;

        let output_path = temp_dir.join(format!("{}.pdf", invoice.number));

        // Run typst compile with root set to temp directory
        let output = Command::new("typst")
            .args([
                "compile",
                "--root",
                temp_dir.to_str().unwrap_or("."),
                template_path.to_str().unwrap_or(""),
                output_path.to_str().unwrap_or(""),
            ])
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InvoiceError::PdfGeneration(stderr.to_string()));
        }

        let pdf_bytes = std::fs::read(&output_path)?;

        // Clean up temp files
        let _ = std::fs::remove_file(&template_path);
        let _ = std::fs::remove_file(&json_path);
        let _ = std::fs::remove_file(&output_path);

        Ok(pdf_bytes)
    }
}
