use std::path::Path;

use chrono::NaiveDate;

use crate::drive::{self, Archive, UploadedFile};
use crate::error::{InvoiceError, Result};
use crate::invoice::number::{is_well_formed, next_invoice_number};
use crate::pdf::Renderer;
use crate::store::{self, Invoice, LineItem};

/// Invoice-creation request
#[derive(Debug)]
pub struct CreateInvoice {
    /// Explicit invoice number; allocated from the date's period when None
    pub number: Option<String>,
    pub date: NaiveDate,
    /// Party id from parties.toml
    pub party: String,
    pub line_items: Vec<LineItem>,
}

/// Create an invoice: validate, persist header + line items as one unit,
/// render the PDF and archive it to Drive. Archival is best-effort; any
/// failure there leaves the invoice persisted without drive identifiers.
pub fn create_invoice(
    config_dir: &Path,
    renderer: &dyn Renderer,
    archive: &dyn Archive,
    request: CreateInvoice,
) -> Result<Invoice> {
    let parties = store::load_parties(config_dir)?;
    let party = parties
        .get(&request.party)
        .ok_or_else(|| InvoiceError::PartyNotFound(request.party.clone()))?;

    if request.line_items.is_empty() {
        return Err(InvoiceError::NoItems);
    }
    for item in &request.line_items {
        if item.description.trim().is_empty() {
            return Err(InvoiceError::InvalidItemFormat(
                "empty description".to_string(),
            ));
        }
    }

    let mut ledger = store::load_ledger(config_dir)?;

    let number = match request.number {
        Some(n) => {
            if !is_well_formed(&n) {
                return Err(InvoiceError::InvalidInvoiceNumber(n));
            }
            if ledger.find(&n).is_some() {
                return Err(InvoiceError::DuplicateInvoiceNumber(n));
            }
            n
        }
        None => next_invoice_number(request.date, &ledger.numbers()),
    };

    // The profile must exist before anything is persisted. Checking after
    // the commit can leave an invoice behind with no PDF and no archive.
    let profile =
        store::load_profile(config_dir)?.ok_or(InvoiceError::BusinessProfileMissing)?;

    let mut invoice = Invoice {
        number: number.clone(),
        date: request.date,
        party: request.party.clone(),
        payment_term: party.payment_term.clone(),
        drive_file_id: None,
        drive_file_url: None,
        drive_folder_id: None,
        line_items: request.line_items,
    };

    // One write commits the header and all line items together
    ledger.invoices.push(invoice.clone());
    store::save_ledger(config_dir, &ledger)?;

    let pdf_bytes = renderer.render(&invoice, party, &profile)?;

    match drive::archive_invoice_pdf(archive, &party.company_name, &number, &pdf_bytes) {
        Ok(archived) => {
            invoice.drive_file_id = Some(archived.file_id);
            invoice.drive_file_url = Some(archived.file_url);
            invoice.drive_folder_id = Some(archived.folder_id);
            if let Some(entry) = ledger.find_mut(&number) {
                *entry = invoice.clone();
            }
            store::save_ledger(config_dir, &ledger)?;
        }
        Err(e) => {
            log::warn!("invoice {number} created but not archived to Drive: {e}");
        }
    }

    Ok(invoice)
}

/// Resolve an invoice reference to the actual invoice number.
/// Accepts either the full invoice number or an index (1-based, newest
/// first) from 'list'. Invoice numbers are all digits, so an exact match
/// is tried first and an 8-digit reference is never read as an index.
pub fn resolve_invoice_number(config_dir: &Path, reference: &str) -> Result<String> {
    let ledger = store::load_ledger(config_dir)?;

    if ledger.find(reference).is_some() {
        return Ok(reference.to_string());
    }

    if is_well_formed(reference) {
        return Err(InvoiceError::InvoiceNotFound(reference.to_string()));
    }

    if let Ok(idx) = reference.parse::<usize>() {
        if idx == 0 {
            return Err(InvoiceError::InvalidInvoiceIndex(reference.to_string()));
        }
        let invoices: Vec<_> = ledger.invoices.iter().rev().collect();
        if idx > invoices.len() {
            return Err(InvoiceError::InvalidInvoiceIndex(reference.to_string()));
        }
        return Ok(invoices[idx - 1].number.clone());
    }

    Err(InvoiceError::InvoiceNotFound(reference.to_string()))
}

/// Delete an invoice and its line items. The Drive-side folder (or file,
/// when only a file id was recorded) is deleted first; Drive failures are
/// logged and never block the local delete.
pub fn delete_invoice(config_dir: &Path, archive: &dyn Archive, reference: &str) -> Result<String> {
    let number = resolve_invoice_number(config_dir, reference)?;
    let mut ledger = store::load_ledger(config_dir)?;

    let idx = ledger
        .invoices
        .iter()
        .position(|i| i.number == number)
        .ok_or_else(|| InvoiceError::InvoiceNotFound(number.clone()))?;

    let invoice = &ledger.invoices[idx];
    if let Some(folder_id) = &invoice.drive_folder_id {
        // The folder holds the PDF and any attachments
        if let Err(e) = archive.delete(folder_id) {
            log::warn!("could not delete Drive folder for invoice {number}: {e}");
        }
    } else if let Some(file_id) = &invoice.drive_file_id {
        if let Err(e) = archive.delete(file_id) {
            log::warn!("could not delete Drive file for invoice {number}: {e}");
        }
    }

    ledger.invoices.remove(idx);
    store::save_ledger(config_dir, &ledger)?;

    Ok(number)
}

/// Upload an ad-hoc attachment into an invoice's Drive folder, creating
/// the folder hierarchy (and persisting the new folder id) when the
/// invoice was never archived. Unlike creation-time archival, failures
/// here propagate to the caller.
pub fn attach_file(
    config_dir: &Path,
    archive: &dyn Archive,
    reference: &str,
    bytes: &[u8],
    filename: &str,
    mime_type: Option<&str>,
) -> Result<UploadedFile> {
    let number = resolve_invoice_number(config_dir, reference)?;
    let mut ledger = store::load_ledger(config_dir)?;

    let (party_id, existing_folder) = {
        let invoice = ledger
            .find(&number)
            .ok_or_else(|| InvoiceError::InvoiceNotFound(number.clone()))?;
        (invoice.party.clone(), invoice.drive_folder_id.clone())
    };

    let folder_id = match existing_folder {
        Some(id) => id,
        None => {
            let parties = store::load_parties(config_dir)?;
            let party = parties
                .get(&party_id)
                .ok_or_else(|| InvoiceError::PartyNotFound(party_id.clone()))?;

            let id = drive::invoice_folder(archive, &party.company_name, &number)?;
            if let Some(entry) = ledger.find_mut(&number) {
                entry.drive_folder_id = Some(id.clone());
            }
            store::save_ledger(config_dir, &ledger)?;
            id
        }
    };

    let mime = match mime_type {
        Some(m) => m.to_string(),
        None => drive::mime_for(filename),
    };

    archive.upload(&folder_id, filename, &mime, bytes)
}
