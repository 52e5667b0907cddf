mod http;

pub use http::DriveClient;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{InvoiceError, Result};

/// Name of the root folder holding all archived invoices
pub const ROOT_FOLDER: &str = "Invoices";

/// An uploaded file's opaque id and viewer URL
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub id: String,
    pub url: String,
}

/// Identifiers returned after archiving an invoice PDF
#[derive(Debug, Clone)]
pub struct ArchivedPdf {
    pub file_id: String,
    pub file_url: String,
    pub folder_id: String,
}

/// External file-storage backend. Folder lookup and creation are separate
/// so that lookup-or-create can be made idempotent on top of any impl.
pub trait Archive {
    /// Find a folder by name under the given parent (root when None)
    fn find_folder(&self, name: &str, parent: Option<&str>) -> Result<Option<String>>;

    /// Create a folder under the given parent, returning its id
    fn create_folder(&self, name: &str, parent: Option<&str>) -> Result<String>;

    /// Upload file contents into a folder
    fn upload(
        &self,
        folder_id: &str,
        filename: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<UploadedFile>;

    /// Delete a file or folder (recursively) by id
    fn delete(&self, id: &str) -> Result<()>;
}

/// Credential material for the archival backend
#[derive(Debug, Deserialize)]
pub struct Session {
    pub access_token: String,
}

pub fn token_path(config_dir: &Path) -> PathBuf {
    config_dir.join("credentials").join("token.json")
}

/// Read the stored access token. OAuth flows are out of scope; the token
/// file is provisioned externally and its absence means archival is
/// unavailable, not that the application is broken.
pub fn get_session(config_dir: &Path) -> Result<Session> {
    let path = token_path(config_dir);
    if !path.exists() {
        return Err(InvoiceError::AuthenticationRequired(format!(
            "no token file at {}. Place a Drive access token there to enable archival.",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(&path)?;
    let session: Session = serde_json::from_str(&content).map_err(|e| {
        InvoiceError::AuthenticationRequired(format!(
            "could not parse {}: {e}",
            path.display()
        ))
    })?;
    if session.access_token.trim().is_empty() {
        return Err(InvoiceError::AuthenticationRequired(format!(
            "empty access token in {}",
            path.display()
        )));
    }
    Ok(session)
}

/// Get a folder by (name, parent), creating it only when the lookup finds
/// nothing. Repeated calls with the same arguments return the same id.
pub fn get_or_create_folder(
    archive: &dyn Archive,
    name: &str,
    parent: Option<&str>,
) -> Result<String> {
    if let Some(id) = archive.find_folder(name, parent)? {
        return Ok(id);
    }
    archive.create_folder(name, parent)
}

/// Resolve the stable three-level folder for an invoice:
/// "Invoices" -> client name -> invoice number
pub fn invoice_folder(
    archive: &dyn Archive,
    company_name: &str,
    invoice_number: &str,
) -> Result<String> {
    let root = get_or_create_folder(archive, ROOT_FOLDER, None)?;
    let client = get_or_create_folder(archive, company_name, Some(&root))?;
    get_or_create_folder(archive, invoice_number, Some(&client))
}

/// Upload a rendered invoice PDF into its per-client, per-invoice folder
pub fn archive_invoice_pdf(
    archive: &dyn Archive,
    company_name: &str,
    invoice_number: &str,
    pdf_bytes: &[u8],
) -> Result<ArchivedPdf> {
    let folder_id = invoice_folder(archive, company_name, invoice_number)?;
    let filename = format!("invoice_{invoice_number}.pdf");
    let uploaded = archive.upload(&folder_id, &filename, "application/pdf", pdf_bytes)?;
    Ok(ArchivedPdf {
        file_id: uploaded.id,
        file_url: uploaded.url,
        folder_id,
    })
}

/// Infer a MIME type from the filename extension, falling back to a
/// generic binary type
pub fn mime_for(filename: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
    .to_string()
}
