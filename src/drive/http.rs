use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use ureq::Agent;

use super::{get_session, Archive, Session, UploadedFile};
use crate::error::{InvoiceError, Result};

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

// Drive calls are blocking; a global timeout keeps a slow or unreachable
// API from hanging invoice creation indefinitely.
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Deserialize)]
struct FileRef {
    id: String,
}

#[derive(Deserialize)]
struct CreatedFile {
    id: String,
    #[serde(rename = "webViewLink", default)]
    web_view_link: Option<String>,
}

/// Google Drive v3 archival backend. Credentials are read lazily per call
/// so that a missing token surfaces as AuthenticationRequired at the point
/// of use, where the composer decides whether it is fatal.
pub struct DriveClient {
    agent: Agent,
    config_dir: PathBuf,
}

impl DriveClient {
    pub fn new(config_dir: PathBuf) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .build()
            .into();
        Self { agent, config_dir }
    }

    fn session(&self) -> Result<Session> {
        get_session(&self.config_dir)
    }

    fn bearer(session: &Session) -> String {
        format!("Bearer {}", session.access_token)
    }
}

/// Map a transport or HTTP error onto the invoice error taxonomy.
/// 401/403 mean the token is missing scope or expired.
fn map_err(op: &str, err: ureq::Error) -> InvoiceError {
    match err {
        ureq::Error::StatusCode(code) if code == 401 || code == 403 => {
            InvoiceError::AuthenticationRequired(format!(
                "Drive API rejected the access token (HTTP {code}). Refresh credentials/token.json."
            ))
        }
        other => InvoiceError::Upstream {
            op: op.to_string(),
            detail: other.to_string(),
        },
    }
}

/// Build a Drive list query matching a folder by name and parent.
/// Single quotes in names are escaped to keep the query well formed.
fn folder_query(name: &str, parent: Option<&str>) -> String {
    let escaped = name.replace('\'', "\\'");
    let parent = parent.unwrap_or("root");
    format!(
        "name='{escaped}' and mimeType='{FOLDER_MIME}' and '{parent}' in parents and trashed=false"
    )
}

/// Assemble a multipart/related body: a JSON metadata part followed by the
/// media part, as the Drive upload endpoint expects.
fn multipart_body(boundary: &str, metadata: &serde_json::Value, mime_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

impl Archive for DriveClient {
    fn find_folder(&self, name: &str, parent: Option<&str>) -> Result<Option<String>> {
        let session = self.session()?;
        let mut response = self
            .agent
            .get(FILES_URL)
            .header("Authorization", Self::bearer(&session))
            .query("q", &folder_query(name, parent))
            .query("spaces", "drive")
            .query("fields", "files(id, name)")
            .call()
            .map_err(|e| map_err("folder lookup", e))?;

        let list: FileList = response
            .body_mut()
            .read_json()
            .map_err(|e| map_err("folder lookup", e))?;

        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    fn create_folder(&self, name: &str, parent: Option<&str>) -> Result<String> {
        let session = self.session()?;
        let mut metadata = json!({
            "name": name,
            "mimeType": FOLDER_MIME,
        });
        if let Some(parent) = parent {
            metadata["parents"] = json!([parent]);
        }

        let mut response = self
            .agent
            .post(FILES_URL)
            .header("Authorization", Self::bearer(&session))
            .query("fields", "id")
            .send_json(&metadata)
            .map_err(|e| map_err("folder creation", e))?;

        let created: CreatedFile = response
            .body_mut()
            .read_json()
            .map_err(|e| map_err("folder creation", e))?;

        Ok(created.id)
    }

    fn upload(
        &self,
        folder_id: &str,
        filename: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<UploadedFile> {
        let session = self.session()?;
        let metadata = json!({
            "name": filename,
            "parents": [folder_id],
        });

        let boundary = "facture_upload_boundary";
        let body = multipart_body(boundary, &metadata, mime_type, bytes);

        let mut response = self
            .agent
            .post(UPLOAD_URL)
            .header("Authorization", Self::bearer(&session))
            .header(
                "Content-Type",
                format!("multipart/related; boundary={boundary}"),
            )
            .query("uploadType", "multipart")
            .query("fields", "id, webViewLink")
            .send(&body[..])
            .map_err(|e| map_err("upload", e))?;

        let created: CreatedFile = response
            .body_mut()
            .read_json()
            .map_err(|e| map_err("upload", e))?;

        let url = created.web_view_link.unwrap_or_else(|| {
            format!("https://drive.google.com/file/d/{}/view", created.id)
        });

        Ok(UploadedFile {
            id: created.id,
            url,
        })
    }

    fn delete(&self, id: &str) -> Result<()> {
        let session = self.session()?;
        self.agent
            .delete(format!("{FILES_URL}/{id}"))
            .header("Authorization", Self::bearer(&session))
            .call()
            .map_err(|e| map_err("delete", e))?;
        Ok(())
    }
}
