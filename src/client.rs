//! Blocking HTTP client for the document-processing backend, plus the small
//! formatting helpers the UI shows next to its results.

use crate::types::{
    AnalysisResponse, DocumentListResponse, DocumentSummary, HealthStatus, ProcessingResult,
    ReanalyzeResponse,
};
use indexmap::IndexMap;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Backend base URL when `DOCS_BACKEND_URL` is not set.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Upper bound for health checks and reads. Uploads disable the timeout
/// entirely: the backend processes the whole document before answering.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Normalized transport/backend failure carrying a user-facing message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Cannot reach the processing backend at {0}. Check your connection and try again.")]
    Connection(String),
    #[error("The backend took too long to respond. Try again.")]
    Timeout,
    #[error("Backend error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("Unexpected response from the backend: {0}")]
    InvalidResponse(String),
    #[error("{0}")]
    Other(String),
}

/// Pull a human-readable message out of an error response body: the JSON
/// `detail`/`error`/`message` field when present, otherwise the raw body.
fn extract_error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.trim().is_empty() {
                    return Some(text.trim().to_string());
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Serialize)]
struct ReanalyzeRequest<'a> {
    doc_id: &'a str,
    filename: &'a str,
    page_number: u32,
    ocr_text: &'a str,
}

#[derive(Serialize)]
struct AnalyzeDocumentRequest<'a> {
    extracted_data: &'a IndexMap<String, String>,
    ocr_text: &'a str,
    filename: &'a str,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    upload_client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Other(e.to_string()))?;
        let upload_client = Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| ApiError::Other(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            upload_client,
        })
    }

    /// Backend URL from `DOCS_BACKEND_URL`, falling back to the local default.
    pub fn from_env() -> Result<Self, ApiError> {
        let base = std::env::var("DOCS_BACKEND_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Self::new(&base)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout
        } else if error.is_connect() {
            ApiError::Connection(self.base_url.clone())
        } else {
            ApiError::Other(error.to_string())
        }
    }

    fn check_status(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| "The backend reported an error.".to_string());
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .map_err(|e| self.send_error(e))?;
        self.check_status(response)?
            .json()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// GET /health. A degraded backend still answers 200 with its own
    /// `status`/`error` fields, so the caller decides how to surface it.
    pub fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/health")
    }

    /// POST /upload (multipart, field `file`). No timeout: the backend runs
    /// OCR and extraction synchronously and answers with the full result.
    pub fn upload(&self, file_path: &Path) -> Result<ProcessingResult, ApiError> {
        let bytes = std::fs::read(file_path)
            .map_err(|e| ApiError::Other(format!("Could not read file: {}", e)))?;
        let filename = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        let mime = mime_for_extension(file_path).unwrap_or("application/octet-stream");
        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str(mime)
            .map_err(|e| ApiError::Other(e.to_string()))?;
        let form = Form::new().part("file", part);

        tracing::debug!(path = %file_path.display(), "uploading document");
        let response = self
            .upload_client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .map_err(|e| self.send_error(e))?;
        self.check_status(response)?
            .json()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// POST /reanalyze: re-run the LLM extraction over edited OCR text
    /// without re-running OCR.
    pub fn reanalyze(
        &self,
        doc_id: &str,
        filename: &str,
        page_number: u32,
        ocr_text: &str,
    ) -> Result<ReanalyzeResponse, ApiError> {
        let body = ReanalyzeRequest {
            doc_id,
            filename,
            page_number,
            ocr_text,
        };
        let response = self
            .client
            .post(self.url("/reanalyze"))
            .json(&body)
            .send()
            .map_err(|e| self.send_error(e))?;
        self.check_status(response)?
            .json()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// GET /documents.
    pub fn documents(&self) -> Result<Vec<DocumentSummary>, ApiError> {
        let list: DocumentListResponse = self.get_json("/documents")?;
        Ok(list.documents)
    }

    /// GET /status/{id} (polling variant; not used by the primary flow).
    pub fn status(&self, document_id: &str) -> Result<serde_json::Value, ApiError> {
        self.get_json(&format!("/status/{}", document_id))
    }

    /// GET /result/{id} (polling variant; not used by the primary flow).
    pub fn result(&self, document_id: &str) -> Result<serde_json::Value, ApiError> {
        self.get_json(&format!("/result/{}", document_id))
    }

    /// POST /analyze-document: supplementary analysis over the combined
    /// fields and text.
    pub fn analyze_document(
        &self,
        extracted_data: &IndexMap<String, String>,
        ocr_text: &str,
        filename: &str,
    ) -> Result<AnalysisResponse, ApiError> {
        let body = AnalyzeDocumentRequest {
            extracted_data,
            ocr_text,
            filename,
        };
        let response = self
            .client
            .post(self.url("/analyze-document"))
            .json(&body)
            .send()
            .map_err(|e| self.send_error(e))?;
        self.check_status(response)?
            .json()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// MIME type for the accepted upload extensions.
pub fn mime_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// "12 B" / "820.0 KB" / "1.5 MB".
pub fn format_file_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

/// "0.8s" / "12.0s" / "2m 05s".
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 {
        return "0.0s".to_string();
    }
    if seconds < 60.0 {
        return format!("{:.1}s", seconds);
    }
    let total = seconds.round() as u64;
    format!("{}m {:02}s", total / 60, total % 60)
}

/// Badge color for a 0-100 confidence score.
pub fn confidence_color(confidence: f64) -> &'static str {
    if confidence >= 80.0 {
        "#16a34a"
    } else if confidence >= 50.0 {
        "#d97706"
    } else {
        "#dc2626"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_json_detail() {
        assert_eq!(
            extract_error_message(r#"{"detail": "No file uploaded"}"#),
            Some("No file uploaded".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"error": "timeout"}"#),
            Some("timeout".to_string())
        );
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(
            extract_error_message("Internal Server Error"),
            Some("Internal Server Error".to_string())
        );
        assert_eq!(extract_error_message("   "), None);
        assert_eq!(extract_error_message(r#"{"detail": ""}"#), None);
    }

    #[test]
    fn api_error_messages_are_user_facing() {
        let err = ApiError::Status {
            status: 500,
            message: "OCR failed".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error (500): OCR failed");
        assert!(ApiError::Connection("http://localhost:8000".to_string())
            .to_string()
            .contains("http://localhost:8000"));
    }

    #[test]
    fn mime_lookup_covers_accepted_types() {
        assert_eq!(
            mime_for_extension(Path::new("a.pdf")),
            Some("application/pdf")
        );
        assert_eq!(mime_for_extension(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_for_extension(Path::new("a.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for_extension(Path::new("a.txt")), None);
        assert_eq!(mime_for_extension(Path::new("noext")), None);
    }

    #[test]
    fn file_sizes_format_by_magnitude() {
        assert_eq!(format_file_size(12), "12 B");
        assert_eq!(format_file_size(10 * 1024), "10.0 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024 / 2), "1.5 MB");
    }

    #[test]
    fn durations_format_by_magnitude() {
        assert_eq!(format_duration(0.82), "0.8s");
        assert_eq!(format_duration(59.94), "59.9s");
        assert_eq!(format_duration(125.0), "2m 05s");
        assert_eq!(format_duration(-3.0), "0.0s");
    }

    #[test]
    fn confidence_maps_to_traffic_light_colors() {
        assert_eq!(confidence_color(95.0), "#16a34a");
        assert_eq!(confidence_color(80.0), "#16a34a");
        assert_eq!(confidence_color(65.0), "#d97706");
        assert_eq!(confidence_color(10.0), "#dc2626");
    }

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/").expect("client");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
