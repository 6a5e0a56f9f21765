use crate::client::{self, ApiClient};
use crate::documents::{self, SortKey};
use crate::export;
use crate::labels;
use crate::session::Session;
use crate::types::{
    AnalysisResponse, DocumentSummary, HealthStatus, ProcessingResult, ReanalyzeResponse, TableRow,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;
use tauri::{AppHandle, Manager, State};

const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

pub struct AppState {
    pub session: Mutex<Session>,
    pub client: ApiClient,
}

#[derive(Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        ValidationResult {
            valid: true,
            error: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        ValidationResult {
            valid: false,
            error: Some(message.into()),
        }
    }
}

/// One combined field enriched with both label vocabularies for the insights
/// view.
#[derive(Serialize)]
pub struct InsightField {
    pub key: String,
    pub english_label: String,
    pub display_label: String,
    pub value: String,
}

/// Per-page badge data for the page list (confidence color, duration label).
#[derive(Serialize)]
pub struct PageOverview {
    pub page_number: u32,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub confidence_color: &'static str,
    pub processing_time: f64,
    pub processing_time_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[tauri::command]
pub fn get_app_version(app: AppHandle) -> String {
    app.package_info().version.to_string()
}

#[tauri::command]
pub fn open_app_data_folder(app: AppHandle) -> Result<(), String> {
    let path = app.path().app_data_dir().map_err(|e| e.to_string())?;
    opener::open(&path).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_backend_url(state: State<AppState>) -> String {
    state.client.base_url().to_string()
}

#[tauri::command]
pub fn get_backend_status() -> String {
    match std::env::var("DOCS_BACKEND_URL") {
        Ok(url) if !url.trim().is_empty() => "configured".to_string(),
        _ => "default".to_string(),
    }
}

#[tauri::command]
pub async fn check_health(state: State<'_, AppState>) -> Result<HealthStatus, String> {
    let client = state.client.clone();
    tauri::async_runtime::spawn_blocking(move || client.health())
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

/// Validate an upload candidate: accepted type (by extension and magic
/// bytes), at most 50 MiB, readable. Reported as a value so the UI can show
/// it inline; an invalid file never reaches the backend.
pub fn validate_file(path: &Path) -> Result<ValidationResult, String> {
    if !path.exists() {
        return Ok(ValidationResult::fail("File not found."));
    }
    let metadata = fs::metadata(path).map_err(|e| e.to_string())?;
    if metadata.len() > MAX_UPLOAD_BYTES {
        return Ok(ValidationResult::fail(format!(
            "File too large: {} (max 50 MB).",
            client::format_file_size(metadata.len())
        )));
    }
    let Some(mime) = client::mime_for_extension(path) else {
        return Ok(ValidationResult::fail(
            "Unsupported file type. Upload a PDF, PNG or JPEG.",
        ));
    };

    let mut file = fs::File::open(path).map_err(|e| format!("Could not open: {}", e))?;
    let mut header = [0u8; 8];
    let read = file.read(&mut header).unwrap_or(0);
    let magic_ok = match mime {
        "application/pdf" => read >= 5 && header.starts_with(b"%PDF-"),
        "image/png" => read >= 8 && header == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        "image/jpeg" => read >= 3 && header.starts_with(&[0xFF, 0xD8, 0xFF]),
        _ => false,
    };
    if !magic_ok {
        return Ok(ValidationResult::fail(
            "File content does not match its extension.",
        ));
    }
    Ok(ValidationResult::ok())
}

#[tauri::command]
pub fn validate_document_file(path: String) -> Result<ValidationResult, String> {
    validate_file(Path::new(&path))
}

/// Validate, then post the file and install the backend's result as the
/// session's source of truth.
#[tauri::command]
pub async fn upload_document(
    state: State<'_, AppState>,
    path: String,
) -> Result<ProcessingResult, String> {
    let validation = validate_file(Path::new(&path))?;
    if !validation.valid {
        return Err(validation
            .error
            .unwrap_or_else(|| "Invalid file.".to_string()));
    }

    let client = state.client.clone();
    let upload_path = path.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        client.upload(Path::new(&upload_path))
    })
    .await
    .map_err(|e| e.to_string())?
    .map_err(|e| e.to_string())?;

    tracing::info!(
        filename = %result.filename,
        pages = result.pages.len(),
        "document processed"
    );
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.set_result(result.clone());
    Ok(result)
}

/// Re-run the LLM extraction over user-edited OCR text for one page. The
/// substituted data feeds the insights view; the table is left alone.
#[tauri::command]
pub async fn reanalyze_page(
    state: State<'_, AppState>,
    page_number: u32,
    ocr_text: String,
) -> Result<ReanalyzeResponse, String> {
    let (doc_id, filename) = {
        let session = state.session.lock().map_err(|e| e.to_string())?;
        let result = session.result().ok_or("No document loaded.")?;
        (
            result
                .document_id
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            result.filename.clone(),
        )
    };

    let client = state.client.clone();
    let response = tauri::async_runtime::spawn_blocking(move || {
        client.reanalyze(&doc_id, &filename, page_number, &ocr_text)
    })
    .await
    .map_err(|e| e.to_string())?
    .map_err(|e| e.to_string())?;

    if response.success {
        let mut session = state.session.lock().map_err(|e| e.to_string())?;
        session.apply_reanalysis(page_number, response.extracted_data.clone());
    } else {
        tracing::warn!(page_number, "re-analysis reported failure");
    }
    Ok(response)
}

/// Supplementary backend analysis over the current combined record.
#[tauri::command]
pub async fn run_document_analysis(
    state: State<'_, AppState>,
) -> Result<AnalysisResponse, String> {
    let (fields, text, filename) = {
        let session = state.session.lock().map_err(|e| e.to_string())?;
        let result = session.result().ok_or("No document loaded.")?;
        (
            session.combined_fields(),
            session.combined_text(),
            result.filename.clone(),
        )
    };

    let client = state.client.clone();
    tauri::async_runtime::spawn_blocking(move || {
        client.analyze_document(&fields, &text, &filename)
    })
    .await
    .map_err(|e| e.to_string())?
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_document_status(
    state: State<'_, AppState>,
    document_id: String,
) -> Result<serde_json::Value, String> {
    let client = state.client.clone();
    tauri::async_runtime::spawn_blocking(move || client.status(&document_id))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_document_result(
    state: State<'_, AppState>,
    document_id: String,
) -> Result<serde_json::Value, String> {
    let client = state.client.clone();
    tauri::async_runtime::spawn_blocking(move || client.result(&document_id))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

/// Fetch the backend's document list, then filter and sort locally.
#[tauri::command]
pub async fn get_documents(
    state: State<'_, AppState>,
    search: Option<String>,
    sort_by: Option<String>,
) -> Result<Vec<DocumentSummary>, String> {
    let client = state.client.clone();
    let all = tauri::async_runtime::spawn_blocking(move || client.documents())
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    let mut filtered = documents::filter_documents(&all, search.as_deref().unwrap_or(""));
    let key = sort_by
        .as_deref()
        .map(SortKey::parse)
        .unwrap_or_default();
    documents::sort_documents(&mut filtered, key);
    Ok(filtered)
}

#[tauri::command]
pub fn get_combined_fields(
    state: State<AppState>,
) -> Result<IndexMap<String, String>, String> {
    let session = state.session.lock().map_err(|e| e.to_string())?;
    Ok(session.combined_fields())
}

#[tauri::command]
pub fn get_insight_fields(state: State<AppState>) -> Result<Vec<InsightField>, String> {
    let session = state.session.lock().map_err(|e| e.to_string())?;
    let fields = session.combined_fields();
    Ok(fields
        .into_iter()
        .map(|(key, value)| {
            let english_label = labels::english_label(&key);
            let lookup = english_label.replace(' ', "_");
            let translated = labels::display_label(&lookup);
            // Unknown English labels fall through the table unchanged; show
            // the raw backend key instead of the underscored fallback.
            let display_label = if translated == lookup {
                key.clone()
            } else {
                translated
            };
            InsightField {
                key,
                english_label,
                display_label,
                value,
            }
        })
        .collect())
}

#[tauri::command]
pub fn get_combined_text(state: State<AppState>) -> Result<String, String> {
    let session = state.session.lock().map_err(|e| e.to_string())?;
    Ok(session.combined_text())
}

#[tauri::command]
pub fn get_page_overview(state: State<AppState>) -> Result<Vec<PageOverview>, String> {
    let session = state.session.lock().map_err(|e| e.to_string())?;
    let pages = session
        .result()
        .map(|result| result.pages.as_slice())
        .unwrap_or(&[]);
    Ok(pages
        .iter()
        .map(|page| {
            let confidence = page.ocr_result.as_ref().and_then(|ocr| ocr.confidence);
            PageOverview {
                page_number: page.page_number,
                success: page.success,
                confidence,
                confidence_color: client::confidence_color(confidence.unwrap_or(0.0)),
                processing_time: page.processing_time,
                processing_time_label: client::format_duration(page.processing_time),
                error: page.error.clone(),
            }
        })
        .collect())
}

#[tauri::command]
pub fn select_page(state: State<AppState>, page_number: u32) -> Result<(), String> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.select_page(page_number);
    Ok(())
}

#[tauri::command]
pub fn set_field_override(
    state: State<AppState>,
    key: String,
    value: String,
) -> Result<IndexMap<String, String>, String> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.set_override(key, value);
    Ok(session.combined_fields())
}

#[tauri::command]
pub fn clear_field_overrides(state: State<AppState>) -> Result<(), String> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.clear_overrides();
    Ok(())
}

/// Everything the table view renders: rows, the row currently in editing
/// state, and the staged new-row inputs.
#[derive(Serialize)]
pub struct TableViewState {
    pub rows: Vec<TableRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editing: Option<String>,
    pub new_key: String,
    pub new_value: String,
}

#[tauri::command]
pub fn get_table_state(state: State<AppState>) -> Result<TableViewState, String> {
    let session = state.session.lock().map_err(|e| e.to_string())?;
    let table = session.table();
    let (new_key, new_value) = table.staged();
    Ok(TableViewState {
        rows: table.rows().to_vec(),
        editing: table.editing().map(String::from),
        new_key: new_key.to_string(),
        new_value: new_value.to_string(),
    })
}

#[tauri::command]
pub fn get_table_rows(state: State<AppState>) -> Result<Vec<TableRow>, String> {
    let session = state.session.lock().map_err(|e| e.to_string())?;
    Ok(session.table_rows())
}

#[tauri::command]
pub fn stage_new_row(state: State<AppState>, key: String, value: String) -> Result<(), String> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.table_mut().stage_new_row(key, value);
    Ok(())
}

#[tauri::command]
pub fn add_table_row(state: State<AppState>) -> Result<Vec<TableRow>, String> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.table_mut().add_row()?;
    Ok(session.table_rows())
}

#[tauri::command]
pub fn begin_row_edit(state: State<AppState>, id: String) -> Result<(), String> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.table_mut().begin_edit(&id)
}

#[tauri::command]
pub fn save_row_edit(
    state: State<AppState>,
    id: String,
    key: String,
    value: String,
) -> Result<Vec<TableRow>, String> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.table_mut().save_edit(&id, key, value)?;
    Ok(session.table_rows())
}

#[tauri::command]
pub fn cancel_row_edit(state: State<AppState>) -> Result<(), String> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.table_mut().cancel_edit();
    Ok(())
}

#[tauri::command]
pub fn delete_table_row(state: State<AppState>, id: String) -> Result<Vec<TableRow>, String> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.table_mut().delete_row(&id);
    Ok(session.table_rows())
}

/// Print path: write the table as a right-to-left HTML report and open it so
/// the user prints or saves to PDF.
#[tauri::command]
pub async fn export_report(state: State<'_, AppState>) -> Result<String, String> {
    let (rows, filename) = {
        let session = state.session.lock().map_err(|e| e.to_string())?;
        let result = session.result().ok_or("No document loaded.")?;
        (session.table_rows(), result.filename.clone())
    };
    tauri::async_runtime::spawn_blocking(move || export::export_report(&rows, &filename))
        .await
        .map_err(|e| e.to_string())?
}

/// Dump the full original processing result (not the edited table) as JSON.
#[tauri::command]
pub async fn export_result_json(state: State<'_, AppState>) -> Result<String, String> {
    let result = {
        let session = state.session.lock().map_err(|e| e.to_string())?;
        session.result().ok_or("No document loaded.")?.clone()
    };
    tauri::async_runtime::spawn_blocking(move || export::export_result_json(&result))
        .await
        .map_err(|e| e.to_string())?
}

#[tauri::command]
pub async fn export_table_excel(state: State<'_, AppState>) -> Result<String, String> {
    let (rows, filename) = {
        let session = state.session.lock().map_err(|e| e.to_string())?;
        let result = session.result().ok_or("No document loaded.")?;
        (session.table_rows(), result.filename.clone())
    };
    tauri::async_runtime::spawn_blocking(move || export::export_table_excel(&rows, &filename))
        .await
        .map_err(|e| e.to_string())?
}

/// Base64 of a local file for the in-app document preview.
#[tauri::command]
pub fn read_file_base64(path: String) -> Result<String, String> {
    let bytes = fs::read(Path::new(&path)).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            "File not found.".to_string()
        } else {
            format!("Could not read file: {}", e)
        }
    })?;
    Ok(BASE64.encode(&bytes))
}

#[tauri::command]
pub fn reset_session(state: State<AppState>) -> Result<(), String> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.reset();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).expect("create");
        file.write_all(bytes).expect("write");
        path
    }

    #[test]
    fn accepts_a_small_pdf() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "doc.pdf", b"%PDF-1.4\nhello");
        let result = validate_file(&path).expect("validate");
        assert!(result.valid, "{:?}", result.error);
    }

    #[test]
    fn accepts_png_and_jpeg_magic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let png = write_file(
            &dir,
            "scan.png",
            &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00],
        );
        let jpg = write_file(&dir, "scan.jpg", &[0xFF, 0xD8, 0xFF, 0xE0, 0x00]);
        assert!(validate_file(&png).expect("validate").valid);
        assert!(validate_file(&jpg).expect("validate").valid);
    }

    #[test]
    fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "notes.txt", b"plain text");
        let result = validate_file(&path).expect("validate");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("Unsupported"));
    }

    #[test]
    fn rejects_mismatched_magic_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "fake.pdf", b"GIF89a not a pdf");
        let result = validate_file(&path).expect("validate");
        assert!(!result.valid);
    }

    #[test]
    fn rejects_files_over_50_mib() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("big.pdf");
        let file = fs::File::create(&path).expect("create");
        file.set_len(51 * 1024 * 1024).expect("set_len");
        let result = validate_file(&path).expect("validate");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("too large"));
    }

    #[test]
    fn accepts_a_10_mib_pdf() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("medium.pdf");
        let mut file = fs::File::create(&path).expect("create");
        file.write_all(b"%PDF-1.4\n").expect("write header");
        file.set_len(10 * 1024 * 1024).expect("set_len");
        let result = validate_file(&path).expect("validate");
        assert!(result.valid, "{:?}", result.error);
    }

    #[test]
    fn rejects_missing_file() {
        let result = validate_file(Path::new("/nonexistent/never.pdf")).expect("validate");
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("File not found."));
    }
}
