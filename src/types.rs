use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Raw OCR output for one page: extracted text (possibly HTML-tagged) and a
/// 0-100 confidence score.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OcrOutput {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

/// Structured extraction from the backend's agent pipeline for one page.
/// Values in `extracted_data` may be scalars or sequences of scalars.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentOutput {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub extracted_data: IndexMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One page of a processed multi-page document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub page_number: u32,
    #[serde(default)]
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_result: Option<OcrOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_result: Option<AgentOutput>,
    #[serde(default)]
    pub processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate counts the backend attaches to a completed upload. Entity lists
/// (document numbers, names, ...) are carried opaquely in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessingSummary {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub successful_pages: u32,
    #[serde(default)]
    pub failed_pages: u32,
    #[serde(default)]
    pub total_processing_time: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Top-level record returned by POST /upload for one document. Immutable once
/// received; the session holds it as the source of truth for one upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub filename: String,
    #[serde(default, alias = "doc_id", skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub pages: Vec<PageResult>,
    #[serde(default)]
    pub summary: ProcessingSummary,
}

/// Response from POST /reanalyze (LLM re-run over edited OCR text).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReanalyzeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub extracted_data: IndexMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /health response. The backend reports either `status` or `api` for the
/// overall state and a per-service component map.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HealthStatus {
    #[serde(default, alias = "api")]
    pub status: String,
    #[serde(
        default,
        alias = "components",
        skip_serializing_if = "Option::is_none"
    )]
    pub services: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One entry from GET /documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocumentListResponse {
    #[serde(default)]
    pub documents: Vec<DocumentSummary>,
}

/// Response from POST /analyze-document; the analysis body is backend-defined
/// and passed through to the UI untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub analysis: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// One row of the editable export table. Independent of the extraction once
/// created: edits and deletions never feed back into the combined record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: String,
    pub key: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_parses_backend_shape() {
        let json = r#"{
            "filename": "residence.pdf",
            "file_size": 120034,
            "file_type": "pdf",
            "timestamp": "2024-05-01T10:00:00",
            "pages": [
                {
                    "page_number": 1,
                    "success": true,
                    "processing_time": 4.2,
                    "ocr_result": {"success": true, "text": "نص", "confidence": 88.5},
                    "agent_result": {
                        "success": true,
                        "extracted_data": {
                            "رقم_المستند": "117-11-2018",
                            "الأسماء_الشخصية": ["محمد", "سليم"]
                        },
                        "classification": {"نوع_الوثيقة": "إفادة سكن"}
                    }
                }
            ],
            "summary": {
                "total_pages": 1,
                "successful_pages": 1,
                "failed_pages": 0,
                "total_processing_time": 4.2,
                "document_types": ["إفادة سكن"]
            }
        }"#;
        let result: ProcessingResult = serde_json::from_str(json).expect("parse");
        assert_eq!(result.filename, "residence.pdf");
        assert_eq!(result.pages.len(), 1);
        let agent = result.pages[0].agent_result.as_ref().expect("agent");
        assert_eq!(agent.extracted_data.len(), 2);
        assert_eq!(result.summary.successful_pages, 1);
        assert!(result.summary.extra.contains_key("document_types"));
    }

    #[test]
    fn page_without_agent_result_parses() {
        let json = r#"{"page_number": 2, "success": false, "error": "OCR failed"}"#;
        let page: PageResult = serde_json::from_str(json).expect("parse");
        assert!(page.agent_result.is_none());
        assert_eq!(page.error.as_deref(), Some("OCR failed"));
    }

    #[test]
    fn health_accepts_both_status_spellings() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "unhealthy", "error": "timeout"}"#).expect("parse");
        assert_eq!(health.status, "unhealthy");
        assert_eq!(health.error.as_deref(), Some("timeout"));

        let health: HealthStatus =
            serde_json::from_str(r#"{"api": "healthy", "components": {"qari": {"status": "ok"}}}"#)
                .expect("parse");
        assert_eq!(health.status, "healthy");
        assert!(health.services.is_some());
        assert!(health.error.is_none());
    }

    #[test]
    fn reanalyze_response_defaults_missing_fields() {
        let response: ReanalyzeResponse =
            serde_json::from_str(r#"{"success": true, "extracted_data": {"التاريخ": "2024"}}"#)
                .expect("parse");
        assert!(response.success);
        assert_eq!(response.extracted_data.len(), 1);
        assert!(response.page_number.is_none());
    }

    #[test]
    fn document_list_defaults_to_empty() {
        let list: DocumentListResponse = serde_json::from_str("{}").expect("parse");
        assert!(list.documents.is_empty());
    }
}
