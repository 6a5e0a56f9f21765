//! Folds per-page extraction results into one logical record and combines
//! per-page OCR text into a single document text.

use crate::types::PageResult;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Placeholder the backend (and this fold) uses for missing values.
pub const NOT_AVAILABLE: &str = "غير متوفر";

fn html_tag() -> &'static Regex {
    static HTML_TAG: OnceLock<Regex> = OnceLock::new();
    HTML_TAG.get_or_init(|| Regex::new("<[^>]+>").expect("valid literal regex"))
}

fn is_sentinel(text: &str) -> bool {
    text.is_empty() || text.eq_ignore_ascii_case("undefined") || text.eq_ignore_ascii_case("null")
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Flatten one backend value to a display string. `None` means the key is
/// dropped: null and the sentinel strings `""`, `"undefined"`, `"null"` carry
/// no information. Sequences are joined with `", "`; an empty sequence stands
/// in for a field the backend saw but could not read.
pub fn flatten_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(items) => {
            if items.is_empty() {
                return Some(NOT_AVAILABLE.to_string());
            }
            let joined = items
                .iter()
                .map(scalar_string)
                .collect::<Vec<_>>()
                .join(", ");
            Some(joined)
        }
        other => {
            let text = scalar_string(other);
            if is_sentinel(&text) {
                None
            } else {
                Some(text)
            }
        }
    }
}

/// Fold an ordered page sequence into one flat field mapping.
///
/// Later pages overwrite earlier pages on key collision (last-write-wins, not
/// a merge). When `selected_page` has a session re-analysis, that data stands
/// in for the page's original extraction. `overrides` are applied last and
/// win unconditionally unless empty. Pages without an agent result are
/// skipped.
pub fn combine_extracted_data(
    pages: &[PageResult],
    selected_page: Option<u32>,
    reanalyzed: Option<&IndexMap<String, Value>>,
    overrides: &IndexMap<String, String>,
) -> IndexMap<String, String> {
    let mut combined: IndexMap<String, String> = IndexMap::new();

    for page in pages {
        let substitute = reanalyzed.filter(|_| Some(page.page_number) == selected_page);
        let data = match substitute {
            Some(data) => data,
            None => match &page.agent_result {
                Some(agent) => &agent.extracted_data,
                None => continue,
            },
        };
        for (key, value) in data {
            if let Some(text) = flatten_value(value) {
                combined.insert(key.clone(), text);
            }
        }
    }

    for (key, value) in overrides {
        let text = value.trim();
        if is_sentinel(text) {
            continue;
        }
        combined.insert(key.clone(), text.to_string());
    }

    combined
}

/// Combine per-page OCR text: strip HTML tags, drop empty pages, join with a
/// blank line.
pub fn combine_extracted_text(pages: &[PageResult]) -> String {
    let mut parts: Vec<String> = Vec::new();
    for page in pages {
        let Some(ocr) = &page.ocr_result else { continue };
        let stripped = html_tag().replace_all(&ocr.text, "");
        let trimmed = stripped.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed.to_string());
        }
    }
    parts.join("\n\n")
}
