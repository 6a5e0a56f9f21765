//! Per-upload session state: the received result, page selection, re-analysis
//! substitutions, user overrides and the editable table. Held in a `Mutex`
//! inside the Tauri managed state; every mutation goes through the update
//! functions here so the aggregation logic stays testable without a webview.

use crate::aggregate;
use crate::table::TableState;
use crate::types::{ProcessingResult, TableRow};
use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, Default)]
pub struct Session {
    result: Option<ProcessingResult>,
    selected_page: u32,
    /// Page number and extracted data of the last successful re-analysis.
    reanalyzed: Option<(u32, IndexMap<String, Value>)>,
    overrides: IndexMap<String, String>,
    table: TableState,
}

/// Identity under which a result's table seeding is tracked. The backend id
/// when present, otherwise filename plus timestamp.
fn result_identity(result: &ProcessingResult) -> String {
    match &result.document_id {
        Some(id) => id.clone(),
        None => format!(
            "{}@{}",
            result.filename,
            result.timestamp.as_deref().unwrap_or("")
        ),
    }
}

impl Session {
    pub fn result(&self) -> Option<&ProcessingResult> {
        self.result.as_ref()
    }

    pub fn selected_page(&self) -> u32 {
        self.selected_page
    }

    pub fn overrides(&self) -> &IndexMap<String, String> {
        &self.overrides
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableState {
        &mut self.table
    }

    /// Install a freshly received result: overrides and re-analysis from the
    /// previous document are dropped and the table is re-seeded (the seeding
    /// itself is idempotent per result identity).
    pub fn set_result(&mut self, result: ProcessingResult) {
        self.selected_page = 1;
        self.reanalyzed = None;
        self.overrides.clear();
        self.result = Some(result);
        self.reseed_table();
    }

    pub fn select_page(&mut self, page_number: u32) {
        self.selected_page = page_number;
    }

    /// Record a successful re-analysis of one page. Updates the insights view
    /// on the next aggregation; deliberately does NOT re-seed the table.
    pub fn apply_reanalysis(&mut self, page_number: u32, data: IndexMap<String, Value>) {
        self.reanalyzed = Some((page_number, data));
    }

    pub fn set_override(&mut self, key: String, value: String) {
        self.overrides.insert(key, value);
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    /// Drop everything; the next upload starts clean.
    pub fn reset(&mut self) {
        *self = Session::default();
    }

    /// The combined record: pages folded in order with the current page's
    /// re-analysis substituted, then overrides applied on top.
    pub fn combined_fields(&self) -> IndexMap<String, String> {
        let Some(result) = &self.result else {
            return IndexMap::new();
        };
        let reanalyzed = self
            .reanalyzed
            .as_ref()
            .filter(|(page, _)| *page == self.selected_page)
            .map(|(_, data)| data);
        aggregate::combine_extracted_data(
            &result.pages,
            Some(self.selected_page),
            reanalyzed,
            &self.overrides,
        )
    }

    /// Whole-document OCR text with HTML tags stripped.
    pub fn combined_text(&self) -> String {
        match &self.result {
            Some(result) => aggregate::combine_extracted_text(&result.pages),
            None => String::new(),
        }
    }

    pub fn table_rows(&self) -> Vec<TableRow> {
        self.table.rows().to_vec()
    }

    fn reseed_table(&mut self) {
        let Some(result) = &self.result else { return };
        let identity = result_identity(result);
        let fields = aggregate::combine_extracted_data(
            &result.pages,
            None,
            None,
            &IndexMap::new(),
        );
        self.table.seed(&identity, &fields);
    }
}
