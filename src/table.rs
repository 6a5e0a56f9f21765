//! Editable export table: a mutable row list seeded once per processing
//! result and independent of the extraction afterwards.

use crate::types::TableRow;
use indexmap::IndexMap;

/// Row list plus the staged inputs for a new row and the single in-flight
/// edit. Row ids are session-local and never reused after deletion.
#[derive(Debug, Default)]
pub struct TableState {
    rows: Vec<TableRow>,
    editing: Option<String>,
    new_key: String,
    new_value: String,
    seeded_for: Option<String>,
    last_id_millis: i64,
}

impl TableState {
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn staged(&self) -> (&str, &str) {
        (&self.new_key, &self.new_value)
    }

    /// Millisecond timestamp + random suffix, with a monotonic guard so two
    /// rows created within the same millisecond still get distinct ids.
    fn next_row_id(&mut self) -> String {
        let mut millis = chrono::Utc::now().timestamp_millis();
        if millis <= self.last_id_millis {
            millis = self.last_id_millis + 1;
        }
        self.last_id_millis = millis;
        format!("row_{}_{:04x}", millis, rand::random::<u16>())
    }

    /// Replace the whole row list from the combined field mapping. Runs once
    /// per distinct result identity: re-seeding with the same identity is a
    /// no-op, so re-analysis never clobbers rows the user already edited.
    pub fn seed(&mut self, result_identity: &str, fields: &IndexMap<String, String>) -> bool {
        if self.seeded_for.as_deref() == Some(result_identity) {
            return false;
        }
        let mut rows = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            let id = self.next_row_id();
            rows.push(TableRow {
                id,
                key: key.clone(),
                value: value.clone(),
            });
        }
        self.rows = rows;
        self.editing = None;
        self.new_key.clear();
        self.new_value.clear();
        self.seeded_for = Some(result_identity.to_string());
        true
    }

    pub fn stage_new_row(&mut self, key: String, value: String) {
        self.new_key = key;
        self.new_value = value;
    }

    /// Append a row from the staged inputs and clear them.
    pub fn add_row(&mut self) -> Result<String, String> {
        if self.new_key.trim().is_empty() {
            return Err("Enter a field name for the new row.".to_string());
        }
        let id = self.next_row_id();
        self.rows.push(TableRow {
            id: id.clone(),
            key: self.new_key.trim().to_string(),
            value: self.new_value.trim().to_string(),
        });
        self.new_key.clear();
        self.new_value.clear();
        Ok(id)
    }

    /// Move one row into the editing state. Only one row may be edited at a
    /// time; a second begin while an edit is open is rejected.
    pub fn begin_edit(&mut self, id: &str) -> Result<(), String> {
        if !self.rows.iter().any(|r| r.id == id) {
            return Err("Row not found.".to_string());
        }
        match &self.editing {
            Some(current) if current != id => {
                Err("Finish the current edit before starting another.".to_string())
            }
            _ => {
                self.editing = Some(id.to_string());
                Ok(())
            }
        }
    }

    /// Commit key/value text in place and leave the editing state.
    pub fn save_edit(&mut self, id: &str, key: String, value: String) -> Result<(), String> {
        if self.editing.as_deref() != Some(id) {
            return Err("Row is not being edited.".to_string());
        }
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| "Row not found.".to_string())?;
        row.key = key;
        row.value = value;
        self.editing = None;
        Ok(())
    }

    /// Discard the in-flight edit, if any.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Remove a row by id. No undo; deleting an unknown id is a no-op.
    pub fn delete_row(&mut self, id: &str) {
        self.rows.retain(|r| r.id != id);
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
    }
}
