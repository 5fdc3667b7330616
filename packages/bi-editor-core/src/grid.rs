//! Grid state: the last loaded snapshot and the working copy being edited.
//!
//! Both copies are parallel row sequences. A cell is changed when its text
//! in the working copy differs from the text in the loaded copy; that is
//! the only notion of dirtiness, so typing a value back to its original
//! clears the flag.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::change::Change;
use crate::error::EditorError;
use crate::row::{cell_text, Row};
use crate::snapshot::DataPayload;

/// Header cell of the rendered grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub column: String,
    pub label: String,
    pub editable: bool,
}

/// Body cell of the rendered grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell {
    /// Input pre-filled with the working value
    Input { value: String, changed: bool },
    /// Read-only text
    Text(String),
}

/// Rendered grid: one header, then one row of cells per data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGrid {
    pub header: Vec<HeaderCell>,
    pub rows: Vec<Vec<GridCell>>,
}

/// Loaded snapshot plus working copy.
#[derive(Debug, Clone)]
pub struct GridState {
    table: String,
    pk: Vec<String>,
    columns: Vec<String>,
    editable: HashSet<String>,
    bi_cols: Vec<String>,
    loaded: Vec<Row>,
    working: Vec<Row>,
}

impl GridState {
    /// Builds the state from a `/data` payload.
    pub fn load(payload: DataPayload) -> Self {
        let editable = payload.bi_cols.iter().cloned().collect();
        Self {
            table: payload.table,
            pk: payload.pk,
            columns: payload.columns,
            editable,
            bi_cols: payload.bi_cols,
            working: payload.rows.clone(),
            loaded: payload.rows,
        }
    }

    /// Replaces both copies, discarding unsaved edits.
    pub fn reload(&mut self, payload: DataPayload) {
        *self = Self::load(payload);
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn row_count(&self) -> usize {
        self.working.len()
    }

    /// Returns true if `column` accepts edits.
    pub fn is_editable(&self, column: &str) -> bool {
        self.editable.contains(column)
    }

    /// Writes `text` into the working copy.
    ///
    /// Returns whether the cell now differs from the loaded value.
    pub fn set_cell(&mut self, row: usize, column: &str, text: &str) -> Result<bool, EditorError> {
        if !self.is_editable(column) {
            return Err(EditorError::validation(format!(
                "Column not allowed (not BI): {}",
                column
            )));
        }
        let working = self
            .working
            .get_mut(row)
            .ok_or_else(|| EditorError::validation(format!("Row {} out of range", row)))?;
        working.insert(column, Value::String(text.to_string()));
        Ok(self.is_changed(row, column))
    }

    /// Returns true if the working cell text differs from the loaded one.
    pub fn is_changed(&self, row: usize, column: &str) -> bool {
        match (self.loaded.get(row), self.working.get(row)) {
            (Some(loaded), Some(working)) => {
                loaded.cell_text(column) != working.cell_text(column)
            }
            _ => false,
        }
    }

    /// Number of rows with at least one changed editable cell.
    pub fn dirty_rows(&self) -> usize {
        (0..self.working.len())
            .filter(|&i| self.bi_cols.iter().any(|c| self.is_changed(i, c)))
            .count()
    }

    /// Renders the header and every row against the current working copy.
    pub fn render(&self) -> RenderedGrid {
        let header = self
            .columns
            .iter()
            .map(|column| {
                let editable = self.is_editable(column);
                HeaderCell {
                    column: column.clone(),
                    label: if editable {
                        format!("{} (editable)", column)
                    } else {
                        column.clone()
                    },
                    editable,
                }
            })
            .collect();

        let rows = self
            .working
            .iter()
            .enumerate()
            .map(|(i, row)| {
                self.columns
                    .iter()
                    .map(|column| {
                        let value = row.get(column).map(cell_text).unwrap_or_default();
                        if self.is_editable(column) {
                            GridCell::Input {
                                changed: self.is_changed(i, column),
                                value,
                            }
                        } else {
                            GridCell::Text(value)
                        }
                    })
                    .collect()
            })
            .collect();

        RenderedGrid { header, rows }
    }

    /// Builds the minimal change-set for the current edits.
    ///
    /// Keys come from the loaded rows so an edit can never retarget a row.
    /// Rows without differences produce nothing.
    pub fn build_changes(&self) -> Vec<Change> {
        let mut changes = Vec::new();

        for (loaded, working) in self.loaded.iter().zip(&self.working) {
            let mut set = Map::new();
            for column in &self.bi_cols {
                if loaded.cell_text(column) != working.cell_text(column) {
                    set.insert(
                        column.clone(),
                        working.get(column).cloned().unwrap_or(Value::Null),
                    );
                }
            }
            if set.is_empty() {
                continue;
            }

            let pk = self
                .pk
                .iter()
                .map(|k| (k.clone(), loaded.get(k).cloned().unwrap_or(Value::Null)))
                .collect();

            changes.push(Change { pk, set });
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> DataPayload {
        serde_json::from_value(json!({
            "table": "items",
            "limit": 200,
            "pk": ["id"],
            "columns": ["id", "name", "bi_price", "bi_note"],
            "biCols": ["bi_price", "bi_note"],
            "rows": [
                {"id": 1, "name": "a", "bi_price": 10, "bi_note": null},
                {"id": 2, "name": "b", "bi_price": 15, "bi_note": "x"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_no_edits_no_changes() {
        let grid = GridState::load(payload());
        assert!(grid.build_changes().is_empty());
        assert_eq!(grid.dirty_rows(), 0);
    }

    #[test]
    fn test_same_text_is_not_a_change() {
        let mut grid = GridState::load(payload());
        // "10" typed over the number 10, "" typed over null
        assert!(!grid.set_cell(0, "bi_price", "10").unwrap());
        assert!(!grid.set_cell(0, "bi_note", "").unwrap());
        assert!(grid.build_changes().is_empty());
    }

    #[test]
    fn test_single_edit_yields_single_change() {
        let mut grid = GridState::load(payload());
        assert!(grid.set_cell(1, "bi_price", "20").unwrap());

        let changes = grid.build_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].pk, json!({"id": 2}).as_object().unwrap().clone());
        assert_eq!(
            changes[0].set,
            json!({"bi_price": "20"}).as_object().unwrap().clone()
        );
    }

    #[test]
    fn test_reverting_clears_flag() {
        let mut grid = GridState::load(payload());
        assert!(grid.set_cell(0, "bi_note", "hola").unwrap());
        assert_eq!(grid.dirty_rows(), 1);
        assert!(!grid.set_cell(0, "bi_note", "").unwrap());
        assert_eq!(grid.dirty_rows(), 0);
    }

    #[test]
    fn test_rejects_non_editable_and_out_of_range() {
        let mut grid = GridState::load(payload());
        assert!(grid.set_cell(0, "name", "z").is_err());
        assert!(grid.set_cell(0, "id", "9").is_err());
        assert!(grid.set_cell(5, "bi_price", "1").is_err());
    }

    #[test]
    fn test_render_marks_changed_inputs() {
        let mut grid = GridState::load(payload());
        grid.set_cell(0, "bi_price", "11").unwrap();
        let rendered = grid.render();

        let labels: Vec<&str> = rendered.header.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["id", "name", "bi_price (editable)", "bi_note (editable)"]
        );
        assert_eq!(rendered.rows.len(), 2);
        assert_eq!(rendered.rows[0][0], GridCell::Text("1".to_string()));
        assert_eq!(
            rendered.rows[0][2],
            GridCell::Input {
                value: "11".to_string(),
                changed: true
            }
        );
        assert_eq!(
            rendered.rows[0][3],
            GridCell::Input {
                value: String::new(),
                changed: false
            }
        );
    }

    #[test]
    fn test_reload_discards_edits() {
        let mut grid = GridState::load(payload());
        grid.set_cell(0, "bi_price", "99").unwrap();
        grid.reload(payload());
        assert!(grid.build_changes().is_empty());
        assert_eq!(grid.table(), "items");
        assert_eq!(grid.row_count(), 2);
    }
}
