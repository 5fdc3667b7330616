//! In-memory table store.
//!
//! Holds a single table. Readers load the committed rows through `ArcSwap`
//! without blocking; writers serialize on a mutex, apply a batch to a
//! private copy, and publish it only if every change succeeded.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use bi_editor_core::ident::quote_ident;
use bi_editor_core::row::cell_text;
use bi_editor_core::sql::update_statements;
use bi_editor_core::{Change, EditorError, Row};

use crate::store::TableStore;

/// Single-table store kept in memory.
pub struct MemoryStore {
    table: String,
    columns: Vec<String>,
    rows: ArcSwap<Vec<Row>>,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Creates a store with an explicit column list.
    pub fn new(table: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            table: table.into(),
            columns,
            rows: ArcSwap::from_pointee(rows),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a store whose columns are the keys of the first row.
    pub fn from_rows(table: impl Into<String>, rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|r| r.columns().map(str::to_string).collect())
            .unwrap_or_default();
        Self::new(table, columns, rows)
    }

    /// Committed rows.
    pub fn rows(&self) -> Arc<Vec<Row>> {
        self.rows.load_full()
    }

    fn check_table(&self, table: &str) -> Result<(), EditorError> {
        quote_ident(table)?;
        if table != self.table {
            return Err(EditorError::storage(format!(
                "Table '{}' doesn't exist",
                table
            )));
        }
        Ok(())
    }

    fn check_column(&self, column: &str, clause: &str) -> Result<(), EditorError> {
        if self.columns.iter().any(|c| c == column) {
            Ok(())
        } else {
            Err(EditorError::storage(format!(
                "Unknown column '{}' in '{}'",
                column, clause
            )))
        }
    }

    fn apply_batch(&self, pk_cols: &[String], changes: &[Change]) -> Result<u64, EditorError> {
        let _guard = self.write_lock.lock();
        let mut working = Vec::clone(&self.rows.load_full());
        let mut updated_rows = 0u64;

        for change in changes.iter().filter(|c| !c.is_empty()) {
            for column in change.set.keys() {
                self.check_column(column, "field list")?;
            }
            for pk in pk_cols {
                self.check_column(pk, "where clause")?;
            }

            let mut affected = 0u64;
            for row in working.iter_mut() {
                if !matches_key(row, pk_cols, change) {
                    continue;
                }
                for (column, value) in &change.set {
                    row.insert(column.clone(), value.clone());
                }
                affected += 1;
            }

            if affected > 1 {
                tracing::warn!(affected, "update matched more than one row");
            }
            if affected > 0 {
                updated_rows += 1;
            }
        }

        self.rows.store(Arc::new(working));
        Ok(updated_rows)
    }
}

/// `pk1 = ? AND pk2 = ? ...` with SQL semantics for NULL (never equal).
fn matches_key(row: &Row, pk_cols: &[String], change: &Change) -> bool {
    pk_cols.iter().all(|pk| {
        match (row.get(pk), change.pk.get(pk)) {
            (Some(Value::Null), _) | (_, Some(Value::Null)) | (None, _) | (_, None) => false,
            (Some(have), Some(want)) => cell_text(have) == cell_text(want),
        }
    })
}

#[async_trait]
impl TableStore for MemoryStore {
    #[tracing::instrument(skip(self))]
    async fn fetch_rows(&self, table: &str, limit: u64) -> Result<Vec<Row>, EditorError> {
        self.check_table(table)?;
        let rows = self.rows.load();
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(rows.iter().take(limit).cloned().collect())
    }

    #[tracing::instrument(skip(self, pk_cols, changes), fields(batch = changes.len()))]
    async fn apply_changes(
        &self,
        table: &str,
        pk_cols: &[String],
        changes: &[Change],
    ) -> Result<u64, EditorError> {
        self.check_table(table)?;
        // Same up-front identifier checks as the SQL path.
        update_statements(table, pk_cols, changes)?;

        match self.apply_batch(pk_cols, changes) {
            Ok(updated_rows) => {
                tracing::info!(updated_rows, "batch committed");
                Ok(updated_rows)
            }
            Err(e) => {
                tracing::error!(error = %e, "update failed, batch discarded");
                Err(e)
            }
        }
    }
}
