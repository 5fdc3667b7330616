//! Storage trait.

use async_trait::async_trait;

use bi_editor_core::{Change, EditorConfig, EditorError, Row, Snapshot};

/// Read and write access to the edited table.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Runs a bounded `SELECT *` and returns rows in store order.
    async fn fetch_rows(&self, table: &str, limit: u64) -> Result<Vec<Row>, EditorError>;

    /// Applies a batch of keyed updates as one transaction.
    ///
    /// Changes with an empty `set` are skipped. A change counts once toward
    /// the result if its update matched at least one row. Any failure rolls
    /// back the whole batch.
    async fn apply_changes(
        &self,
        table: &str,
        pk_cols: &[String],
        changes: &[Change],
    ) -> Result<u64, EditorError>;

    /// Fetches rows for the configured table and wraps them in a snapshot.
    async fn fetch_snapshot(&self, config: &EditorConfig) -> Result<Snapshot, EditorError> {
        let rows = self.fetch_rows(&config.table, config.limit).await?;
        Ok(Snapshot::from_rows(config, rows))
    }
}
