//! Table snapshots and the `/data` wire payload.

use serde::{Deserialize, Serialize};

use crate::config::{is_pk_column, EditorConfig};
use crate::ident::is_bi_column;
use crate::row::Row;

/// Column descriptor with derived tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name as returned by the store
    pub name: String,
    /// True for BI columns that are not part of the primary key
    pub editable: bool,
    /// True for primary key columns
    pub primary_key: bool,
}

impl Column {
    /// Classifies a column against the primary key list.
    pub fn classify(name: &str, pk_cols: &[String]) -> Self {
        let primary_key = is_pk_column(pk_cols, name);
        Self {
            name: name.to_string(),
            editable: !primary_key && is_bi_column(name),
            primary_key,
        }
    }
}

/// Rows loaded from the store together with the table metadata.
///
/// Columns come from the first row's keys, so an empty result has no
/// columns and therefore nothing editable.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub table: String,
    pub limit: u64,
    pub pk: Vec<String>,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Snapshot {
    /// Builds a snapshot from freshly fetched rows.
    pub fn from_rows(config: &EditorConfig, rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|first| {
                first
                    .columns()
                    .map(|name| Column::classify(name, &config.pk_cols))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            table: config.table.clone(),
            limit: config.limit,
            pk: config.pk_cols.clone(),
            columns,
            rows,
        }
    }

    /// All column names in order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Names of the editable columns in order.
    pub fn editable_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.editable)
            .map(|c| c.name.clone())
            .collect()
    }
}

/// JSON body returned by `GET /data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPayload {
    pub table: String,
    pub limit: u64,
    pub pk: Vec<String>,
    pub columns: Vec<String>,
    #[serde(rename = "biCols")]
    pub bi_cols: Vec<String>,
    pub rows: Vec<Row>,
}

impl From<Snapshot> for DataPayload {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            columns: snapshot.column_names(),
            bi_cols: snapshot.editable_columns(),
            table: snapshot.table,
            limit: snapshot.limit,
            pk: snapshot.pk,
            rows: snapshot.rows,
        }
    }
}
