//! MySQL-backed table store.

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{
    Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts, Row as MySqlRow, Transaction,
    TxOpts,
    Value as MySqlValue,
};

use bi_editor_core::sql::{select_statement, update_statements, Statement};
use bi_editor_core::{Change, EditorError, Row};

use crate::store::TableStore;
use crate::value::{to_json, to_mysql};

/// Connection settings for the MySQL pool.
#[derive(Debug, Clone)]
pub struct MySqlConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    /// Maximum pooled connections
    pub pool_size: usize,
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: None,
            password: None,
            database: None,
            pool_size: 10,
        }
    }
}

impl MySqlConfig {
    /// Builds driver options.
    ///
    /// `client_found_rows` makes an update that rewrites the same value
    /// still report the row as affected.
    pub fn to_opts(&self) -> Result<Opts, EditorError> {
        let constraints = PoolConstraints::new(1, self.pool_size.max(1)).ok_or_else(|| {
            EditorError::Config(format!("invalid pool size {}", self.pool_size))
        })?;

        let builder = OptsBuilder::default()
            .ip_or_hostname(self.host.clone())
            .tcp_port(self.port)
            .user(self.user.clone())
            .pass(self.password.clone())
            .db_name(self.database.clone())
            .init(vec!["SET NAMES utf8mb4"])
            .client_found_rows(true)
            .pool_opts(PoolOpts::default().with_constraints(constraints));

        Ok(builder.into())
    }
}

/// Table store over a bounded `mysql_async` pool.
pub struct MySqlStore {
    pool: Pool,
}

impl MySqlStore {
    /// Creates the pool. Connections are opened lazily.
    pub fn new(config: &MySqlConfig) -> Result<Self, EditorError> {
        tracing::info!(
            host = %config.host,
            port = config.port,
            database = ?config.database,
            pool_size = config.pool_size,
            "creating MySQL pool"
        );
        Ok(Self {
            pool: Pool::new(config.to_opts()?),
        })
    }

    /// Acquires and releases one connection to verify connectivity.
    pub async fn ping(&self) -> Result<(), EditorError> {
        let mut conn = self.pool.get_conn().await.map_err(EditorError::storage)?;
        conn.ping().await.map_err(EditorError::storage)?;
        Ok(())
    }

    /// Closes every pooled connection once in-flight ones are returned.
    pub async fn disconnect(&self) -> Result<(), EditorError> {
        self.pool.clone().disconnect().await.map_err(EditorError::storage)
    }
}

#[async_trait]
impl TableStore for MySqlStore {
    #[tracing::instrument(skip(self))]
    async fn fetch_rows(&self, table: &str, limit: u64) -> Result<Vec<Row>, EditorError> {
        let Statement { sql, params } = select_statement(table, limit)?;
        let params: Vec<MySqlValue> = params.iter().map(to_mysql).collect();

        let mut conn = self.pool.get_conn().await.map_err(EditorError::storage)?;
        let mysql_rows: Vec<MySqlRow> = conn
            .exec(sql, params)
            .await
            .map_err(EditorError::storage)?;

        let rows: Vec<Row> = mysql_rows.into_iter().map(convert_row).collect();
        tracing::debug!(row_count = rows.len(), "snapshot fetched");
        Ok(rows)
    }

    #[tracing::instrument(skip(self, pk_cols, changes), fields(batch = changes.len()))]
    async fn apply_changes(
        &self,
        table: &str,
        pk_cols: &[String],
        changes: &[Change],
    ) -> Result<u64, EditorError> {
        let statements = update_statements(table, pk_cols, changes)?;
        if statements.is_empty() {
            return Ok(0);
        }

        let tx = self
            .pool
            .start_transaction(TxOpts::default())
            .await
            .map_err(EditorError::storage)?;

        apply_in_transaction(tx, &statements).await
    }
}

/// The slice of a driver transaction the update batch needs.
#[async_trait]
trait BatchTransaction: Send {
    /// Executes one statement and returns the affected-row count.
    async fn execute(&mut self, statement: &Statement) -> Result<u64, EditorError>;

    async fn commit(self) -> Result<(), EditorError>;

    async fn rollback(self) -> Result<(), EditorError>;
}

#[async_trait]
impl BatchTransaction for Transaction<'static> {
    async fn execute(&mut self, statement: &Statement) -> Result<u64, EditorError> {
        let params: Vec<MySqlValue> = statement.params.iter().map(to_mysql).collect();
        self.exec_drop(statement.sql.as_str(), params)
            .await
            .map_err(EditorError::storage)?;
        Ok(self.affected_rows())
    }

    async fn commit(self) -> Result<(), EditorError> {
        Transaction::commit(self).await.map_err(EditorError::storage)
    }

    async fn rollback(self) -> Result<(), EditorError> {
        Transaction::rollback(self).await.map_err(EditorError::storage)
    }
}

/// Runs every statement inside `tx`, committing only if all of them succeed.
///
/// The first failing statement rolls the whole batch back and its error is
/// returned. A statement counts as one updated row when it affected any row.
async fn apply_in_transaction<T: BatchTransaction>(
    mut tx: T,
    statements: &[Statement],
) -> Result<u64, EditorError> {
    let mut updated_rows = 0u64;
    for statement in statements {
        let affected = match tx.execute(statement).await {
            Ok(affected) => affected,
            Err(e) => {
                tracing::error!(error = %e, sql = %statement.sql, "update failed, rolling back batch");
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                return Err(e);
            }
        };

        if affected > 1 {
            tracing::warn!(affected, sql = %statement.sql, "update matched more than one row");
        }
        if affected > 0 {
            updated_rows += 1;
        }
    }

    tx.commit().await?;
    tracing::info!(updated_rows, "batch committed");
    Ok(updated_rows)
}

fn convert_row(mut row: MySqlRow) -> Row {
    let columns = row.columns();
    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let value = row.take::<MySqlValue, _>(idx).unwrap_or(MySqlValue::NULL);
            (
                column.name_str().into_owned(),
                to_json(value, column.column_type()),
            )
        })
        .collect()
}
