//! Server binary for the BI grid editor.
//!
//! Reads configuration from flags or the environment, opens the MySQL
//! pool, and serves the API and browser client until Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use bi_editor_api::{router::Router, server::Server};
use bi_editor_core::config::parse_pk_list;
use bi_editor_core::EditorConfig;
use bi_editor_store::{MySqlConfig, MySqlStore};

/// Command-line arguments for the editor server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// MySQL host
    #[arg(long, env = "MYSQL_HOST", default_value = "127.0.0.1")]
    mysql_host: String,

    /// MySQL port
    #[arg(long, env = "MYSQL_PORT", default_value_t = 3306)]
    mysql_port: u16,

    /// MySQL user
    #[arg(long, env = "MYSQL_USER")]
    mysql_user: Option<String>,

    /// MySQL password
    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    mysql_password: Option<String>,

    /// MySQL database
    #[arg(long, env = "MYSQL_DATABASE")]
    mysql_database: Option<String>,

    /// Maximum pooled MySQL connections
    #[arg(long, env = "MYSQL_POOL_SIZE", default_value_t = 10)]
    pool_size: usize,

    /// Table to edit
    #[arg(long, env = "APP_TABLE")]
    table: String,

    /// Comma-separated primary key columns (e.g. col1,col2)
    #[arg(long, env = "APP_PK")]
    pk: String,

    /// Maximum rows loaded into the grid
    #[arg(long, env = "APP_LIMIT", default_value_t = 200)]
    limit: u64,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Request body read timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 5000)]
    request_timeout_ms: u64,

    /// Maximum request body size in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 2 * 1024 * 1024)]
    max_body_bytes: usize,
}

impl Args {
    fn editor_config(&self) -> anyhow::Result<EditorConfig> {
        let config = EditorConfig {
            table: self.table.trim().to_string(),
            pk_cols: parse_pk_list(&self.pk),
            limit: self.limit,
            request_timeout_ms: self.request_timeout_ms,
            max_body_bytes: self.max_body_bytes,
        };
        config.validate().context("invalid editor configuration")?;
        Ok(config)
    }

    fn mysql_config(&self) -> MySqlConfig {
        MySqlConfig {
            host: self.mysql_host.clone(),
            port: self.mysql_port,
            user: self.mysql_user.clone(),
            password: self.mysql_password.clone(),
            database: self.mysql_database.clone(),
            pool_size: self.pool_size,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(args.editor_config()?);
    let store = Arc::new(MySqlStore::new(&args.mysql_config())?);

    if let Err(e) = store.ping().await {
        // The pool reconnects on demand, so keep serving and let /data report it.
        tracing::warn!("MySQL not reachable at startup: {}", e);
    }

    tracing::info!(
        table = %config.table,
        pk = ?config.pk_cols,
        limit = config.limit,
        "Starting BI editor"
    );

    let router = Router::new(store.clone(), config);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.host, args.port))?;
    let server = Server::new(addr, router);

    server
        .serve_with_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl_c: {}", e);
            }
        })
        .await?;

    if let Err(e) = store.disconnect().await {
        tracing::warn!("Failed to close MySQL pool: {}", e);
    }
    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_from_flags() {
        let args = Args::try_parse_from([
            "bi-editor-server",
            "--table",
            "stock",
            "--pk",
            "material_codigo, centro",
            "--limit",
            "50",
        ])
        .unwrap();

        let config = args.editor_config().unwrap();
        assert_eq!(config.table, "stock");
        assert_eq!(config.pk_cols, vec!["material_codigo", "centro"]);
        assert_eq!(config.limit, 50);
        assert_eq!(config.max_body_bytes, 2 * 1024 * 1024);
        assert_eq!(args.mysql_config().pool_size, 10);
    }

    #[test]
    fn test_empty_pk_is_rejected() {
        let args =
            Args::try_parse_from(["bi-editor-server", "--table", "stock", "--pk", " , "]).unwrap();
        assert!(args.editor_config().is_err());
    }
}
