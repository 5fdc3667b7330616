//! Data access layer for the BI grid editor.
//!
//! [`TableStore`] is the seam between the HTTP API and storage. The MySQL
//! implementation runs against a bounded connection pool; the in-memory
//! implementation keeps one table with the same transactional semantics.

pub mod memory;
pub mod mysql;
mod store;
mod value;

pub use memory::MemoryStore;
pub use mysql::{MySqlConfig, MySqlStore};
pub use store::TableStore;
