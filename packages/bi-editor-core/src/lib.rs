//! Core model for the BI grid editor.
//!
//! Provides the identifier guard, row and snapshot types, change-set
//! parsing and validation, SQL statement building, and the grid state
//! used to diff a working copy against the last loaded snapshot.

pub mod change;
pub mod config;
pub mod error;
pub mod grid;
pub mod ident;
pub mod row;
pub mod snapshot;
pub mod sql;

pub use change::{Change, ChangeSet};
pub use config::EditorConfig;
pub use error::EditorError;
pub use row::Row;
pub use snapshot::{Column, DataPayload, Snapshot};
