//! HTTP API for the BI grid editor.
//!
//! Serves the table snapshot, accepts change-sets, and ships the browser
//! client as embedded static assets.

pub mod handlers;
pub mod router;
pub mod server;
