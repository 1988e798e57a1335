//! HTTP API module.
//!
//! This module provides the HTTP server, payload types and log streaming
//! consumed by the dashboard.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server, AppState};
pub use types::*;
