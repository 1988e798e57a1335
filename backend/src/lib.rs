//! # Cheese supply - e-Stat cheese supply/demand table as a time series
//!
//! Loads the e-Stat export of the cheese supply/demand table, turns its
//! era-labeled year columns into a long Gregorian time series, and answers
//! the dashboard's filter and chart queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  e-Stat CSV │────▶│   Parser    │────▶│   Reshape   │────▶│   Filter /  │
//! │ (UTF8/SJIS) │     │ (header row)│     │ (era→year)  │     │    Pivot    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cheese_supply::{load_file, LoadOptions};
//!
//! let dataset = load_file("FEH_00500509_260126101555.csv", &LoadOptions::default()).unwrap();
//! let result = dataset.query(&dataset.default_selection()).unwrap();
//! println!("{}", result.trend);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`config`] - Environment settings and limits
//! - [`models`] - Observations, tables, era years
//! - [`parser`] - CSV loading with header-row discovery
//! - [`transform`] - Reshape, filter, pivot, views, pipeline
//! - [`export`] - Filtered CSV download
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Download
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CsvError, ExportError, FilterError, PipelineError, ReshapeError, ServerError, ViewError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{era_to_year, is_era_year_label, Era, LongTable, Observation, WideTable};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_encoding, find_header_row, parse_bytes, parse_file, parse_table,
    RawTable, DEFAULT_MARKER,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    bar_snapshot, filter, load_bytes, load_file, parse_number, pivot, reshape, scatter_pairs,
    trend, CsvInfo, Dataset, Direction, LoadOptions, QueryResult, Selection, Trend,
};

// =============================================================================
// Re-exports - Config / Export
// =============================================================================

pub use config::Settings;
pub use export::{to_csv_bytes, write_csv, DOWNLOAD_FILE_NAME};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
