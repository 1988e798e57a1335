//! Error types for the cheese supply/demand loader.
//!
//! One enum per layer:
//!
//! - [`CsvError`] - reading, decoding and locating the header row
//! - [`ReshapeError`] - picking label/year columns and melting
//! - [`FilterError`] - invalid dashboard selections
//! - [`ViewError`] - chart views that cannot be drawn
//! - [`ExportError`] - writing the filtered CSV
//! - [`PipelineError`] - top-level load and query orchestration
//! - [`ServerError`] - HTTP layer
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Loading Errors
// =============================================================================

/// Errors while reading the e-Stat export.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the bytes.
    #[error("Failed to decode content as {encoding}: {message}")]
    EncodingError { encoding: String, message: String },

    /// The marker line was not found.
    #[error("Header row not found (no line contains '{0}')")]
    HeaderNotFound(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,
}

// =============================================================================
// Reshape Errors
// =============================================================================

/// Errors while turning the wide table into a long series.
#[derive(Debug, Error)]
pub enum ReshapeError {
    /// No header contains the marker.
    #[error("Indicator label column not found (no column contains '{0}')")]
    LabelColumnNotFound(String),

    /// No header looks like an era year.
    #[error("No year columns found (expected labels like 平成30年 or 令和5年)")]
    YearColumnsNotFound,

    /// The melt produced no usable years or indicators.
    #[error("Reshaping produced no data ({years} years, {indicators} indicators)")]
    EmptyResult { years: usize, indicators: usize },
}

// =============================================================================
// Filter Errors
// =============================================================================

/// Invalid selections.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    /// Nothing selected.
    #[error("Select at least one indicator")]
    NoIndicators,

    /// Year range is reversed.
    #[error("Invalid year range: {from} > {to}")]
    InvalidRange { from: i32, to: i32 },

    /// Indicator does not exist in the dataset.
    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),
}

// =============================================================================
// View Errors
// =============================================================================

/// Chart views that cannot be produced from the current selection.
#[derive(Debug, Error, PartialEq)]
pub enum ViewError {
    /// Scatter plots compare two indicators.
    #[error("Scatter plot needs at least two selected indicators")]
    NeedTwoIndicators,

    /// Not enough rows to draw anything.
    #[error("Not enough data to draw the chart")]
    InsufficientData,

    /// Requested year is not in the pivot.
    #[error("Year {0} is not in the selected range")]
    YearNotFound(i32),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing the download CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer failure.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the writer failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::load_file`].
/// It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV loading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Reshape error.
    #[error("Reshape error: {0}")]
    Reshape(#[from] ReshapeError),

    /// Selection error.
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// View error.
    #[error("View error: {0}")]
    View(#[from] ViewError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Socket or runtime failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for reshape operations.
pub type ReshapeResult<T> = Result<T, ReshapeError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
