//! Transformation module.
//!
//! - Reshape: wide e-Stat table to long observations
//! - Filter: indicator and year-range selection
//! - Pivot: long observations to a year x indicator table
//! - Views: bar, scatter and trend derived from a selection
//! - Pipeline: load a file and answer dashboard queries

pub mod filter;
pub mod pipeline;
pub mod pivot;
pub mod reshape;
pub mod views;

pub use filter::{filter, Selection};
pub use pipeline::*;
pub use pivot::pivot;
pub use reshape::{parse_number, reshape};
pub use views::{bar_snapshot, scatter_pairs, trend, Bar, Direction, Scatter, Trend};
