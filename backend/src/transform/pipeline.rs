//! High-level API: from an e-Stat file to a queryable dataset.
//!
//! # Example
//!
//! ```rust,ignore
//! use cheese_supply::transform::pipeline::{load_file, LoadOptions};
//! use cheese_supply::transform::filter::Selection;
//!
//! let dataset = load_file("FEH_00500509_260126101555.csv", &LoadOptions::default())?;
//! let selection = dataset.default_selection();
//! let result = dataset.query(&selection)?;
//! println!("{} rows, {}", result.record_count, result.trend);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::error::{FilterError, PipelineResult};
use crate::export::to_csv_bytes;
use crate::models::{LongTable, Observation, WideTable};
use crate::parser::{parse_bytes, parse_file, RawTable, DEFAULT_MARKER};
use crate::transform::filter::{filter, Selection};
use crate::transform::pivot::pivot;
use crate::transform::reshape::{reshape, select_year_columns};
use crate::transform::views::{bar_snapshot, scatter_pairs, trend, Bar, Scatter, Trend};

/// Options for loading a file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Header-row and label-column marker.
    pub marker: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

/// What was read from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub header_line: usize,
    pub columns: Vec<String>,
    pub year_columns: Vec<String>,
    pub row_count: usize,
    pub observation_count: usize,
    /// Year columns whose label did not convert to a Gregorian year.
    pub undated_columns: Vec<String>,
}

/// A loaded, reshaped table ready for dashboard queries.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub long: LongTable,
    pub info: CsvInfo,
    pub indicators: Vec<String>,
    pub years: Vec<i32>,
}

/// Everything the main dashboard view needs for one selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub selection: Selection,
    pub rows: Vec<Observation>,
    pub record_count: usize,
    pub wide: WideTable,
    /// Comparison for the first selected indicator.
    pub trend: Trend,
}

/// Load and reshape an e-Stat file.
pub fn load_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> PipelineResult<Dataset> {
    log_info(format!("📖 Reading {}...", path.as_ref().display()));
    let table = parse_file(path, &options.marker)?;
    build_dataset(table, options)
}

/// Load and reshape an uploaded file.
pub fn load_bytes(bytes: &[u8], options: &LoadOptions) -> PipelineResult<Dataset> {
    log_info(format!("📖 Reading upload ({} bytes)...", bytes.len()));
    let table = parse_bytes(bytes, &options.marker)?;
    build_dataset(table, options)
}

fn build_dataset(table: RawTable, options: &LoadOptions) -> PipelineResult<Dataset> {
    log_success(format!("Detected encoding: {}", table.encoding));
    log_success(format!("Header row at line {}", table.header_line + 1));
    log_success(format!("Read {} rows, {} columns", table.rows.len(), table.headers.len()));

    log_info("🔄 Reshaping era-year columns...");
    let long = reshape(&table, &options.marker)?;

    let year_columns: Vec<String> = select_year_columns(&table.headers)?
        .into_iter()
        .map(|i| table.headers[i].clone())
        .collect();
    let undated_columns: Vec<String> = year_columns
        .iter()
        .filter(|label| crate::models::era_to_year(label).is_none())
        .cloned()
        .collect();

    for label in &undated_columns {
        log_warning(format!("Column '{}' has no Gregorian year and is never selectable", label));
    }

    let indicators = long.indicators();
    let years = long.years();

    log_success(format!("{} observations", long.len()));
    log_info_indent(format!("{} indicators", indicators.len()), 1);
    if let (Some(first), Some(last)) = (years.first(), years.last()) {
        log_info_indent(format!("{} years ({}-{})", years.len(), first, last), 1);
    }

    let info = CsvInfo {
        encoding: table.encoding.clone(),
        header_line: table.header_line,
        columns: table.headers.clone(),
        year_columns,
        row_count: table.rows.len(),
        observation_count: long.len(),
        undated_columns,
    };

    Ok(Dataset {
        long,
        info,
        indicators,
        years,
    })
}

impl Dataset {
    /// First and last year.
    pub fn year_bounds(&self) -> (i32, i32) {
        // reshape guarantees at least one year
        match (self.years.first(), self.years.last()) {
            (Some(&a), Some(&b)) => (a, b),
            _ => (0, 0),
        }
    }

    /// The selection the dashboard opens with.
    pub fn default_selection(&self) -> Selection {
        Selection::default_for(&self.long).unwrap_or_else(|| {
            let (from, to) = self.year_bounds();
            Selection::new(Vec::new(), from, to)
        })
    }

    /// Filtered rows, stably sorted by year.
    pub fn filtered(&self, selection: &Selection) -> Result<Vec<Observation>, FilterError> {
        selection.validate_against(&self.indicators)?;
        Ok(filter(&self.long, selection))
    }

    /// Filter, pivot and compare.
    pub fn query(&self, selection: &Selection) -> PipelineResult<QueryResult> {
        let rows = self.filtered(selection)?;
        let wide = pivot(&rows);
        let trend = trend(&rows, &selection.indicators[0]);

        Ok(QueryResult {
            selection: selection.clone(),
            record_count: rows.len(),
            rows,
            wide,
            trend,
        })
    }

    /// Single-year bar comparison. Defaults to the last year in range.
    pub fn bar(&self, selection: &Selection, year: Option<i32>) -> PipelineResult<(i32, Vec<Bar>)> {
        let rows = self.filtered(selection)?;
        Ok(bar_snapshot(&pivot(&rows), year)?)
    }

    /// Scatter of two selected indicators.
    pub fn scatter(&self, selection: &Selection, x: &str, y: &str) -> PipelineResult<Scatter> {
        let rows = self.filtered(selection)?;
        Ok(scatter_pairs(&pivot(&rows), selection.indicators.len(), x, y)?)
    }

    /// Download bytes for a selection.
    pub fn export(&self, selection: &Selection) -> PipelineResult<Vec<u8>> {
        let rows = self.filtered(selection)?;
        Ok(to_csv_bytes(&rows)?)
    }
}
