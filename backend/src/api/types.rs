//! REST API payloads exchanged with the dashboard.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::PREVIEW_ROWS;
use crate::error::PipelineError;
use crate::models::{Observation, WideTable};
use crate::transform::filter::Selection;
use crate::transform::pipeline::{CsvInfo, Dataset, QueryResult};
use crate::transform::views::{Bar, Scatter, Trend};

/// Hint shown when both scatter axes use the same indicator.
pub const SAME_AXIS_HINT: &str = "X軸とY軸は別の指標を選ぶと見やすいです。";

// =============================================================================
// Requests
// =============================================================================

/// Sidebar state. Missing fields fall back to the dataset defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    #[serde(default)]
    pub indicators: Option<Vec<String>>,
    #[serde(default)]
    pub year_from: Option<i32>,
    #[serde(default)]
    pub year_to: Option<i32>,
}

impl SelectionRequest {
    /// Fill unspecified fields from the dataset.
    pub fn resolve(&self, dataset: &Dataset) -> Selection {
        let defaults = dataset.default_selection();
        Selection::new(
            self.indicators.clone().unwrap_or(defaults.indicators),
            self.year_from.unwrap_or(defaults.year_from),
            self.year_to.unwrap_or(defaults.year_to),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarRequest {
    #[serde(flatten)]
    pub selection: SelectionRequest,
    /// Year to compare; the last year in range when absent.
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterRequest {
    #[serde(flatten)]
    pub selection: SelectionRequest,
    /// X axis indicator; the first selected one when absent.
    #[serde(default)]
    pub x: Option<String>,
    /// Y axis indicator; the second selected one when absent.
    #[serde(default)]
    pub y: Option<String>,
}

impl ScatterRequest {
    /// Axis indicators, defaulting to the first two of the selection.
    pub fn axes(&self, selection: &Selection) -> (String, String) {
        let first = selection.indicators.first().cloned().unwrap_or_default();
        let second = selection.indicators.get(1).cloned().unwrap_or_else(|| first.clone());
        (
            self.x.clone().unwrap_or(first),
            self.y.clone().unwrap_or(second),
        )
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Sidebar options for the loaded dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    /// Changes whenever a new file is loaded.
    pub dataset_id: String,
    pub indicators: Vec<String>,
    pub year_min: i32,
    pub year_max: i32,
    pub default_selection: Selection,
    pub csv_info: CsvInfo,
}

impl OptionsResponse {
    pub fn new(dataset_id: String, dataset: &Dataset) -> Self {
        let (year_min, year_max) = dataset.year_bounds();
        Self {
            dataset_id,
            indicators: dataset.indicators.clone(),
            year_min,
            year_max,
            default_selection: dataset.default_selection(),
            csv_info: dataset.info.clone(),
        }
    }
}

/// Chart table, preview rows and comparison for one selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub selection: Selection,
    pub record_count: usize,
    pub wide: WideTable,
    pub preview: Vec<Observation>,
    pub trend: Trend,
    pub trend_message: String,
}

impl From<QueryResult> for QueryResponse {
    fn from(result: QueryResult) -> Self {
        let trend_message = result.trend.to_string();
        Self {
            selection: result.selection,
            record_count: result.record_count,
            wide: result.wide,
            preview: result.rows.into_iter().take(PREVIEW_ROWS).collect(),
            trend: result.trend,
            trend_message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarResponse {
    pub year: i32,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterResponse {
    #[serde(flatten)]
    pub scatter: Scatter,
    pub hint: Option<String>,
}

impl From<Scatter> for ScatterResponse {
    fn from(scatter: Scatter) -> Self {
        let hint = scatter.same_axis.then(|| SAME_AXIS_HINT.to_string());
        Self { scatter, hint }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Create an error body.
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}

/// HTTP status for a pipeline failure.
pub fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Csv(_) | PipelineError::Reshape(_) | PipelineError::Filter(_) => {
            StatusCode::BAD_REQUEST
        }
        PipelineError::View(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
