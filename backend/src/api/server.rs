//! HTTP server feeding the dashboard.
//!
//! The dashboard itself (widgets, charts, download button) lives outside
//! this crate; it calls these endpoints and renders what comes back.
//!
//! # API Endpoints
//!
//! | Method | Path           | Description                                   |
//! |--------|----------------|-----------------------------------------------|
//! | GET    | `/health`      | Health check                                  |
//! | GET    | `/api/options` | Indicators, year bounds, default selection    |
//! | POST   | `/api/query`   | Pivot table, preview rows and trend           |
//! | POST   | `/api/bar`     | Single-year comparison                        |
//! | POST   | `/api/scatter` | Two-indicator scatter                         |
//! | POST   | `/api/export`  | Filtered CSV download                         |
//! | POST   | `/api/upload`  | Replace the loaded CSV                        |
//! | GET    | `/api/logs`    | SSE stream for real-time logs                 |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use uuid::Uuid;

use super::logs::{log_error, log_success, LOG_BROADCASTER};
use super::types::{
    error_response, status_for, BarRequest, BarResponse, OptionsResponse, QueryResponse,
    ScatterRequest, ScatterResponse, SelectionRequest,
};
use crate::config::MAX_UPLOAD_SIZE;
use crate::error::{PipelineError, ServerResult};
use crate::export::{CONTENT_TYPE, DOWNLOAD_FILE_NAME};
use crate::transform::pipeline::{load_bytes, Dataset, LoadOptions};

type ApiError = (StatusCode, Json<Value>);

/// The dataset currently served, tagged with a fresh id per load.
#[derive(Debug)]
pub struct LoadedDataset {
    pub id: String,
    pub dataset: Dataset,
}

/// Shared server state: one session, one dataset.
#[derive(Clone)]
pub struct AppState {
    pub current: Arc<RwLock<LoadedDataset>>,
    pub options: LoadOptions,
}

impl AppState {
    pub fn new(dataset: Dataset, options: LoadOptions) -> Self {
        Self {
            current: Arc::new(RwLock::new(LoadedDataset {
                id: Uuid::new_v4().to_string(),
                dataset,
            })),
            options,
        }
    }

    /// Swap in a new dataset and return its id.
    pub async fn replace(&self, dataset: Dataset) -> String {
        let id = Uuid::new_v4().to_string();
        let mut current = self.current.write().await;
        *current = LoadedDataset {
            id: id.clone(),
            dataset,
        };
        id
    }
}

/// Build the router. Static dashboard assets are served from `static_dir`
/// when given.
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let api = Router::new()
        .route("/health", get(health))
        .route("/api/options", get(options))
        .route("/api/query", post(query))
        .route("/api/bar", post(bar))
        .route("/api/scatter", post(scatter))
        .route("/api/export", post(export))
        .route("/api/upload", post(upload_csv))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api.route("/", get(health)),
    };

    app.layer(cors)
}

/// Start the HTTP server
pub async fn start_server(
    state: AppState,
    port: u16,
    static_dir: Option<PathBuf>,
) -> ServerResult<()> {
    let app = router(state, static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Cheese supply server running on http://localhost:{}", port);
    println!("   GET  /api/options - Indicators and year bounds");
    println!("   POST /api/query   - Pivot, preview and trend");
    println!("   POST /api/export  - Filtered CSV download");
    println!("   POST /api/upload  - Load another CSV");
    println!("   GET  /api/logs    - SSE log stream");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn pipeline_error(err: PipelineError) -> ApiError {
    (status_for(&err), Json(error_response(&err.to_string())))
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "cheese-supply",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Sidebar options for the loaded dataset.
pub async fn options(State(state): State<AppState>) -> Json<OptionsResponse> {
    let current = state.current.read().await;
    Json(OptionsResponse::new(current.id.clone(), &current.dataset))
}

/// Filter, pivot and compare.
pub async fn query(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let current = state.current.read().await;
    let selection = req.resolve(&current.dataset);
    let result = current.dataset.query(&selection).map_err(pipeline_error)?;
    Ok(Json(QueryResponse::from(result)))
}

/// One year's values for every selected indicator.
pub async fn bar(
    State(state): State<AppState>,
    Json(req): Json<BarRequest>,
) -> Result<Json<BarResponse>, ApiError> {
    let current = state.current.read().await;
    let selection = req.selection.resolve(&current.dataset);
    let (year, bars) = current
        .dataset
        .bar(&selection, req.year)
        .map_err(pipeline_error)?;
    Ok(Json(BarResponse { year, bars }))
}

/// Two-indicator scatter.
pub async fn scatter(
    State(state): State<AppState>,
    Json(req): Json<ScatterRequest>,
) -> Result<Json<ScatterResponse>, ApiError> {
    let current = state.current.read().await;
    let selection = req.selection.resolve(&current.dataset);
    let (x, y) = req.axes(&selection);
    let scatter = current
        .dataset
        .scatter(&selection, &x, &y)
        .map_err(pipeline_error)?;
    Ok(Json(ScatterResponse::from(scatter)))
}

/// Filtered CSV as an attachment.
pub async fn export(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> Result<Response, ApiError> {
    let current = state.current.read().await;
    let selection = req.resolve(&current.dataset);
    let bytes = current.dataset.export(&selection).map_err(pipeline_error)?;

    let disposition = format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Replace the loaded CSV with an uploaded one.
async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OptionsResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (StatusCode::BAD_REQUEST, Json(error_response(&format!("Multipart error: {}", e))))
    })? {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        (StatusCode::BAD_REQUEST, Json(error_response(&format!("Read error: {}", e))))
                    })?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data
        .ok_or_else(|| (StatusCode::BAD_REQUEST, Json(error_response("No file provided"))))?;

    println!("\n{}", "=".repeat(70));
    println!(
        "📄 NEW UPLOAD: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    );
    println!("{}\n", "=".repeat(70));

    Ok(Json(replace_from_bytes(&state, &bytes).await?))
}

/// Parse and reshape `bytes`, then make them the served dataset.
/// The previous dataset stays in place when loading fails.
pub async fn replace_from_bytes(state: &AppState, bytes: &[u8]) -> Result<OptionsResponse, ApiError> {
    let dataset = load_bytes(bytes, &state.options).map_err(|e| {
        log_error(format!("Upload rejected: {}", e));
        pipeline_error(e)
    })?;

    let response = OptionsResponse::new(String::new(), &dataset);
    let id = state.replace(dataset).await;
    log_success(format!("Dataset {} loaded", id));

    Ok(OptionsResponse {
        dataset_id: id,
        ..response
    })
}
