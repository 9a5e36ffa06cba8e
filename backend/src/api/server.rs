//! HTTP server for report generation.
//!
//! # API Endpoints
//!
//! | Method | Path          | Description                                  |
//! |--------|---------------|----------------------------------------------|
//! | GET    | `/health`     | Health check                                 |
//! | POST   | `/api/upload` | Upload a deal CSV, get report + summary JSON |
//! | POST   | `/api/report` | Upload a deal CSV, get `output.csv` back     |
//! | GET    | `/api/logs`   | SSE stream for real-time logs                |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderName, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, log_info_indent, log_warning, LOG_BROADCASTER};
use super::types::{error_response, UploadResponse};
use crate::config::Config;
use crate::error::{PipelineError, ServerResult};
use crate::models::BatchResult;
use crate::report::{is_csv_file_name, NOT_CSV_MESSAGE};
use crate::transform::pipeline::{transform_upload, TransformOptions};

type ApiError = (StatusCode, Json<Value>);

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// Build the application router.
pub fn router(config: Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let body_limit = config.max_upload_bytes;
    let state = AppState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/upload", post(upload_csv))
        .route("/api/report", post(report_csv))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> ServerResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(config);

    println!("🚀 Report server running on http://{}", addr);
    println!("   POST /api/upload - Upload CSV, JSON summary");
    println!("   POST /api/report - Upload CSV, report file");
    println!("   GET  /api/logs   - SSE log stream");
    println!("   GET  /health     - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "restoreport",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "report": "POST /api/report",
            "logs": "GET /api/logs (SSE)"
        }
    }))
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

/// Upload CSV, answer with the summary, the errors and the report inline.
async fn upload_csv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let result = receive_and_transform(multipart).await?;
    Ok(Json(UploadResponse::from_result(result, state.config.message_limit)))
}

/// Upload CSV, answer with the report document as a file.
async fn report_csv(multipart: Multipart) -> Result<Response, ApiError> {
    let result = receive_and_transform(multipart).await?;
    Ok(report_response(result))
}

/// The report document as an `output.csv` attachment.
fn report_response(result: BatchResult) -> Response {
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"output.csv\"".to_string(),
        ),
        (
            HeaderName::from_static("x-rows-processed"),
            result.success_count.to_string(),
        ),
        (
            HeaderName::from_static("x-rows-failed"),
            result.errors.len().to_string(),
        ),
    ];

    (StatusCode::OK, headers, result.output_document).into_response()
}

async fn receive_and_transform(mut multipart: Multipart) -> Result<BatchResult, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        bad_request(&format!("Multipart error: {}", e))
    })? {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(&format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let (name, bytes) = accept_upload(file_name, file_data)?;

    log_info(format!("📥 New upload: {} ({} bytes)", name, bytes.len()));

    let result = transform_upload(bytes, TransformOptions::default())
        .await
        .map_err(|e| {
            log_error(format!("Transform error for {}: {}", name, e));
            pipeline_error(&e)
        })?;

    log_info_indent(
        format!("{}: {} rows, {} errors", name, result.success_count, result.errors.len()),
        1,
    );

    Ok(result)
}

/// Check the multipart `file` field: it must be present and named `*.csv`.
fn accept_upload(
    file_name: Option<String>,
    file_data: Option<Vec<u8>>,
) -> Result<(String, Vec<u8>), ApiError> {
    let bytes = file_data.ok_or_else(|| bad_request("No file provided"))?;
    let name = file_name.unwrap_or_default();

    if !is_csv_file_name(&name) {
        log_warning(format!("Rejected non-CSV upload: {}", name));
        return Err(bad_request(NOT_CSV_MESSAGE));
    }

    Ok((name, bytes))
}

/// Document errors are 422, every other pipeline failure is 500.
fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Document(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Io(_) | PipelineError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn pipeline_error(err: &PipelineError) -> ApiError {
    (status_for(err), Json(error_response(&format!("❌ {}", err))))
}

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(error_response(message)))
}
