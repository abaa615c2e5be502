//! Upload router: `GET /`, `POST /upload`, `GET /health`.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::error::ApiError;
use super::page::UPLOAD_PAGE_HTML;
use crate::batch;
use crate::config::{AppConfig, APP_VERSION};
use crate::import::{self, ImportError, StagedUpload};
use crate::pipeline::PipelineStats;
use crate::report;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Multipart framing around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

pub fn app_router(config: Arc<AppConfig>) -> Router {
    let body_limit = body_limit(config.max_upload_bytes);

    Router::new()
        .route("/", get(serve_upload_page))
        .route("/upload", post(handle_upload))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { config })
}

/// Request body cap: the file limit plus multipart framing, saturating.
fn body_limit(max_upload_bytes: u64) -> usize {
    usize::try_from(max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: APP_VERSION,
    })
}

async fn serve_upload_page() -> Html<&'static str> {
    Html(UPLOAD_PAGE_HTML)
}

async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().trim().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("No file provided in field \"file\"".into()))?;
    if filename.is_empty() {
        return Err(ImportError::MissingFileName.into());
    }
    import::detect_format(&filename, &state.config.accepted_extensions)?;

    tracing::info!(%request_id, file = %filename, size = bytes.len(), "Upload received");

    let config = state.config.clone();
    let (report_name, workbook, stats) =
        tokio::task::spawn_blocking(move || convert_upload(&bytes, &filename, &config))
            .await
            .map_err(|e| ApiError::Internal(format!("conversion task failed: {e}")))??;

    tracing::info!(
        %request_id,
        report = %report_name,
        records = stats.records,
        duplicates = stats.duplicates,
        bytes = workbook.len(),
        "Report sent"
    );

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(XLSX_MIME));
    let disposition = HeaderValue::from_str(&content_disposition(&report_name))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((StatusCode::OK, headers, workbook).into_response())
}

/// Stage, convert and read back the workbook. The staging directory is
/// removed before returning on every path.
fn convert_upload(
    bytes: &[u8],
    filename: &str,
    config: &AppConfig,
) -> Result<(String, Vec<u8>, PipelineStats), ApiError> {
    let staged = StagedUpload::stage(bytes, filename, config.max_upload_bytes, None)?;
    let report_name = import::report_file_name(staged.file_name());
    let report_path = staged.report_path(&report_name);

    let output = batch::process_file(staged.input_path(), config)?;
    report::save_report(&output.views, &report_path)?;
    let workbook = std::fs::read(&report_path).map_err(ImportError::from)?;

    if let Err(e) = staged.close() {
        tracing::warn!("Failed to remove staging directory: {e}");
    }
    Ok((report_name, workbook, output.stats))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::TooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// `attachment; filename="<name>"` with anything outside printable ASCII
/// (and quotes) replaced.
pub fn content_disposition(report_name: &str) -> String {
    let safe: String = report_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
