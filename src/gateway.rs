//! HTTP upload service.
//!
//! `POST /upload` takes a multipart form with a `file` field, cleans the
//! workbook and answers with a zip holding `credits.csv` and `debits.csv`.
//! Failures answer with a plain-text message.

use crate::archive::{self, ARCHIVE_FILENAME};
use crate::engine::StatementCleaner;
use crate::error::CleanerError;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use log::{error, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::Builder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

/// Form field carrying the workbook.
pub const UPLOAD_FIELD: &str = "file";

/// Shared, read-only service state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub cleaner: StatementCleaner,

    /// Where uploads are written while they are cleaned.
    pub upload_dir: PathBuf,
}

impl AppState {
    /// State that stages uploads in the system temp directory.
    pub fn new(cleaner: StatementCleaner) -> Self {
        AppState {
            cleaner,
            upload_dir: std::env::temp_dir(),
        }
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }
}

/// Errors surfaced to the uploading client.
#[derive(Debug)]
pub enum GatewayError {
    MethodNotAllowed,
    MissingFile,
    TempFile(std::io::Error),
    SaveUpload(String),
    Processing(CleanerError),
    EmptyResult,
    Archive(CleanerError),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::MissingFile => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            GatewayError::MethodNotAllowed => "Only POST method is allowed".to_string(),
            GatewayError::MissingFile => "Unable to read file from form".to_string(),
            GatewayError::TempFile(e) => format!("Unable to create temporary file: {}", e),
            GatewayError::SaveUpload(e) => format!("Unable to save uploaded file: {}", e),
            GatewayError::Processing(e) => format!("Error processing file: {}", e),
            GatewayError::EmptyResult => "No data processed from the file".to_string(),
            GatewayError::Archive(e) => format!("Error creating zip file: {}", e),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        error!("Upload failed ({}): {}", status, message);
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", message),
        )
            .into_response()
    }
}

/// Builds the service router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST]);

    Router::new()
        .route("/upload", post(upload).fallback(method_not_allowed))
        .with_state(Arc::new(state))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(cors)
}

async fn method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, GatewayError> {
    // Dropping the handle deletes the file, whichever way this returns.
    let mut upload = Builder::new()
        .prefix("uploaded-")
        .suffix(".xlsx")
        .tempfile_in(&state.upload_dir)
        .map_err(GatewayError::TempFile)?;

    let mut received = false;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| GatewayError::MissingFile)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| GatewayError::SaveUpload(e.to_string()))?;
        upload
            .write_all(&data)
            .and_then(|_| upload.flush())
            .map_err(|e| GatewayError::SaveUpload(e.to_string()))?;
        received = true;
        break;
    }
    if !received {
        return Err(GatewayError::MissingFile);
    }

    let cleaner = state.cleaner;
    let (upload, result) = tokio::task::spawn_blocking(move || {
        let result = cleaner.clean_file(upload.path());
        (upload, result)
    })
    .await
    .map_err(|e| GatewayError::Processing(CleanerError::Io(std::io::Error::other(e))))?;
    drop(upload);

    let ledger = result.map_err(GatewayError::Processing)?;
    let (credits, debits) = ledger.to_csv_pair().map_err(GatewayError::Processing)?;
    if credits.is_empty() && debits.is_empty() {
        return Err(GatewayError::EmptyResult);
    }

    let body = archive::bundle(&credits, &debits).map_err(GatewayError::Archive)?;
    info!(
        "Processed upload: {} credits, {} debits, {} byte archive",
        ledger.credits().len(),
        ledger.debits().len(),
        body.len()
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", ARCHIVE_FILENAME),
            ),
        ],
        body,
    )
        .into_response())
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(
    addr: std::net::SocketAddr,
    state: AppState,
    max_upload_bytes: usize,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Listening on {} (uploads staged in {})",
        listener.local_addr()?,
        state.upload_dir.display()
    );
    axum::serve(listener, router(state, max_upload_bytes)).await
}
