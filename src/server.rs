use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Request, State, multipart::MultipartError},
    http::{StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::document::{UploadedDocument, validation};
use crate::error::ExtractionError;
use crate::export;
use crate::extraction::{DocumentExtractor, ExtractionMode, ExtractionResult, SchemaTable};
use crate::llm::{ChatCompletionsDriver, LlmSettings};
use crate::session::{AnalysisSnapshot, DEFAULT_SESSION_TIMEOUT};
use crate::ui;

/// Multipart framing overhead allowed on top of the upload ceiling.
const MULTIPART_SLACK_BYTES: u64 = 1024 * 1024;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, settings: LlmSettings) -> anyhow::Result<()> {
    info!(
        name: "llm.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        provider = ?settings.provider,
        "LLM configuration loaded"
    );

    let driver = Arc::new(ChatCompletionsDriver::new(settings.clone())?);
    let schemas = Arc::new(SchemaTable::builtin());
    let extractor = DocumentExtractor::new(settings, schemas, config.extraction.clone(), driver);
    let state = AppState::new(Arc::clone(&config), extractor);

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.cleanup_expired_with_timeout(DEFAULT_SESSION_TIMEOUT);
            if removed > 0 {
                info!(name: "session.cleanup", removed, remaining = sessions.len(), "Expired sessions removed");
            }
        }
    });

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the dashboard router: HTML page, JSON API and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.upload.max_bytes() + MULTIPART_SLACK_BYTES)
        .unwrap_or(usize::MAX);
    let timeout_duration = state.config.request_timeout();

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health))
        .route("/api/modes", get(api_modes))
        .route("/api/config", get(api_config))
        .route("/api/analyze", post(api_analyze))
        .route("/api/sessions/{id}", get(api_get_session))
        .route("/api/sessions/{id}/download.json", get(api_download_json))
        .route("/api/sessions/{id}/download.csv", get(api_download_csv))
        .layer(DefaultBodyLimit::max(body_limit))
        // Dropping the handler future on timeout also cancels an in-flight provider call.
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| {
                let duration = timeout_duration;
                async move {
                    match tokio::time::timeout(duration, next.run(req)).await {
                        Ok(res) => res,
                        Err(_) => {
                            tracing::warn!(
                                name: "request.timeout",
                                timeout_secs = duration.as_secs(),
                                "Request timed out"
                            );
                            (
                                StatusCode::REQUEST_TIMEOUT,
                                Json(json!({ "error": "Request timed out", "code": "TIMEOUT" })),
                            )
                                .into_response()
                        }
                    }
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Error returned by API handlers, rendered as `{error, code, recoverable, raw?}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No extraction result to download yet")]
    NoResult,

    #[error("Invalid upload: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Extraction(e) => e.status(),
            Self::SessionNotFound(_) | Self::NoResult => StatusCode::NOT_FOUND,
            Self::Multipart { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Extraction(e) => e.code(),
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::NoResult => "NO_RESULT",
            Self::Multipart { .. } => "INVALID_UPLOAD",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Map a multipart read failure; a body over the limit is the same
    /// `TooLarge` rejection that validation reports.
    fn from_multipart(e: &MultipartError, max_mb: u64) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::Extraction(ExtractionError::TooLarge { max_mb });
        }
        Self::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Extraction(e) => e.is_recoverable(),
            Self::SessionNotFound(_) | Self::NoResult | Self::Multipart { .. } => true,
            Self::Internal(_) => false,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(name: "api.error", code = self.code(), error = %self, "Request failed");
        } else {
            tracing::warn!(name: "api.error", code = self.code(), error = %self, "Request rejected");
        }

        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
            "recoverable": self.is_recoverable(),
        });
        if let Some(raw) = match &self {
            Self::Extraction(e) => e.raw_response(),
            _ => None,
        } {
            body["raw"] = json!(raw);
        }
        (status, Json(body)).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Dashboard page handler.
async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    Html(ui::dashboard_page(
        state.extractor.schemas(),
        &state.config.upload,
        state.extractor.model(),
    ))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Mode metadata for the sidebar.
#[derive(Debug, Serialize)]
struct ModeInfo {
    key: &'static str,
    label: &'static str,
    description: &'static str,
    expected_fields: &'static [&'static str],
}

/// GET /api/modes - Available extraction modes.
async fn api_modes(State(state): State<AppState>) -> Json<Vec<ModeInfo>> {
    let modes = state
        .extractor
        .schemas()
        .iter()
        .map(|(mode, schema)| ModeInfo {
            key: mode.key(),
            label: mode.label(),
            description: mode.description(),
            expected_fields: schema.expected_fields,
        })
        .collect();
    Json(modes)
}

#[derive(Debug, Serialize)]
struct PublicConfig {
    max_file_size_mb: u64,
    allowed_extensions: Vec<String>,
    model: String,
}

/// GET /api/config - Upload limits and model name.
async fn api_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(PublicConfig {
        max_file_size_mb: state.config.upload.max_file_size_mb,
        allowed_extensions: state.config.upload.allowed_extensions.clone(),
        model: state.extractor.model().to_string(),
    })
}

/// One row of the results table.
#[derive(Debug, Serialize)]
struct TableRow {
    field: String,
    value: String,
}

/// Response from the analyze API.
#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    session_id: String,
    file_name: String,
    mode: &'static str,
    mode_label: &'static str,
    result: ExtractionResult,
    display: ExtractionResult,
    table: Vec<TableRow>,
    text: String,
}

/// Fields collected from the analyze form.
#[derive(Default)]
struct AnalyzeForm {
    mode: Option<String>,
    session_id: Option<String>,
    file_name: Option<String>,
    bytes: Vec<u8>,
}

async fn read_analyze_form(mut multipart: Multipart, max_mb: u64) -> Result<AnalyzeForm, ApiError> {
    let upload_error = |e: MultipartError| ApiError::from_multipart(&e, max_mb);
    let mut form = AnalyzeForm::default();
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("mode") => form.mode = Some(field.text().await.map_err(upload_error)?),
            Some("session_id") => {
                form.session_id = Some(field.text().await.map_err(upload_error)?);
            }
            Some("file") => {
                form.file_name = field.file_name().map(ToString::to_string);
                form.bytes = field.bytes().await.map_err(upload_error)?.to_vec();
            }
            other => tracing::debug!(field = ?other, "Ignoring unknown form field"),
        }
    }
    Ok(form)
}

/// POST /api/analyze - Validate, extract text and extract structured data.
async fn api_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let form = read_analyze_form(multipart, state.config.upload.max_file_size_mb).await?;
    let byte_size = form.bytes.len() as u64;

    validation::validate(form.file_name.as_deref(), byte_size, &state.config.upload)?;
    let mode: ExtractionMode = form.mode.as_deref().unwrap_or_default().parse()?;

    let document = UploadedDocument::new(form.file_name.unwrap_or_default(), form.bytes);
    let file_name = document.name.clone();
    let session = state.sessions.get_or_create(form.session_id.as_deref());

    tracing::info!(
        name: "analysis.start",
        session_id = %session.id(),
        file = %file_name,
        content_type = %document.mime_type(),
        mode = mode.key(),
        byte_size,
        "Starting analysis"
    );

    let text = state.processor.extract_text(document).await?;
    let generation = session.record_text(file_name.clone(), text.clone());

    let result = state.extractor.extract(&text, mode).await?;
    if !session.record_result(generation, mode, result.clone()) {
        tracing::info!(
            name: "analysis.superseded",
            session_id = %session.id(),
            file = %file_name,
            "Newer upload replaced this document; result not stored"
        );
    }

    let display = export::format_json_for_display(&result);
    let table = export::flatten_record(&display)
        .into_iter()
        .map(|(field, value)| TableRow { field, value })
        .collect();

    Ok(Json(AnalyzeResponse {
        session_id: session.id().to_string(),
        file_name,
        mode: mode.key(),
        mode_label: mode.label(),
        result,
        display,
        table,
        text,
    }))
}

/// GET /api/sessions/:id - Current analysis state.
async fn api_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisSnapshot>, ApiError> {
    let session = state.sessions.get(&id).ok_or(ApiError::SessionNotFound(id))?;
    Ok(Json(session.snapshot()))
}

fn completed_analysis(state: &AppState, id: String) -> Result<(String, ExtractionResult), ApiError> {
    let session = state.sessions.get(&id).ok_or(ApiError::SessionNotFound(id))?;
    let snapshot = session.snapshot();
    match (snapshot.file_name, snapshot.result) {
        (Some(name), Some(result)) => Ok((name, result)),
        _ => Err(ApiError::NoResult),
    }
}

fn attachment(file_name: &str, extension: &str, body: String) -> Response {
    let content_type = mime_guess::from_ext(extension)
        .first_or_octet_stream()
        .to_string();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::download_file_name(file_name, extension)
    );
    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// GET /api/sessions/:id/download.json - Pretty JSON attachment.
async fn api_download_json(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let (name, result) = completed_analysis(&state, id)?;
    let body = export::to_pretty_json(&result).map_err(anyhow::Error::from)?;
    Ok(attachment(&name, "json", body))
}

/// GET /api/sessions/:id/download.csv - One-row CSV attachment.
async fn api_download_csv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let (name, result) = completed_analysis(&state, id)?;
    let body = export::to_csv(&result)?;
    Ok(attachment(&name, "csv", body))
}
