//! HTTP API under `/api/v1`.

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use folkreel_core::{AccountId, CredentialId, GenerationId, GenerationRecord};
use folkreel_error::{
    AdmissionError, AdmissionErrorKind, FolkreelError, FolkreelErrorKind, HttpError,
    StorageErrorKind,
};
use folkreel_narrative::GenerationService;
use folkreel_storage::HistoryQuery;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, instrument, warn};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// API state shared by all handlers.
#[derive(Debug, Clone)]
pub struct ApiState {
    service: GenerationService,
}

impl ApiState {
    /// State over a generation service.
    pub fn new(service: GenerationService) -> Self {
        Self { service }
    }
}

/// Creates the API router, mounted under `/api/v1`.
pub fn create_router(state: ApiState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/generate", post(generate))
        .route("/generations", get(list_generations))
        .route("/generation/{generation_id}", get(get_generation))
        .route("/download/{generation_id}/{kind}", get(download))
        .route("/user/usage", get(usage))
        .with_state(state);
    Router::new().nest("/api/v1", api)
}

/// Error answered as `{status: "error", message}` with the mapped status code.
#[derive(Debug)]
pub struct ApiError(FolkreelError);

impl From<FolkreelError> for ApiError {
    fn from(err: FolkreelError) -> Self {
        Self(err)
    }
}

impl From<AdmissionError> for ApiError {
    fn from(err: AdmissionError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    fn message(&self) -> String {
        match self.0.kind() {
            FolkreelErrorKind::Admission(e) => e.kind.to_string(),
            FolkreelErrorKind::Pipeline(e) => e.kind.to_string(),
            FolkreelErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::NotFound(_)) => {
                "File not found".to_string()
            }
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        }
        let body = json!({ "status": "error", "message": self.message() });
        (status, Json(body)).into_response()
    }
}

/// API key taken from the `X-API-Key` header.
#[derive(Debug, Clone)]
pub struct ApiKey(pub CredentialId);

impl<S: Send + Sync> FromRequestParts<S> for ApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Self(CredentialId::from(value)))
            .ok_or_else(|| AdmissionError::new(AdmissionErrorKind::MissingCredential).into())
    }
}

impl ApiState {
    /// Authenticate a non-generating call; counts one request against the key.
    async fn authorize(&self, key: &ApiKey) -> Result<AccountId, ApiError> {
        Ok(self.service.gate().authorize(&key.0).await?)
    }
}

/// Artifact locations of a record.
#[derive(Debug, Serialize)]
struct FilePaths {
    story_path: String,
    voiceover_path: String,
    voiceover_tts_path: Option<String>,
    scenes_path: String,
}

impl From<&GenerationRecord> for FilePaths {
    fn from(record: &GenerationRecord) -> Self {
        let artifacts = &record.artifacts;
        Self {
            story_path: artifacts.story.path.display().to_string(),
            voiceover_path: artifacts.voiceover.path.display().to_string(),
            voiceover_tts_path: artifacts
                .audio
                .as_ref()
                .map(|audio| audio.path.display().to_string()),
            scenes_path: artifacts.scenes.path.display().to_string(),
        }
    }
}

/// A record as listed in history.
#[derive(Debug, Serialize)]
struct GenerationSummary {
    generation_id: GenerationId,
    country: String,
    timestamp: String,
    view_count: u64,
    download_count: u64,
    files: FilePaths,
}

impl From<&GenerationRecord> for GenerationSummary {
    fn from(record: &GenerationRecord) -> Self {
        Self {
            generation_id: record.id.clone(),
            country: record.country.clone(),
            timestamp: record.created_at.to_rfc3339(),
            view_count: record.view_count,
            download_count: record.download_count,
            files: record.into(),
        }
    }
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")})),
    )
}

/// Body of `POST /generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    /// Country to draw the folk tale from
    #[serde(default)]
    pub country: String,
}

/// Run one generation.
///
/// The pipeline runs on its own task, so a client that disconnects does not
/// cancel a generation that is already underway.
#[instrument(skip_all)]
async fn generate(
    State(state): State<ApiState>,
    key: ApiKey,
    Json(body): Json<GenerateBody>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state.service.gate().identify(&key.0).await?;
    let service = state.service.clone();
    let country = body.country;

    let outcome = tokio::spawn(async move {
        service
            .generate(&account, Some(&key.0), &country)
            .await
    })
    .await
    .map_err(|e| FolkreelError::from(HttpError::new(format!("Generation task failed: {}", e))))??;

    let record = &outcome.record;
    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": format!("Content for {} generated successfully", record.country),
            "generation_id": record.id,
            "paths": FilePaths::from(record),
            "content": {
                "story": outcome.content.story,
                "voiceover": outcome.content.voiceover,
                "scenes": outcome.content.scenes,
            },
            "degraded": outcome.degraded,
        })),
    ))
}

/// List the caller's generations.
#[instrument(skip_all)]
async fn list_generations(
    State(state): State<ApiState>,
    key: ApiKey,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state.authorize(&key).await?;
    let page = state.service.history(&account, &query);
    let generations: Vec<GenerationSummary> = page.records.iter().map(Into::into).collect();

    Ok(Json(json!({
        "status": "success",
        "page": page.page,
        "per_page": page.per_page,
        "total_pages": page.total_pages,
        "total_items": page.total_items,
        "generations": generations,
    })))
}

/// View one generation with its content.
#[instrument(skip_all, fields(generation_id = %generation_id))]
async fn get_generation(
    State(state): State<ApiState>,
    key: ApiKey,
    Path(generation_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state.authorize(&key).await?;
    let view = state
        .service
        .view(&account, &GenerationId::new(generation_id))
        .await?;

    let mut generation = serde_json::to_value(GenerationSummary::from(&view.record))
        .map_err(|e| FolkreelError::from(HttpError::new(e.to_string())))?;
    generation["content"] = json!({
        "story": view.content.story,
        "voiceover": view.content.voiceover,
        "scenes": view.content.scenes,
        "metadata": view.content.metadata,
    });

    Ok(Json(json!({ "status": "success", "generation": generation })))
}

/// Download one artifact as an attachment.
#[instrument(skip_all, fields(generation_id = %generation_id, kind = %kind))]
async fn download(
    State(state): State<ApiState>,
    key: ApiKey,
    Path((generation_id, kind)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state.authorize(&key).await?;
    let file = state
        .service
        .download(&account, &GenerationId::new(generation_id), &kind)
        .await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    ))
}

/// Usage against the caller's allowance.
#[instrument(skip_all)]
async fn usage(State(state): State<ApiState>, key: ApiKey) -> Result<impl IntoResponse, ApiError> {
    let account = state.authorize(&key).await?;
    let report = state.service.usage(&account).await?;
    Ok(Json(json!({ "status": "success", "usage": report })))
}
