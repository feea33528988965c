use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::attachment::{AttachmentStore, PreviewHandle};
use super::completeness::profile_completeness;
use super::domain::{Attachment, CreatorId, CreatorRecord, OnboardingForm};
use super::query::DiscoveryQuery;
use super::service::{CreatorDirectoryService, DirectoryServiceError};
use super::store::KeyValueStore;

/// Header carrying the original file name on raw media kit uploads.
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// JSON onboarding payload: the raw form plus an optional base64 media kit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OnboardingRequest {
    #[serde(flatten)]
    pub form: OnboardingForm,
    #[serde(default)]
    pub media_kit: Option<MediaKitUpload>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaKitUpload {
    pub file_name: String,
    pub content_type: String,
    /// Standard base64 of the file bytes.
    pub data: String,
}

impl MediaKitUpload {
    fn decode(self) -> Result<Attachment, base64::DecodeError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(self.data.trim())?;
        Ok(Attachment::new(self.file_name, self.content_type, bytes))
    }
}

/// Public profile payload.
#[derive(Debug, Serialize)]
pub struct CreatorResponse {
    #[serde(flatten)]
    pub creator: CreatorRecord,
    pub completeness: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_kit_preview_url: Option<String>,
}

pub fn preview_url(handle: &PreviewHandle) -> String {
    format!("/api/v1/media-kits/{}", handle.0)
}

/// Router builder exposing HTTP endpoints for onboarding, discovery, and shortlists.
pub fn directory_router<S, B>(service: Arc<CreatorDirectoryService<S, B>>) -> Router
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    // base64 inflates uploads by a third; leave room for the form fields too.
    let body_limit = service
        .guard()
        .max_media_kit_bytes()
        .saturating_mul(3)
        .saturating_div(2)
        .saturating_add(64 * 1024);

    Router::new()
        .route(
            "/api/v1/creators",
            post(onboard_handler::<S, B>).get(list_handler::<S, B>),
        )
        .route(
            "/api/v1/creators/:creator_id",
            get(show_handler::<S, B>).delete(delete_handler::<S, B>),
        )
        .route(
            "/api/v1/creators/:creator_id/media-kit",
            put(replace_media_kit_handler::<S, B>),
        )
        .route(
            "/api/v1/creators/:creator_id/completeness",
            get(completeness_handler::<S, B>),
        )
        .route("/api/v1/profile/current", get(current_profile_handler::<S, B>))
        .route("/api/v1/shortlist", get(shortlist_handler::<S, B>))
        .route(
            "/api/v1/shortlist/:creator_id/toggle",
            post(toggle_handler::<S, B>),
        )
        .route("/api/v1/media-kits/:handle", get(media_kit_handler::<S, B>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

pub(crate) async fn onboard_handler<S, B>(
    State(service): State<Arc<CreatorDirectoryService<S, B>>>,
    Json(request): Json<OnboardingRequest>,
) -> Response
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    let OnboardingRequest { form, media_kit } = request;
    let attachment = match media_kit.map(MediaKitUpload::decode).transpose() {
        Ok(attachment) => attachment,
        Err(_) => {
            let payload = json!({ "errors": ["Media kit upload is not valid base64"] });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    };

    let created = run_blocking(&service, move |service| {
        let record = service.onboard(form, attachment)?;
        Ok(creator_response(service, record))
    })
    .await;

    match created {
        Ok(body) => {
            let location = format!("/api/v1/creators/{}", body.creator.id);
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(body),
            )
                .into_response()
        }
        Err(response) => response,
    }
}

pub(crate) async fn list_handler<S, B>(
    State(service): State<Arc<CreatorDirectoryService<S, B>>>,
    Query(query): Query<DiscoveryQuery>,
) -> Response
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    let view = run_blocking(&service, move |service| {
        service.discover(&query.criteria(), query.sort_mode())
    })
    .await;

    match view {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn show_handler<S, B>(
    State(service): State<Arc<CreatorDirectoryService<S, B>>>,
    Path(creator_id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    let id = CreatorId(creator_id);
    let lookup = id.clone();
    let found = run_blocking(&service, move |service| {
        Ok(service
            .creator(&lookup)?
            .map(|record| creator_response(service, record)))
    })
    .await;

    match found {
        Ok(Some(body)) => (StatusCode::OK, Json(body)).into_response(),
        Ok(None) => not_found(&id),
        Err(response) => response,
    }
}

pub(crate) async fn delete_handler<S, B>(
    State(service): State<Arc<CreatorDirectoryService<S, B>>>,
    Path(creator_id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    let id = CreatorId(creator_id);
    let target = id.clone();
    match run_blocking(&service, move |service| service.delete(&target)).await {
        Ok(Some(_)) => StatusCode::NO_CONTENT.into_response(),
        Ok(None) => not_found(&id),
        Err(response) => response,
    }
}

pub(crate) async fn replace_media_kit_handler<S, B>(
    State(service): State<Arc<CreatorDirectoryService<S, B>>>,
    Path(creator_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    let id = CreatorId(creator_id);
    let content_type = header_text(&headers, header::CONTENT_TYPE.as_str());
    let file_name = header_text(&headers, FILE_NAME_HEADER);
    let attachment = Attachment::new(file_name, content_type, body.to_vec());

    let target = id.clone();
    let updated = run_blocking(&service, move |service| {
        Ok(service
            .replace_media_kit(&target, attachment)?
            .map(|record| creator_response(service, record)))
    })
    .await;

    match updated {
        Ok(Some(body)) => (StatusCode::OK, Json(body)).into_response(),
        Ok(None) => not_found(&id),
        Err(response) => response,
    }
}

pub(crate) async fn completeness_handler<S, B>(
    State(service): State<Arc<CreatorDirectoryService<S, B>>>,
    Path(creator_id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    let id = CreatorId(creator_id);
    let target = id.clone();
    match run_blocking(&service, move |service| service.completeness(&target)).await {
        Ok(Some(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(None) => not_found(&id),
        Err(response) => response,
    }
}

pub(crate) async fn current_profile_handler<S, B>(
    State(service): State<Arc<CreatorDirectoryService<S, B>>>,
) -> Response
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    match run_blocking(&service, |service| service.dashboard()).await {
        Ok(Some(dashboard)) => (StatusCode::OK, Json(dashboard)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": "no creator profile yet" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(response) => response,
    }
}

pub(crate) async fn shortlist_handler<S, B>(
    State(service): State<Arc<CreatorDirectoryService<S, B>>>,
) -> Response
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    match run_blocking(&service, |service| service.saved()).await {
        Ok(saved) => {
            let payload = json!({
                "saved_count": saved.len(),
                "creator_ids": saved.iter().collect::<Vec<_>>(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(response) => response,
    }
}

pub(crate) async fn toggle_handler<S, B>(
    State(service): State<Arc<CreatorDirectoryService<S, B>>>,
    Path(creator_id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    let id = CreatorId(creator_id);
    match run_blocking(&service, move |service| service.toggle_saved(&id)).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn media_kit_handler<S, B>(
    State(service): State<Arc<CreatorDirectoryService<S, B>>>,
    Path(handle): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    let handle = PreviewHandle(handle);
    match run_blocking(&service, move |service| service.open_preview(&handle)).await {
        Ok(Some(bytes)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::APPLICATION_PDF.as_ref())],
            bytes,
        )
            .into_response(),
        Ok(None) => {
            let payload = json!({ "error": "media kit preview expired or unknown" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(response) => response,
    }
}

/// Runs a service call on the blocking pool. Service calls do file I/O while
/// holding the service's write lock, which must stay off the async workers.
async fn run_blocking<S, B, T, F>(
    service: &Arc<CreatorDirectoryService<S, B>>,
    call: F,
) -> Result<T, Response>
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
    T: Send + 'static,
    F: FnOnce(&CreatorDirectoryService<S, B>) -> Result<T, DirectoryServiceError>
        + Send
        + 'static,
{
    let service = Arc::clone(service);
    match tokio::task::spawn_blocking(move || call(&service)).await {
        Ok(outcome) => outcome.map_err(error_response),
        Err(err) => {
            error!(error = %err, "directory task did not complete");
            let payload = json!({ "error": "directory task did not complete" });
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response())
        }
    }
}

fn creator_response<S, B>(
    service: &CreatorDirectoryService<S, B>,
    creator: CreatorRecord,
) -> CreatorResponse
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    // A missing preview only hides the link; the profile itself still renders.
    let media_kit_preview_url = match service.preview_for(&creator) {
        Ok(handle) => handle.as_ref().map(preview_url),
        Err(err) => {
            error!(creator_id = %creator.id, error = %err, "media kit preview unavailable");
            None
        }
    };

    CreatorResponse {
        completeness: profile_completeness(Some(&creator)),
        creator,
        media_kit_preview_url,
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn not_found(id: &CreatorId) -> Response {
    let payload = json!({
        "creator_id": id,
        "error": "creator not found",
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn error_response(err: DirectoryServiceError) -> Response {
    match err {
        DirectoryServiceError::Validation(errors) => {
            let payload = json!({ "errors": errors.messages() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        other => {
            error!(error = %other, "directory request failed");
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
