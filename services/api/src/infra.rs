use chrono::{DateTime, Utc};
use matchly::config::StorageConfig;
use matchly::directory::{
    Attachment, CreatorDirectoryService, FileBlobStore, JsonFileStore, OnboardingGuard,
};
use matchly::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type DirectoryService = CreatorDirectoryService<JsonFileStore, FileBlobStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Directory service over the on-disk record and media kit stores.
pub(crate) fn open_directory(storage: &StorageConfig) -> Result<DirectoryService, AppError> {
    let records = JsonFileStore::shared(storage.records_dir())?;
    let blobs = Arc::new(FileBlobStore::open(storage.blobs_dir())?);
    Ok(CreatorDirectoryService::new(
        records,
        blobs,
        OnboardingGuard::new(storage.max_media_kit_bytes),
    ))
}

/// Loads a local file as an upload, guessing its type from the extension
/// unless one is given.
pub(crate) fn read_attachment(
    path: &Path,
    content_type: Option<&str>,
) -> Result<Attachment, AppError> {
    let bytes = std::fs::read(path)?;
    let content_type = match content_type {
        Some(explicit) => explicit.to_string(),
        None => mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Attachment::new(file_name, content_type, bytes))
}

pub(crate) fn format_created_at(created_at: Option<i64>) -> String {
    created_at
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
