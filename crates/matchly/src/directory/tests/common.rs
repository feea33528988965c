use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::directory::attachment::{AttachmentError, AttachmentStore, MemoryBlobStore};
use crate::directory::clock::SteppingClock;
use crate::directory::domain::{
    Attachment, CreatorId, CreatorRecord, MediaKitRef, OnboardingForm, Platform,
};
use crate::directory::service::CreatorDirectoryService;
use crate::directory::store::{KeyValueStore, MemoryStore, StoreError};
use crate::directory::validation::OnboardingGuard;

pub(super) const UPLOAD_LIMIT: usize = 1024;

pub(super) fn jane_form() -> OnboardingForm {
    OnboardingForm {
        name: "Jane".to_string(),
        niche: "Beauty".to_string(),
        platform: "Instagram".to_string(),
        followers: "25000".to_string(),
    }
}

pub(super) fn pdf_kit() -> Attachment {
    Attachment::new("media-kit.pdf", "application/pdf", b"%PDF-1.7 jane".to_vec())
}

pub(super) fn png_kit() -> Attachment {
    Attachment::new("media-kit.png", "image/png", b"\x89PNG".to_vec())
}

pub(super) fn guard() -> OnboardingGuard {
    OnboardingGuard::new(UPLOAD_LIMIT)
}

pub(super) fn creator(id: &str, followers: u64, created_at: Option<i64>) -> CreatorRecord {
    CreatorRecord {
        id: CreatorId::from(id),
        name: format!("Creator {id}"),
        niche: "Lifestyle".to_string(),
        platform: Some(Platform::Instagram),
        followers,
        media_kit: None,
        created_at,
    }
}

pub(super) fn with_kit(mut record: CreatorRecord) -> CreatorRecord {
    record.media_kit = Some(MediaKitRef(format!("sha256:{}", record.id)));
    record
}

pub(super) fn ids(records: &[&CreatorRecord]) -> Vec<String> {
    records.iter().map(|record| record.id.0.clone()).collect()
}

pub(super) type MemoryService = CreatorDirectoryService<MemoryStore, MemoryBlobStore>;

pub(super) fn build_service() -> (MemoryService, MemoryStore, MemoryBlobStore) {
    let store = MemoryStore::default();
    let blobs = MemoryBlobStore::default();
    let service = CreatorDirectoryService::with_clock(
        Arc::new(store.clone()),
        Arc::new(blobs.clone()),
        guard(),
        Arc::new(SteppingClock::fixed(1_000)),
    );
    (service, store, blobs)
}

pub(super) fn seed_creators(store: &MemoryStore, records: &[CreatorRecord]) {
    let value = serde_json::to_value(records).expect("records encode");
    store.write("creators", &value).expect("seed creators");
}

pub(super) fn stored_creators(store: &MemoryStore) -> Vec<CreatorRecord> {
    store
        .read("creators")
        .expect("read succeeds")
        .map(|value| serde_json::from_value(value).expect("records decode"))
        .unwrap_or_default()
}

pub(super) fn stored_saved(store: &MemoryStore) -> Vec<String> {
    store
        .read("savedCreators")
        .expect("read succeeds")
        .map(|value| serde_json::from_value(value).expect("ids decode"))
        .unwrap_or_default()
}

/// Store whose writes always fail, for all-or-nothing checks.
pub(super) struct ReadOnlyStore {
    pub(super) inner: MemoryStore,
}

impl KeyValueStore for ReadOnlyStore {
    fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, _value: &Value) -> Result<(), StoreError> {
        Err(StoreError::Io {
            key: key.to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read only"),
        })
    }
}

/// Store that pauses the first write to `creators` until released, so a test
/// can hold one caller mid-save while another runs.
pub(super) struct GatedStore {
    pub(super) inner: MemoryStore,
    reached: Mutex<Option<Sender<()>>>,
    release: Mutex<Option<Receiver<()>>>,
}

impl GatedStore {
    pub(super) fn new(inner: MemoryStore, reached: Sender<()>, release: Receiver<()>) -> Self {
        Self {
            inner,
            reached: Mutex::new(Some(reached)),
            release: Mutex::new(Some(release)),
        }
    }
}

impl KeyValueStore for GatedStore {
    fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        if key == "creators" {
            let reached = self.reached.lock().expect("gate").take();
            if let Some(reached) = reached {
                let release = self.release.lock().expect("gate").take();
                reached.send(()).expect("signal gate reached");
                if let Some(release) = release {
                    release.recv().expect("gate released");
                }
            }
        }
        self.inner.write(key, value)
    }
}

pub(super) struct OfflineBlobs;

impl AttachmentStore for OfflineBlobs {
    fn accept(&self, _attachment: &Attachment) -> Result<MediaKitRef, AttachmentError> {
        Err(AttachmentError::Io(io::Error::new(
            io::ErrorKind::NotConnected,
            "disk offline",
        )))
    }

    fn open(&self, _reference: &MediaKitRef) -> Result<Option<Vec<u8>>, AttachmentError> {
        Err(AttachmentError::Io(io::Error::new(
            io::ErrorKind::NotConnected,
            "disk offline",
        )))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
