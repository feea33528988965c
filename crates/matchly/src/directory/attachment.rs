use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::domain::{Attachment, MediaKitRef};
use super::store::write_atomic;

const CONTENT_PREFIX: &str = "sha256:";

/// Accepts media kit bytes and resolves references back to them.
pub trait AttachmentStore: Send + Sync {
    fn accept(&self, attachment: &Attachment) -> Result<MediaKitRef, AttachmentError>;
    fn open(&self, reference: &MediaKitRef) -> Result<Option<Vec<u8>>, AttachmentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("media kit storage failure: {0}")]
    Io(#[from] io::Error),
}

/// Content address for a byte payload.
pub fn content_reference(bytes: &[u8]) -> MediaKitRef {
    let digest = Sha256::digest(bytes);
    MediaKitRef(format!("{CONTENT_PREFIX}{}", hex::encode(digest)))
}

/// Hex digest of a content-addressed reference, or `None` for legacy values.
fn digest_of(reference: &MediaKitRef) -> Option<&str> {
    let digest = reference.as_str().strip_prefix(CONTENT_PREFIX)?;
    let valid = digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit());
    valid.then_some(digest)
}

/// Stores each accepted kit once as `<digest>.pdf` under a directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AttachmentError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, digest: &str) -> PathBuf {
        self.root.join(format!("{digest}.pdf"))
    }
}

impl AttachmentStore for FileBlobStore {
    fn accept(&self, attachment: &Attachment) -> Result<MediaKitRef, AttachmentError> {
        let reference = content_reference(&attachment.bytes);
        if let Some(digest) = digest_of(&reference) {
            let path = self.path_for(digest);
            if !path.exists() {
                write_atomic(&path, &attachment.bytes)?;
            }
        }
        Ok(reference)
    }

    fn open(&self, reference: &MediaKitRef) -> Result<Option<Vec<u8>>, AttachmentError> {
        let Some(digest) = digest_of(reference) else {
            return Ok(None);
        };
        match fs::read(self.path_for(digest)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process blob store for tests and the demo.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<MediaKitRef, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttachmentStore for MemoryBlobStore {
    fn accept(&self, attachment: &Attachment) -> Result<MediaKitRef, AttachmentError> {
        let reference = content_reference(&attachment.bytes);
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(reference.clone())
            .or_insert_with(|| attachment.bytes.clone());
        Ok(reference)
    }

    fn open(&self, reference: &MediaKitRef) -> Result<Option<Vec<u8>>, AttachmentError> {
        Ok(self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(reference)
            .cloned())
    }
}

/// Opaque handle used to preview a media kit during the current process only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewHandle(pub String);

/// Session-scoped handle table; nothing here is persisted, so handles from a
/// previous run never resolve.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    by_handle: HashMap<PreviewHandle, MediaKitRef>,
    by_reference: HashMap<MediaKitRef, PreviewHandle>,
}

impl PreviewRegistry {
    pub fn issue(&mut self, reference: &MediaKitRef) -> PreviewHandle {
        if let Some(handle) = self.by_reference.get(reference) {
            return handle.clone();
        }
        let handle = PreviewHandle(Uuid::new_v4().simple().to_string());
        self.by_handle.insert(handle.clone(), reference.clone());
        self.by_reference.insert(reference.clone(), handle.clone());
        handle
    }

    pub fn resolve(&self, handle: &PreviewHandle) -> Option<&MediaKitRef> {
        self.by_handle.get(handle)
    }
}
