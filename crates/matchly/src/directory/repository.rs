use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use super::clock::Clock;
use super::domain::CreatorRecord;
use super::migration::backfill_created_at;
use super::shortlist::SavedSet;
use super::store::{KeyValueStore, StoreError, CREATORS_KEY, SAVED_CREATORS_KEY};

/// Typed access to the two persisted documents on top of a [`KeyValueStore`].
pub struct CreatorRepository<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("stored '{key}' document is unreadable: {reason}")]
    Corrupted { key: &'static str, reason: String },
    #[error("unable to encode '{key}' document: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(StoreError),
}

impl<S> CreatorRepository<S>
where
    S: KeyValueStore,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Loads the collection, backfilling and persisting missing `createdAt`
    /// values. Fails on unreadable documents.
    pub fn load_creators(&self) -> Result<Vec<CreatorRecord>, RepositoryError> {
        let mut creators: Vec<CreatorRecord> = self.read_document(CREATORS_KEY)?;

        let filled = backfill_created_at(&mut creators, self.clock.now_millis());
        if filled > 0 {
            self.save_creators(&creators)?;
            info!(filled, "backfilled creator timestamps");
        }

        Ok(creators)
    }

    /// Read-path variant: an unreadable collection is reported as empty.
    pub fn load_creators_or_empty(&self) -> Result<Vec<CreatorRecord>, RepositoryError> {
        match self.load_creators() {
            Err(RepositoryError::Corrupted { key, reason }) => {
                warn!(key, %reason, "treating unreadable collection as empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    pub fn save_creators(&self, creators: &[CreatorRecord]) -> Result<(), RepositoryError> {
        self.write_document(CREATORS_KEY, creators)
    }

    pub fn load_saved(&self) -> Result<SavedSet, RepositoryError> {
        self.read_document(SAVED_CREATORS_KEY)
    }

    pub fn load_saved_or_empty(&self) -> Result<SavedSet, RepositoryError> {
        match self.load_saved() {
            Err(RepositoryError::Corrupted { key, reason }) => {
                warn!(key, %reason, "treating unreadable shortlist as empty");
                Ok(SavedSet::default())
            }
            other => other,
        }
    }

    pub fn save_saved(&self, saved: &SavedSet) -> Result<(), RepositoryError> {
        self.write_document(SAVED_CREATORS_KEY, saved)
    }

    fn read_document<T>(&self, key: &'static str) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned + Default,
    {
        let value = match self.store.read(key) {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(T::default()),
            Err(StoreError::Malformed { source, .. }) => {
                return Err(RepositoryError::Corrupted {
                    key,
                    reason: source.to_string(),
                })
            }
            Err(other) => return Err(RepositoryError::Store(other)),
        };

        serde_json::from_value(value).map_err(|err| RepositoryError::Corrupted {
            key,
            reason: err.to_string(),
        })
    }

    fn write_document<T>(&self, key: &'static str, document: &T) -> Result<(), RepositoryError>
    where
        T: Serialize + ?Sized,
    {
        let value =
            serde_json::to_value(document).map_err(|source| RepositoryError::Encode { key, source })?;
        self.store.write(key, &value).map_err(RepositoryError::Store)
    }
}
