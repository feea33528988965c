use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::info;

use super::attachment::{AttachmentError, AttachmentStore, PreviewHandle, PreviewRegistry};
use super::clock::{Clock, SystemClock};
use super::completeness::{completeness_report, CompletenessReport};
use super::domain::{Attachment, CreatorId, CreatorRecord, MediaKitRef, OnboardingForm};
use super::query::{most_recently_created, DirectoryView, FilterCriteria, SortMode};
use super::repository::{CreatorRepository, RepositoryError};
use super::shortlist::{SavedSet, ToggleOutcome};
use super::store::KeyValueStore;
use super::validation::{OnboardingGuard, ValidationErrors};

/// Service composing the onboarding guard, record repository, and blob store.
///
/// Every load and save of the record documents runs under one lock, since a
/// read can persist a timestamp backfill. Requests served by the same process
/// never interleave; separate processes sharing a data directory still race,
/// last write wins.
pub struct CreatorDirectoryService<S, B> {
    guard: OnboardingGuard,
    repository: CreatorRepository<S>,
    attachments: Arc<B>,
    previews: Mutex<PreviewRegistry>,
    write_lock: Mutex<()>,
}

/// What the creator sees on their own dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct CreatorDashboard {
    pub profile: CreatorRecord,
    pub completeness: CompletenessReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_kit_preview: Option<PreviewHandle>,
}

impl<S, B> CreatorDirectoryService<S, B>
where
    S: KeyValueStore + 'static,
    B: AttachmentStore + 'static,
{
    pub fn new(store: Arc<S>, attachments: Arc<B>, guard: OnboardingGuard) -> Self {
        Self::with_clock(store, attachments, guard, Arc::new(SystemClock::default()))
    }

    pub fn with_clock(
        store: Arc<S>,
        attachments: Arc<B>,
        guard: OnboardingGuard,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guard,
            repository: CreatorRepository::new(store, clock),
            attachments,
            previews: Mutex::new(PreviewRegistry::default()),
            write_lock: Mutex::new(()),
        }
    }

    pub fn guard(&self) -> &OnboardingGuard {
        &self.guard
    }

    /// Validate a submission and append the new record.
    ///
    /// Nothing is stored unless every rule passes.
    pub fn onboard(
        &self,
        form: OnboardingForm,
        attachment: Option<Attachment>,
    ) -> Result<CreatorRecord, DirectoryServiceError> {
        let profile = self.guard.validate(&form, attachment)?;

        let _lock = self.lock_writes();
        let mut creators = self.repository.load_creators()?;
        let media_kit = self.attachments.accept(&profile.media_kit)?;

        let record = CreatorRecord {
            id: CreatorId::generate(),
            name: profile.name,
            niche: profile.niche,
            platform: Some(profile.platform),
            followers: profile.followers,
            media_kit: Some(media_kit),
            created_at: Some(self.repository.clock().now_millis()),
        };

        creators.push(record.clone());
        self.repository.save_creators(&creators)?;

        info!(creator_id = %record.id, platform = %profile.platform, "creator onboarded");
        Ok(record)
    }

    pub fn creators(&self) -> Result<Vec<CreatorRecord>, DirectoryServiceError> {
        let _lock = self.lock_writes();
        Ok(self.repository.load_creators_or_empty()?)
    }

    /// Recomputes the brand view from the current collection and shortlist.
    pub fn discover(
        &self,
        criteria: &FilterCriteria,
        sort: SortMode,
    ) -> Result<DirectoryView, DirectoryServiceError> {
        let (creators, saved) = {
            let _lock = self.lock_writes();
            (
                self.repository.load_creators_or_empty()?,
                self.repository.load_saved_or_empty()?,
            )
        };
        Ok(DirectoryView::build(&creators, criteria, sort, &saved))
    }

    pub fn creator(&self, id: &CreatorId) -> Result<Option<CreatorRecord>, DirectoryServiceError> {
        let creators = self.creators()?;
        Ok(creators.into_iter().find(|record| &record.id == id))
    }

    pub fn current_profile(&self) -> Result<Option<CreatorRecord>, DirectoryServiceError> {
        let creators = self.creators()?;
        Ok(most_recently_created(&creators).cloned())
    }

    pub fn dashboard(&self) -> Result<Option<CreatorDashboard>, DirectoryServiceError> {
        let Some(profile) = self.current_profile()? else {
            return Ok(None);
        };
        let completeness = completeness_report(Some(&profile));
        let media_kit_preview = self.preview_for(&profile)?;
        Ok(Some(CreatorDashboard {
            profile,
            completeness,
            media_kit_preview,
        }))
    }

    pub fn completeness(
        &self,
        id: &CreatorId,
    ) -> Result<Option<CompletenessReport>, DirectoryServiceError> {
        Ok(self
            .creator(id)?
            .map(|record| completeness_report(Some(&record))))
    }

    /// Remove a record and drop its id from the shortlist.
    ///
    /// The two documents are written separately; a crash between the writes
    /// leaves a dangling saved id, which discovery ignores.
    pub fn delete(&self, id: &CreatorId) -> Result<Option<CreatorRecord>, DirectoryServiceError> {
        let _lock = self.lock_writes();
        let mut creators = self.repository.load_creators()?;
        let Some(position) = creators.iter().position(|record| &record.id == id) else {
            return Ok(None);
        };

        let removed = creators.remove(position);
        self.repository.save_creators(&creators)?;

        let mut saved = self.repository.load_saved_or_empty()?;
        if saved.remove(id) {
            self.repository.save_saved(&saved)?;
        }

        info!(creator_id = %id, "creator deleted");
        Ok(Some(removed))
    }

    /// Swap the media kit on an existing record. Only the PDF rule applies.
    pub fn replace_media_kit(
        &self,
        id: &CreatorId,
        attachment: Attachment,
    ) -> Result<Option<CreatorRecord>, DirectoryServiceError> {
        let _lock = self.lock_writes();
        let mut creators = self.repository.load_creators()?;
        let Some(record) = creators.iter_mut().find(|record| &record.id == id) else {
            return Ok(None);
        };

        self.guard
            .check_media_kit(&attachment)
            .map_err(ValidationErrors::from)?;
        record.media_kit = Some(self.attachments.accept(&attachment)?);
        let updated = record.clone();

        self.repository.save_creators(&creators)?;

        info!(creator_id = %id, "media kit replaced");
        Ok(Some(updated))
    }

    pub fn toggle_saved(&self, id: &CreatorId) -> Result<ToggleOutcome, DirectoryServiceError> {
        let _lock = self.lock_writes();
        let mut saved = self.repository.load_saved()?;
        let now_saved = saved.toggle(id);
        self.repository.save_saved(&saved)?;

        info!(creator_id = %id, saved = now_saved, saved_count = saved.len(), "shortlist toggled");
        Ok(ToggleOutcome {
            creator_id: id.clone(),
            saved: now_saved,
            saved_count: saved.len(),
        })
    }

    pub fn saved(&self) -> Result<SavedSet, DirectoryServiceError> {
        let _lock = self.lock_writes();
        Ok(self.repository.load_saved_or_empty()?)
    }

    /// Session-scoped preview handle, when the record's kit is still resolvable.
    pub fn preview_for(
        &self,
        record: &CreatorRecord,
    ) -> Result<Option<PreviewHandle>, DirectoryServiceError> {
        let Some(reference) = record.media_kit.as_ref() else {
            return Ok(None);
        };
        if self.attachments.open(reference)?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.previews().issue(reference)))
    }

    pub fn open_preview(
        &self,
        handle: &PreviewHandle,
    ) -> Result<Option<Vec<u8>>, DirectoryServiceError> {
        let reference: Option<MediaKitRef> = self.previews().resolve(handle).cloned();
        match reference {
            Some(reference) => Ok(self.attachments.open(&reference)?),
            None => Ok(None),
        }
    }

    fn previews(&self) -> MutexGuard<'_, PreviewRegistry> {
        self.previews.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Error raised by the directory service.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}
