//! Creator directory: onboarding, profile scoring, shortlists, and brand discovery.
//!
//! Records live in a whole-document key/value store (`creators`, `savedCreators`);
//! media kits go to a content-addressed blob store. Everything above the store
//! is plain synchronous code so the HTTP router and the CLI share one service.

pub mod attachment;
pub mod clock;
pub mod completeness;
pub mod domain;
pub mod export;
pub mod migration;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;
pub mod shortlist;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use attachment::{
    AttachmentError, AttachmentStore, FileBlobStore, MemoryBlobStore, PreviewHandle,
};
pub use clock::{Clock, SteppingClock, SystemClock};
pub use completeness::{completeness_report, profile_completeness, CompletenessReport, ProfileField};
pub use domain::{Attachment, CreatorId, CreatorRecord, MediaKitRef, OnboardingForm, Platform};
pub use query::{
    discover, most_recently_created, CreatorCard, DirectoryView, DiscoveryQuery, EmptyState,
    FilterCriteria, PlatformFilter, SortMode,
};
pub use repository::{CreatorRepository, RepositoryError};
pub use router::directory_router;
pub use service::{CreatorDashboard, CreatorDirectoryService, DirectoryServiceError};
pub use shortlist::{SavedSet, ToggleOutcome};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use validation::{OnboardingGuard, ValidationErrors, ValidationIssue};
