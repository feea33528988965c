use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::CreatorId;

/// Creator ids a brand has shortlisted. Persisted as a JSON array of strings;
/// ids are not checked against the creator collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedSet(BTreeSet<CreatorId>);

impl SavedSet {
    pub fn contains(&self, id: &CreatorId) -> bool {
        self.0.contains(id)
    }

    /// Flips membership and reports whether `id` is saved afterwards.
    pub fn toggle(&mut self, id: &CreatorId) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.clone());
            true
        }
    }

    pub fn remove(&mut self, id: &CreatorId) -> bool {
        self.0.remove(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CreatorId> {
        self.0.iter()
    }
}

impl FromIterator<CreatorId> for SavedSet {
    fn from_iter<I: IntoIterator<Item = CreatorId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result of a save/unsave action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub creator_id: CreatorId,
    pub saved: bool,
    pub saved_count: usize,
}
