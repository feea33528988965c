use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{CreatorRecord, Platform};
use super::shortlist::SavedSet;

/// Platform criterion. A value outside the known set matches no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformFilter {
    Only(Platform),
    Unrecognized(String),
}

impl PlatformFilter {
    /// `None` for blank input; anything else becomes a criterion.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match Platform::parse(trimmed) {
            Some(platform) => PlatformFilter::Only(platform),
            None => PlatformFilter::Unrecognized(trimmed.to_string()),
        })
    }

    pub fn accepts(&self, platform: Option<Platform>) -> bool {
        match self {
            PlatformFilter::Only(wanted) => platform == Some(*wanted),
            PlatformFilter::Unrecognized(_) => false,
        }
    }
}

impl From<Platform> for PlatformFilter {
    fn from(platform: Platform) -> Self {
        PlatformFilter::Only(platform)
    }
}

/// Brand-side filters. `None`/`false` fields match every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub niche: Option<String>,
    pub platform: Option<PlatformFilter>,
    pub min_followers: Option<u64>,
    pub max_followers: Option<u64>,
    pub has_media_kit: bool,
    pub saved_only: bool,
}

impl FilterCriteria {
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    /// True when `record` satisfies every active criterion.
    pub fn matches(&self, record: &CreatorRecord, saved: &SavedSet) -> bool {
        let matches_niche = self.niche.as_deref().map_or(true, |needle| {
            record
                .niche
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let matches_platform = self
            .platform
            .as_ref()
            .map_or(true, |filter| filter.accepts(record.platform));
        let matches_min = self.min_followers.map_or(true, |min| record.followers >= min);
        let matches_max = self.max_followers.map_or(true, |max| record.followers <= max);
        let matches_media_kit = !self.has_media_kit || record.has_media_kit();
        let matches_saved = !self.saved_only || saved.contains(&record.id);

        matches_niche
            && matches_platform
            && matches_min
            && matches_max
            && matches_media_kit
            && matches_saved
    }
}

/// Ordering applied inside the saved and unsaved groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    #[default]
    #[serde(rename = "recent")]
    RecentlyAdded,
    #[serde(rename = "most")]
    MostFollowers,
    #[serde(rename = "least")]
    LeastFollowers,
}

impl SortMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "recent" | "recently_added" | "recently-added" => Some(SortMode::RecentlyAdded),
            "most" | "most_followers" | "most-followers" => Some(SortMode::MostFollowers),
            "least" | "least_followers" | "least-followers" => Some(SortMode::LeastFollowers),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SortMode::RecentlyAdded => "recent",
            SortMode::MostFollowers => "most",
            SortMode::LeastFollowers => "least",
        }
    }

    /// Missing timestamps sort as oldest under `RecentlyAdded`.
    pub fn compare(self, a: &CreatorRecord, b: &CreatorRecord) -> Ordering {
        match self {
            SortMode::MostFollowers => b.followers.cmp(&a.followers),
            SortMode::LeastFollowers => a.followers.cmp(&b.followers),
            SortMode::RecentlyAdded => b.created_at.cmp(&a.created_at),
        }
    }
}

/// Untyped filter input as it arrives from query strings or CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryQuery {
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub min_followers: Option<String>,
    #[serde(default)]
    pub max_followers: Option<String>,
    #[serde(default)]
    pub has_media_kit: Option<bool>,
    #[serde(default)]
    pub saved_only: Option<bool>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl DiscoveryQuery {
    /// Blank values and unparsable follower bounds or sort modes fall back to
    /// "unset". A non-blank platform always filters, even when unknown.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            niche: self
                .niche
                .as_deref()
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            platform: self.platform.as_deref().and_then(PlatformFilter::parse),
            min_followers: parse_bound(self.min_followers.as_deref()),
            max_followers: parse_bound(self.max_followers.as_deref()),
            has_media_kit: self.has_media_kit.unwrap_or(false),
            saved_only: self.saved_only.unwrap_or(false),
        }
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
            .as_deref()
            .and_then(SortMode::parse)
            .unwrap_or_default()
    }
}

fn parse_bound(raw: Option<&str>) -> Option<u64> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<u64>().ok())
}

/// Filters then orders the collection: saved records first, then `sort`.
///
/// The sort is stable, so records that tie on both keys keep their original
/// relative order.
pub fn discover<'a>(
    records: &'a [CreatorRecord],
    criteria: &FilterCriteria,
    sort: SortMode,
    saved: &SavedSet,
) -> Vec<&'a CreatorRecord> {
    let mut visible: Vec<&CreatorRecord> = records
        .iter()
        .filter(|record| criteria.matches(record, saved))
        .collect();

    visible.sort_by(|a, b| {
        saved
            .contains(&b.id)
            .cmp(&saved.contains(&a.id))
            .then_with(|| sort.compare(a, b))
    });

    visible
}

/// The creator's own profile: the record with the newest `createdAt`, first
/// in collection order on ties.
pub fn most_recently_created(records: &[CreatorRecord]) -> Option<&CreatorRecord> {
    records.iter().fold(None, |best: Option<&CreatorRecord>, record| match best {
        Some(current) if current.created_at >= record.created_at => Some(current),
        _ => Some(record),
    })
}

/// Why a discovery result is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    NoCreators,
    NoMatches,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatorCard {
    #[serde(flatten)]
    pub record: CreatorRecord,
    pub saved: bool,
}

/// Rendered discovery result with the counters the brand dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryView {
    pub sort: SortMode,
    pub total: usize,
    pub visible: usize,
    pub saved_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyState>,
    pub creators: Vec<CreatorCard>,
}

impl DirectoryView {
    pub fn build(
        records: &[CreatorRecord],
        criteria: &FilterCriteria,
        sort: SortMode,
        saved: &SavedSet,
    ) -> Self {
        let creators: Vec<CreatorCard> = discover(records, criteria, sort, saved)
            .into_iter()
            .map(|record| CreatorCard {
                saved: saved.contains(&record.id),
                record: record.clone(),
            })
            .collect();

        let empty_state = if records.is_empty() {
            Some(EmptyState::NoCreators)
        } else if creators.is_empty() {
            Some(EmptyState::NoMatches)
        } else {
            None
        };

        Self {
            sort,
            total: records.len(),
            visible: creators.len(),
            saved_count: saved.len(),
            empty_state,
            creators,
        }
    }
}
