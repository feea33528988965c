use serde::Serialize;

use super::domain::CreatorRecord;

/// Items on the profile checklist, in scoring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Niche,
    Platform,
    Followers,
    MediaKit,
}

impl ProfileField {
    pub const CHECKLIST: [ProfileField; 5] = [
        ProfileField::Name,
        ProfileField::Niche,
        ProfileField::Platform,
        ProfileField::Followers,
        ProfileField::MediaKit,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Niche => "niche",
            ProfileField::Platform => "platform",
            ProfileField::Followers => "followers",
            ProfileField::MediaKit => "media kit",
        }
    }

    fn is_present(self, record: &CreatorRecord) -> bool {
        match self {
            ProfileField::Name => !record.name.is_empty(),
            ProfileField::Niche => !record.niche.is_empty(),
            ProfileField::Platform => record.platform.is_some(),
            ProfileField::Followers => record.followers != 0,
            ProfileField::MediaKit => record.media_kit.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletenessReport {
    pub score: u8,
    pub missing: Vec<ProfileField>,
}

pub fn completeness_report(record: Option<&CreatorRecord>) -> CompletenessReport {
    let Some(record) = record else {
        return CompletenessReport {
            score: 0,
            missing: ProfileField::CHECKLIST.to_vec(),
        };
    };

    let missing: Vec<ProfileField> = ProfileField::CHECKLIST
        .into_iter()
        .filter(|field| !field.is_present(record))
        .collect();
    let present = ProfileField::CHECKLIST.len() - missing.len();
    let score = (100.0 * present as f64 / ProfileField::CHECKLIST.len() as f64).round() as u8;

    CompletenessReport { score, missing }
}

/// Percentage (0–100) of checklist items present; 0 when there is no profile.
pub fn profile_completeness(record: Option<&CreatorRecord>) -> u8 {
    completeness_report(record).score
}
