use std::fmt;

use super::domain::{Attachment, OnboardingForm, Platform};

/// A single user-facing reason a profile submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("Full name is required")]
    MissingName,
    #[error("Niche is required")]
    MissingNiche,
    #[error("Platform is required")]
    MissingPlatform,
    #[error("Platform must be one of Instagram, TikTok, YouTube, Twitter/X")]
    UnsupportedPlatform,
    #[error("Follower count is required")]
    MissingFollowers,
    #[error("Follower count must be a whole number")]
    InvalidFollowers,
    #[error("Media kit (PDF) is required")]
    MissingMediaKit,
    #[error("Media kit must be a PDF file")]
    MediaKitNotPdf,
    #[error("Media kit exceeds the maximum upload size")]
    MediaKitTooLarge,
}

/// Every issue found in one submission, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

impl From<ValidationIssue> for ValidationErrors {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "profile rejected: {}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Normalized profile fields, ready to become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProfile {
    pub name: String,
    pub niche: String,
    pub platform: Platform,
    pub followers: u64,
    pub media_kit: Attachment,
}

/// Gatekeeper for onboarding submissions and media kit uploads.
#[derive(Debug, Clone)]
pub struct OnboardingGuard {
    max_media_kit_bytes: usize,
}

impl OnboardingGuard {
    pub fn new(max_media_kit_bytes: usize) -> Self {
        Self {
            max_media_kit_bytes,
        }
    }

    pub fn max_media_kit_bytes(&self) -> usize {
        self.max_media_kit_bytes
    }

    /// Runs every rule and collects all violations rather than stopping at the first.
    pub fn validate(
        &self,
        form: &OnboardingForm,
        attachment: Option<Attachment>,
    ) -> Result<ValidatedProfile, ValidationErrors> {
        let mut issues = Vec::new();

        let name = form.name.trim();
        if name.is_empty() {
            issues.push(ValidationIssue::MissingName);
        }

        let niche = form.niche.trim();
        if niche.is_empty() {
            issues.push(ValidationIssue::MissingNiche);
        }

        let platform = match form.platform.trim() {
            "" => {
                issues.push(ValidationIssue::MissingPlatform);
                None
            }
            raw => {
                let parsed = Platform::parse(raw);
                if parsed.is_none() {
                    issues.push(ValidationIssue::UnsupportedPlatform);
                }
                parsed
            }
        };

        let followers = match form.followers.trim() {
            "" => {
                issues.push(ValidationIssue::MissingFollowers);
                None
            }
            raw => {
                let parsed = raw.parse::<u64>().ok();
                if parsed.is_none() {
                    issues.push(ValidationIssue::InvalidFollowers);
                }
                parsed
            }
        };

        let media_kit = match attachment {
            None => {
                issues.push(ValidationIssue::MissingMediaKit);
                None
            }
            Some(attachment) => match self.check_media_kit(&attachment) {
                Ok(()) => Some(attachment),
                Err(issue) => {
                    issues.push(issue);
                    None
                }
            },
        };

        match (platform, followers, media_kit) {
            (Some(platform), Some(followers), Some(media_kit)) if issues.is_empty() => {
                Ok(ValidatedProfile {
                    name: name.to_string(),
                    niche: niche.to_string(),
                    platform,
                    followers,
                    media_kit,
                })
            }
            _ => Err(ValidationErrors { issues }),
        }
    }

    /// The single rule applied when a media kit is replaced later on.
    pub fn check_media_kit(&self, attachment: &Attachment) -> Result<(), ValidationIssue> {
        if !attachment.is_pdf() {
            return Err(ValidationIssue::MediaKitNotPdf);
        }
        if attachment.len() > self.max_media_kit_bytes {
            return Err(ValidationIssue::MediaKitTooLarge);
        }
        Ok(())
    }
}
