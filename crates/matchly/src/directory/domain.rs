use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for creator records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatorId(pub String);

impl CreatorId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CreatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CreatorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Primary platform a creator publishes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    TikTok,
    YouTube,
    #[serde(rename = "Twitter/X")]
    TwitterX,
}

impl Platform {
    pub const fn label(self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::TikTok => "TikTok",
            Platform::YouTube => "YouTube",
            Platform::TwitterX => "Twitter/X",
        }
    }

    /// Case-insensitive lookup by label, ignoring whitespace so `Twitter / X`
    /// matches. `twitter` and `x` alias Twitter/X.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "instagram" => Some(Platform::Instagram),
            "tiktok" => Some(Platform::TikTok),
            "youtube" => Some(Platform::YouTube),
            "twitter/x" | "twitter" | "x" => Some(Platform::TwitterX),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reference to an accepted media kit attachment.
///
/// Newly accepted kits are content addressed (`sha256:<hex>`). Older records may
/// carry references the blob store cannot resolve; those are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaKitRef(pub String);

impl MediaKitRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A creator's profile as persisted in the `creators` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorRecord {
    pub id: CreatorId,
    pub name: String,
    pub niche: String,
    #[serde(default, with = "platform_field")]
    pub platform: Option<Platform>,
    pub followers: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_kit: Option<MediaKitRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl CreatorRecord {
    pub fn has_media_kit(&self) -> bool {
        self.media_kit.is_some()
    }

    pub fn platform_label(&self) -> &'static str {
        self.platform.map(Platform::label).unwrap_or("")
    }
}

/// Raw onboarding form exactly as typed by the creator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub niche: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub followers: String,
}

/// Form clients sometimes send the follower count as a JSON number.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

/// A single binary file offered alongside a form submission.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Declared type must be exactly `application/pdf`; no sniffing.
    pub fn is_pdf(&self) -> bool {
        self.content_type == mime::APPLICATION_PDF.essence_str()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Unset platforms round-trip as `""` so stored collections keep a string field.
mod platform_field {
    use super::Platform;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Option<Platform>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.map(Platform::label).unwrap_or(""))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Platform>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Platform::parse(value).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("unsupported platform '{value}'"))
            }),
        }
    }
}
