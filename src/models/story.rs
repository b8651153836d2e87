use serde::{Deserialize, Serialize};
use std::fmt;

/// Reader age bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "3-5")]
    ThreeToFive,
    #[serde(rename = "6-8")]
    SixToEight,
    #[serde(rename = "9-12")]
    NineToTwelve,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 3] = [Self::ThreeToFive, Self::SixToEight, Self::NineToTwelve];

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|group| group.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreeToFive => "3-5",
            Self::SixToEight => "6-8",
            Self::NineToTwelve => "9-12",
        }
    }
}

/// Narrative setting for the story and the illustration theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoryStyle {
    SpaceAdventure,
    FairyTale,
    JungleQuest,
    UnderwaterMission,
}

impl StoryStyle {
    pub const ALL: [StoryStyle; 4] = [
        Self::SpaceAdventure,
        Self::FairyTale,
        Self::JungleQuest,
        Self::UnderwaterMission,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpaceAdventure => "space-adventure",
            Self::FairyTale => "fairy-tale",
            Self::JungleQuest => "jungle-quest",
            Self::UnderwaterMission => "underwater-mission",
        }
    }
}

/// Image formats accepted for the reference photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhotoMimeType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
}

impl PhotoMimeType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }
}

/// The child's reference photo, base64-encoded
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    pub(crate) base64_data: String,
    pub(crate) mime_type: PhotoMimeType,
    pub(crate) file_name: Option<String>,
}

impl Photo {
    pub fn base64_data(&self) -> &str {
        &self.base64_data
    }

    pub fn mime_type(&self) -> PhotoMimeType {
        self.mime_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
}

// Photo payloads run to megabytes; keep them out of logs and panics
impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("base64_len", &self.base64_data.len())
            .field("mime_type", &self.mime_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// A validated story request.
///
/// Only `services::validation::validate_story_request` constructs this type,
/// so holding one means every field has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest {
    pub(crate) age_group: AgeGroup,
    pub(crate) favorite_character: String,
    pub(crate) story_style: StoryStyle,
    pub(crate) child_photo: Photo,
}

impl StoryRequest {
    pub fn age_group(&self) -> AgeGroup {
        self.age_group
    }

    /// Trimmed character name
    pub fn favorite_character(&self) -> &str {
        &self.favorite_character
    }

    pub fn story_style(&self) -> StoryStyle {
        self.story_style
    }

    pub fn child_photo(&self) -> &Photo {
        &self.child_photo
    }

    pub fn metadata(&self) -> StoryMetadata {
        StoryMetadata {
            age_group: self.age_group,
            story_style: self.story_style,
            favorite_character: self.favorite_character.clone(),
        }
    }
}

/// Title and body parsed from the text model's structured reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryPayload {
    pub title: String,
    pub story_text: String,
}

/// Inline image returned by the image model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub base64_data: String,
}

impl GeneratedImage {
    /// Self-contained `data:` URI for direct embedding
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMetadata {
    pub age_group: AgeGroup,
    pub story_style: StoryStyle,
    pub favorite_character: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResult {
    pub title: String,
    pub story_text: String,
    pub image_url: String,
    pub metadata: StoryMetadata,
}

/// POST /api/story response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryGenerateResponse {
    pub success: bool,
    pub data: StoryResult,
}
