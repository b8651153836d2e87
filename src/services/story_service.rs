use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    config::GeminiConfig,
    error::{Result, StoryError},
    models::{
        gemini::{Content, GenerateContentRequest, GenerationConfig, RequestPart},
        story::{GeneratedImage, StoryPayload, StoryRequest, StoryResult},
    },
    services::{
        extractor::{extract_image, extract_story},
        gemini_client::GenerativeProvider,
        prompts::{build_image_prompt, build_story_prompt, STORY_SYSTEM_INSTRUCTION},
        validation::validate_story_request,
    },
};

pub const DEFAULT_TEXT_MODEL: &str = "gemini-flash-latest";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3.1-flash-image-preview";

/// Configuration variable that unlocks both provider calls
const API_KEY_VARIABLE: &str = "GEMINI_API_KEY";

const STORY_TEMPERATURE: f32 = 0.9;

/// Keys and model names for one orchestration
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    pub text_api_key: Option<String>,
    pub image_api_key: Option<String>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
}

impl ProviderCredentials {
    /// Text key, falling back to the image key
    pub fn resolved_text_key(&self) -> Option<&str> {
        non_blank(&self.text_api_key).or_else(|| non_blank(&self.image_api_key))
    }

    /// Image key, falling back to the text key
    pub fn resolved_image_key(&self) -> Option<&str> {
        non_blank(&self.image_api_key).or_else(|| non_blank(&self.text_api_key))
    }

    pub fn resolved_text_model(&self) -> &str {
        non_blank(&self.text_model).unwrap_or(DEFAULT_TEXT_MODEL)
    }

    pub fn resolved_image_model(&self) -> &str {
        non_blank(&self.image_model).unwrap_or(DEFAULT_IMAGE_MODEL)
    }

    /// Configuration variables that must be set before generation can run
    pub fn missing_keys(&self) -> Vec<&'static str> {
        if self.resolved_text_key().is_none() {
            vec![API_KEY_VARIABLE]
        } else {
            Vec::new()
        }
    }
}

impl From<&GeminiConfig> for ProviderCredentials {
    fn from(config: &GeminiConfig) -> Self {
        Self {
            text_api_key: config.text_api_key.clone(),
            image_api_key: config.image_api_key.clone(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        }
    }
}

// Keys stay out of Debug output
impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("text_api_key", &self.text_api_key.as_ref().map(|_| "<redacted>"))
            .field("image_api_key", &self.image_api_key.as_ref().map(|_| "<redacted>"))
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Turns a validated request into a story plus illustration.
///
/// The text call always runs first; the image call is only made once a story
/// has been extracted, and any failure ends the whole generation.
pub struct StoryService {
    provider: Arc<dyn GenerativeProvider>,
}

impl StoryService {
    pub fn new(provider: Arc<dyn GenerativeProvider>) -> Self {
        Self { provider }
    }

    /// Validate an untrusted body, then generate
    pub async fn generate_from_value(
        &self,
        raw: &serde_json::Value,
        credentials: &ProviderCredentials,
    ) -> Result<StoryResult> {
        let request = validate_story_request(raw)?;
        self.generate(&request, credentials).await
    }

    #[instrument(
        skip(self, request, credentials),
        fields(
            age_group = request.age_group().as_str(),
            story_style = request.story_style().as_str(),
        )
    )]
    pub async fn generate(
        &self,
        request: &StoryRequest,
        credentials: &ProviderCredentials,
    ) -> Result<StoryResult> {
        let text_api_key = credentials.resolved_text_key().ok_or_else(|| {
            StoryError::MissingCredentials {
                message: "Missing Gemini API key for story generation.".to_string(),
                missing_keys: vec![API_KEY_VARIABLE],
            }
        })?;
        let image_api_key = credentials.resolved_image_key().ok_or_else(|| {
            StoryError::MissingCredentials {
                message: "Missing Gemini API key for image generation.".to_string(),
                missing_keys: vec![API_KEY_VARIABLE],
            }
        })?;

        let text_model = credentials.resolved_text_model();
        let image_model = credentials.resolved_image_model();

        let story = self.generate_story_text(request, text_api_key, text_model).await?;
        info!(model = text_model, title = %story.title, "Generated story text");

        let image = self.generate_story_image(request, image_api_key, image_model).await?;
        info!(
            model = image_model,
            mime_type = %image.mime_type,
            data_len = image.base64_data.len(),
            "Generated story illustration"
        );

        Ok(StoryResult {
            title: story.title,
            story_text: story.story_text,
            image_url: image.data_uri(),
            metadata: request.metadata(),
        })
    }

    async fn generate_story_text(
        &self,
        request: &StoryRequest,
        api_key: &str,
        model: &str,
    ) -> Result<StoryPayload> {
        let body = story_request_body(request);
        let envelope = self.provider.generate_content(model, api_key, &body).await?;
        extract_story(&envelope)
    }

    async fn generate_story_image(
        &self,
        request: &StoryRequest,
        api_key: &str,
        model: &str,
    ) -> Result<GeneratedImage> {
        let body = image_request_body(request);
        let envelope = self.provider.generate_content(model, api_key, &body).await?;
        extract_image(&envelope)
    }
}

fn story_request_body(request: &StoryRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Some(Content::instruction(STORY_SYSTEM_INSTRUCTION)),
        contents: vec![Content::user(vec![RequestPart::text(build_story_prompt(
            request,
        ))])],
        generation_config: GenerationConfig {
            temperature: Some(STORY_TEMPERATURE),
            response_mime_type: Some("application/json".to_string()),
            response_json_schema: Some(story_response_schema()),
            ..Default::default()
        },
    }
}

fn image_request_body(request: &StoryRequest) -> GenerateContentRequest {
    let photo = request.child_photo();

    GenerateContentRequest {
        system_instruction: None,
        contents: vec![Content::user(vec![
            RequestPart::text(build_image_prompt(request)),
            RequestPart::inline_data(photo.mime_type().as_str(), photo.base64_data()),
        ])],
        generation_config: GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
            ..Default::default()
        },
    }
}

fn story_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "A short, playful story title for children."
            },
            "storyText": {
                "type": "STRING",
                "description": "The full story in readable paragraphs. Keep it kid-safe, positive, and age-appropriate."
            }
        },
        "required": ["title", "storyText"],
        "propertyOrdering": ["title", "storyText"]
    })
}
