use serde_json::Value;
use tracing::debug;

use crate::{
    error::{GenerationStage, Result, StoryError},
    models::{
        gemini::GenerationEnvelope,
        story::{GeneratedImage, StoryPayload},
    },
};

/// Pull the structured story out of a text-model response.
///
/// Every text part of the first candidate is tried in order; the first one
/// that parses as `{"title", "storyText"}` wins.
pub fn extract_story(envelope: &GenerationEnvelope) -> Result<StoryPayload> {
    ensure_not_blocked(envelope, GenerationStage::Story)?;

    let story = envelope
        .first_candidate_parts()
        .iter()
        .filter_map(|part| part.text.as_deref())
        .find_map(parse_story_json);

    story.ok_or_else(|| {
        debug!(
            candidates = envelope.candidates.len(),
            finish_reason = ?envelope.first_finish_reason(),
            "No structured story in response"
        );
        StoryError::UnexpectedFormat("Gemini returned an unexpected story format.".to_string())
    })
}

/// Pull the first complete inline image out of an image-model response.
pub fn extract_image(envelope: &GenerationEnvelope) -> Result<GeneratedImage> {
    ensure_not_blocked(envelope, GenerationStage::Image)?;

    let image = envelope
        .first_candidate_parts()
        .iter()
        .filter_map(|part| part.inline_data.as_ref())
        .find(|blob| blob.is_complete())
        .map(|blob| GeneratedImage {
            mime_type: blob.mime_type.clone(),
            base64_data: blob.data.clone(),
        });

    image.ok_or_else(|| {
        debug!(
            candidates = envelope.candidates.len(),
            finish_reason = ?envelope.first_finish_reason(),
            "No inline image in response"
        );
        StoryError::UnexpectedFormat(
            "Gemini image generation did not return an image.".to_string(),
        )
    })
}

fn ensure_not_blocked(envelope: &GenerationEnvelope, stage: GenerationStage) -> Result<()> {
    match &envelope.block_reason {
        Some(reason) => Err(StoryError::Blocked {
            stage,
            reason: reason.clone(),
        }),
        None => Ok(()),
    }
}

fn parse_story_json(text: &str) -> Option<StoryPayload> {
    let parsed: Value = serde_json::from_str(strip_code_fence(text)).ok()?;

    let title = parsed.get("title")?.as_str()?.trim();
    let story_text = parsed.get("storyText")?.as_str()?.trim();
    if title.is_empty() || story_text.is_empty() {
        return None;
    }

    Some(StoryPayload {
        title: title.to_string(),
        story_text: story_text.to_string(),
    })
}

/// Remove a surrounding ```json ... ``` or ``` ... ``` fence, if any
fn strip_code_fence(text: &str) -> &str {
    let mut inner = text.trim();

    if let Some(rest) = strip_prefix_ignore_case(inner, "```json") {
        inner = rest.trim_start();
    }
    if let Some(rest) = inner.strip_prefix("```") {
        inner = rest.trim_start();
    }
    if let Some(rest) = inner.strip_suffix("```") {
        inner = rest.trim_end();
    }

    inner.trim()
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}
