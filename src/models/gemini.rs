//! Gemini `generateContent` wire types.
//!
//! Responses show up with either camelCase or snake_case field names, so the
//! raw shapes below accept both and are folded into [`GenerationEnvelope`]
//! right after parsing. Nothing past the provider client sees the raw types.

use serde::{Deserialize, Serialize};

// ==================== Request ====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<RequestPart>,
}

impl Content {
    pub fn user(parts: Vec<RequestPart>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![RequestPart::text(text)],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: InlineData,
    },
}

impl RequestPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_json_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}

// ==================== Canonical response ====================

/// Normalized `generateContent` response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationEnvelope {
    pub candidates: Vec<Candidate>,
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub parts: Vec<Part>,
    pub finish_reason: Option<String>,
}

/// One response part; normally exactly one field is set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Part {
    pub text: Option<String>,
    pub inline_data: Option<InlineBlob>,
}

/// Inline binary payload as received; either field may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineBlob {
    pub mime_type: String,
    pub data: String,
}

impl InlineBlob {
    pub fn is_complete(&self) -> bool {
        !self.mime_type.is_empty() && !self.data.is_empty()
    }
}

impl GenerationEnvelope {
    /// Parts of the first candidate; further candidates are never inspected
    pub fn first_candidate_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .map(|candidate| candidate.parts.as_slice())
            .unwrap_or_default()
    }

    pub fn first_finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
    }
}

// ==================== Raw response ====================

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawEnvelope {
    #[serde(default)]
    candidates: Option<Vec<RawCandidate>>,
    #[serde(default, rename = "promptFeedback")]
    prompt_feedback_camel: Option<RawPromptFeedback>,
    #[serde(default, rename = "prompt_feedback")]
    prompt_feedback_snake: Option<RawPromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPromptFeedback {
    #[serde(default, rename = "blockReason")]
    block_reason_camel: Option<String>,
    #[serde(default, rename = "block_reason")]
    block_reason_snake: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCandidate {
    #[serde(default)]
    content: Option<RawContent>,
    #[serde(default, rename = "finishReason")]
    finish_reason_camel: Option<String>,
    #[serde(default, rename = "finish_reason")]
    finish_reason_snake: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContent {
    #[serde(default)]
    parts: Option<Vec<RawPart>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "inlineData")]
    inline_data_camel: Option<RawInlineCamel>,
    #[serde(default, rename = "inline_data")]
    inline_data_snake: Option<RawInlineSnake>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInlineCamel {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawInlineSnake {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

impl From<RawEnvelope> for GenerationEnvelope {
    fn from(raw: RawEnvelope) -> Self {
        // Precedence: promptFeedback.blockReason, promptFeedback.block_reason,
        // prompt_feedback.block_reason
        let block_reason = raw
            .prompt_feedback_camel
            .into_iter()
            .chain(raw.prompt_feedback_snake)
            .flat_map(|feedback| [feedback.block_reason_camel, feedback.block_reason_snake])
            .flatten()
            .find(|reason| !reason.is_empty());

        let candidates = raw
            .candidates
            .unwrap_or_default()
            .into_iter()
            .map(Candidate::from)
            .collect();

        Self {
            candidates,
            block_reason,
        }
    }
}

impl From<RawCandidate> for Candidate {
    fn from(raw: RawCandidate) -> Self {
        let parts = raw
            .content
            .and_then(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .map(Part::from)
            .collect();

        Self {
            parts,
            finish_reason: raw.finish_reason_camel.or(raw.finish_reason_snake),
        }
    }
}

impl From<RawPart> for Part {
    fn from(raw: RawPart) -> Self {
        let camel = raw.inline_data_camel.map(|blob| InlineBlob {
            mime_type: blob.mime_type.unwrap_or_default(),
            data: blob.data.unwrap_or_default(),
        });
        let snake = raw.inline_data_snake.map(|blob| InlineBlob {
            mime_type: blob.mime_type.unwrap_or_default(),
            data: blob.data.unwrap_or_default(),
        });

        // Prefer whichever variant is complete, camelCase first
        let inline_data = match (camel, snake) {
            (Some(camel), _) if camel.is_complete() => Some(camel),
            (camel, Some(snake)) if snake.is_complete() => Some(snake),
            (camel, snake) => camel.or(snake),
        };

        Self {
            text: raw.text,
            inline_data,
        }
    }
}

/// Parse a successful response body into the canonical envelope.
///
/// An empty (or whitespace-only) body is an empty envelope.
pub fn parse_envelope(body: &[u8]) -> serde_json::Result<GenerationEnvelope> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerationEnvelope::default());
    }

    let raw: RawEnvelope = serde_json::from_slice(body)?;
    Ok(raw.into())
}

/// `{"error": {"message": "..."}}` as returned on non-2xx statuses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

/// Provider's own error message, when the body carries one
pub fn parse_error_message(body: &[u8]) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_slice(body).ok()?;
    match envelope.error?.message? {
        serde_json::Value::String(message) => Some(message),
        _ => None,
    }
}
