//! Shared helpers for router-level tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use magic_story::{
    config::{Config, GeminiConfig, ServerConfig},
    models::gemini::{Candidate, GenerateContentRequest, GenerationEnvelope, InlineBlob, Part},
    routes::create_router,
    services::GenerativeProvider,
    AppState, Result,
};

/// Provider double: replays queued envelopes and records (model, api key) per call.
#[derive(Default)]
pub struct StubProvider {
    responses: Mutex<VecDeque<Result<GenerationEnvelope>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubProvider {
    pub fn new(responses: Vec<Result<GenerationEnvelope>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeProvider for StubProvider {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        _request: &GenerateContentRequest,
    ) -> Result<GenerationEnvelope> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), api_key.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("stub ran out of responses")
    }
}

pub fn test_config(text_api_key: Option<&str>, image_api_key: Option<&str>) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_body_bytes: 64 * 1024,
        },
        gemini: GeminiConfig {
            api_base: "http://127.0.0.1:9/v1beta/models".to_string(),
            request_timeout_secs: 60,
            text_api_key: text_api_key.map(str::to_string),
            image_api_key: image_api_key.map(str::to_string),
            text_model: None,
            image_model: None,
        },
    }
}

pub fn build_test_app(config: Config, provider: Arc<StubProvider>) -> Router {
    create_router(AppState::with_provider(config, provider))
}

pub fn text_envelope(text: &str) -> GenerationEnvelope {
    GenerationEnvelope {
        candidates: vec![Candidate {
            parts: vec![Part {
                text: Some(text.to_string()),
                inline_data: None,
            }],
            finish_reason: Some("STOP".to_string()),
        }],
        block_reason: None,
    }
}

pub fn image_envelope(mime_type: &str, data: &str) -> GenerationEnvelope {
    GenerationEnvelope {
        candidates: vec![Candidate {
            parts: vec![Part {
                text: None,
                inline_data: Some(InlineBlob {
                    mime_type: mime_type.to_string(),
                    data: data.to_string(),
                }),
            }],
            finish_reason: Some("STOP".to_string()),
        }],
        block_reason: None,
    }
}

/// A well-formed story request body with a small encoded photo
pub fn story_body() -> Value {
    json!({
        "ageGroup": "6-8",
        "favoriteCharacter": "A brave dragon",
        "storyStyle": "space-adventure",
        "childPhoto": {
            "base64Data": STANDARD.encode(b"\x89PNG\r\n\x1a\n fake photo bytes for tests"),
            "mimeType": "image/png",
            "fileName": "me.png"
        }
    })
}

/// Send a POST request with a raw body and return status plus parsed JSON.
pub async fn post_raw(app: Router, uri: &str, body: Vec<u8>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(app, uri, serde_json::to_vec(body).unwrap()).await
}
