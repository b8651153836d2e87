use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    config::GeminiConfig,
    error::{Result, StoryError},
    models::gemini::{parse_envelope, parse_error_message, GenerateContentRequest, GenerationEnvelope},
};

/// A generative-content backend that answers one request with one envelope.
///
/// Implementations make exactly one attempt per call.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerationEnvelope>;
}

/// HTTP client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    api_base: Url,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .map_err(|e| anyhow!("Invalid Gemini API base URL {}: {}", api_base, e))?;
        if api_base.cannot_be_a_base() {
            return Err(anyhow!("Gemini API base URL cannot be a base: {}", api_base).into());
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            api_base,
            timeout,
            http_client,
        })
    }

    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        Self::new(&config.api_base, config.request_timeout())
    }

    fn endpoint(&self, model: &str) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Gemini API base URL cannot be a base"))?
            .pop_if_empty()
            .push(&format!("{}:generateContent", model));
        Ok(url)
    }

    /// Send the request and read the whole body; the caller bounds this with the timeout
    async fn send(
        &self,
        url: Url,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<(reqwest::StatusCode, Vec<u8>)> {
        let response = self
            .http_client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl GenerativeProvider for GeminiClient {
    #[instrument(skip(self, api_key, request))]
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerationEnvelope> {
        let url = self.endpoint(model)?;

        // Dropping the in-flight future on expiry cancels the request
        let (status, body) = tokio::time::timeout(self.timeout, self.send(url, api_key, request))
            .await
            .map_err(|_| StoryError::Timeout)??;

        debug!(status = status.as_u16(), body_len = body.len(), "Gemini responded");

        if !status.is_success() {
            let message = parse_error_message(&body).unwrap_or_else(|| {
                format!(
                    "Gemini API request failed with status {}.",
                    status.as_u16()
                )
            });
            return Err(StoryError::ProviderRejected(message));
        }

        parse_envelope(&body).map_err(|e| {
            debug!("Unparseable Gemini response: {}", e);
            StoryError::UnexpectedFormat("Gemini returned a malformed response.".to_string())
        })
    }
}

fn transport_error(e: reqwest::Error) -> StoryError {
    if e.is_timeout() {
        StoryError::Timeout
    } else {
        StoryError::Transport(format!("Gemini API request failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gemini::{Content, GenerationConfig, RequestPart};
    use axum::{
        body::Bytes,
        http::{HeaderMap, StatusCode, Uri},
        response::IntoResponse,
        Router,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Seen {
        path: Option<String>,
        api_key: Option<String>,
        body: Option<serde_json::Value>,
        hits: usize,
    }

    /// Serve every request with the same canned response on an ephemeral port
    async fn serve(
        status: StatusCode,
        body: &'static str,
        delay: Duration,
    ) -> (String, Arc<Mutex<Seen>>) {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let recorder = seen.clone();

        let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, payload: Bytes| {
            let recorder = recorder.clone();
            async move {
                {
                    let mut seen = recorder.lock().unwrap();
                    seen.hits += 1;
                    seen.path = Some(uri.path().to_string());
                    seen.api_key = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    seen.body = serde_json::from_slice(&payload).ok();
                }
                tokio::time::sleep(delay).await;
                (status, body).into_response()
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/v1beta/models", addr), seen)
    }

    fn request() -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content::user(vec![RequestPart::text("hello")])],
            generation_config: GenerationConfig::default(),
        }
    }

    #[tokio::test]
    async fn posts_to_model_endpoint_and_parses_envelope() {
        let (base, seen) = serve(
            StatusCode::OK,
            r#"{"candidates":[{"content":{"parts":[{"text":"hi"}]},"finishReason":"STOP"}]}"#,
            Duration::ZERO,
        )
        .await;
        let client = GeminiClient::new(&base, Duration::from_secs(5)).unwrap();

        let envelope = client
            .generate_content("gemini-flash-latest", "secret-key", &request())
            .await
            .unwrap();

        assert_eq!(envelope.first_candidate_parts()[0].text.as_deref(), Some("hi"));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.hits, 1);
        assert_eq!(
            seen.path.as_deref(),
            Some("/v1beta/models/gemini-flash-latest:generateContent")
        );
        assert_eq!(seen.api_key.as_deref(), Some("secret-key"));
        assert_eq!(
            seen.body,
            Some(json!({ "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }], "generationConfig": {} }))
        );
    }

    #[tokio::test]
    async fn empty_success_body_is_empty_envelope() {
        let (base, _) = serve(StatusCode::OK, "", Duration::ZERO).await;
        let client = GeminiClient::new(&base, Duration::from_secs(5)).unwrap();

        let envelope = client.generate_content("m", "k", &request()).await.unwrap();
        assert_eq!(envelope, GenerationEnvelope::default());
    }

    #[tokio::test]
    async fn surfaces_provider_error_message_verbatim() {
        let (base, _) = serve(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#,
            Duration::ZERO,
        )
        .await;
        let client = GeminiClient::new(&base, Duration::from_secs(5)).unwrap();

        match client.generate_content("m", "k", &request()).await {
            Err(StoryError::ProviderRejected(message)) => {
                assert_eq!(message, "API key not valid. Please pass a valid API key.")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn falls_back_to_generic_status_message() {
        let (base, seen) = serve(StatusCode::SERVICE_UNAVAILABLE, "upstream down", Duration::ZERO).await;
        let client = GeminiClient::new(&base, Duration::from_secs(5)).unwrap();

        let err = client.generate_content("m", "k", &request()).await.unwrap_err();
        assert_eq!(err.to_string(), "Gemini API request failed with status 503.");
        // No retry on a retryable status
        assert_eq!(seen.lock().unwrap().hits, 1);
    }

    #[tokio::test]
    async fn malformed_success_body_is_format_error() {
        let (base, _) = serve(StatusCode::OK, "<html></html>", Duration::ZERO).await;
        let client = GeminiClient::new(&base, Duration::from_secs(5)).unwrap();

        let err = client.generate_content("m", "k", &request()).await.unwrap_err();
        assert!(matches!(err, StoryError::UnexpectedFormat(_)));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let (base, _) = serve(StatusCode::OK, "{}", Duration::from_secs(5)).await;
        let client = GeminiClient::new(&base, Duration::from_millis(100)).unwrap();

        let err = client.generate_content("m", "k", &request()).await.unwrap_err();
        assert!(matches!(err, StoryError::Timeout));
        assert_eq!(
            err.to_string(),
            "Gemini API request timed out. Please try again."
        );
    }

    #[tokio::test]
    async fn unreachable_provider_is_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            GeminiClient::new(&format!("http://{}/v1beta/models", addr), Duration::from_secs(5))
                .unwrap();

        let err = client.generate_content("m", "k", &request()).await.unwrap_err();
        assert!(matches!(err, StoryError::Transport(_)));
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(GeminiClient::new("not a url", Duration::from_secs(1)).is_err());
        assert!(GeminiClient::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn endpoint_handles_trailing_slash() {
        let client =
            GeminiClient::new("https://example.com/v1beta/models/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint("gemini-3.1-flash-image-preview").unwrap().as_str(),
            "https://example.com/v1beta/models/gemini-3.1-flash-image-preview:generateContent"
        );
    }
}
