//! Flashcard generation on top of the Gemini `generateContent` API.
//!
//! `flashgen` turns a free-text topic into a deck of term/definition
//! flashcards. The model is asked for `Term: Definition` lines, the reply is
//! parsed line by line, and the result is handed to a [`Renderer`] together
//! with a single status message.
//!
//! # Getting started
//!
//! ```ignore
//! use std::sync::{Arc, Mutex};
//! use flashgen::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let client = GeminiClient::from_env(GeneratorConfig::default())?;
//!     let state = Arc::new(Mutex::new(DeckState::default()));
//!     let renderer = StateRenderer::new(state.clone());
//!
//!     match run_cycle(&client, &renderer, "Ancient Rome").await {
//!         Ok(cards) => {
//!             for card in &cards {
//!                 println!("{}: {}", card.term(), card.definition());
//!             }
//!         }
//!         Err(e) => eprintln!("{e}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`prompt`] | Topic validation and the flashcard instruction prompt |
//! | [`card`] | [`Flashcard`](card::Flashcard) and the `Term: Definition` parser |
//! | [`cycle`] | [`run_cycle`](cycle::run_cycle), [`ContentGenerator`](cycle::ContentGenerator) and [`Renderer`](cycle::Renderer) seams |
//! | [`ui`] | [`DeckState`](ui::DeckState) and the state-backed renderer |
//! | [`config`] | [`GeneratorConfig`](config::GeneratorConfig) for the model client |
//! | [`error`] | [`GenerationError`](error::GenerationError) taxonomy |

pub mod card;
pub mod config;
pub mod cycle;
pub mod error;
pub mod prelude;
pub mod prompt;
pub mod ui;

pub use card::{Flashcard, parse_line, parse_response};
pub use config::GeneratorConfig;
pub use cycle::{ContentGenerator, GenerateFuture, Renderer, Status, run_cycle};
pub use error::GenerationError;

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace};

// ── Constants ──────────────────────────────────────────────────────

/// Base URL of the Gemini REST API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for flashcard generation.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "API_KEY";

// ── Request types ──────────────────────────────────────────────────

/// `generateContent` request body. Unused optional fields are omitted.
#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// A single-turn request carrying one user prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            ..Default::default()
        }
    }
}

/// A turn in the conversation: a role and its parts.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

/// One piece of a [`Content`]. Only text parts are used here.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Sampling parameters.
#[derive(Serialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawGenerateResponse {
    candidates: Option<Vec<RawCandidate>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawCandidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Deserialize, Debug)]
struct RawErrorEnvelope {
    error: ApiErrorResponse,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
}

/// Clean return type of a generate call.
#[derive(Debug, Clone, Default)]
pub struct GeneratedText {
    /// Text of the first candidate; empty when the model returned nothing.
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageMetadata>,
}

impl GeneratedText {
    /// A bare text result, for generators that have no metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Pull the service's message out of an error body, falling back to the
/// raw body text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<RawErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: Option<String>,
    pub(crate) config: GeneratorConfig,
}

impl GeminiClient {
    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>, config: GeneratorConfig) -> Result<Self, String> {
        Self::build(Some(api_key.into()), config)
    }

    /// Create a client reading the key from [`API_KEY_ENV`].
    ///
    /// A missing key is not an error here: every call will fail with a
    /// message saying so, which the cycle reports to the user.
    pub fn from_env(config: GeneratorConfig) -> Result<Self, String> {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        Self::build(api_key, config)
    }

    fn build(api_key: Option<String>, config: GeneratorConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("flashgen/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Whether an API key was supplied.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The configured model.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a `generateContent` request.
    pub async fn generate_content(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<GeneratedText, String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| format!("{API_KEY_ENV} environment variable is not set"))?;

        debug!(
            "LLM request: model={}, contents={}",
            self.config.model,
            body.contents.len()
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(format!("Gemini API HTTP {status}: {}", error_message(&text)));
        }

        let parsed: RawGenerateResponse =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;

        if let Some(err) = parsed.error {
            return Err(format!("Gemini API error: {}", err.message));
        }

        if let Some(ref usage) = parsed.usage_metadata {
            debug!(
                "Token usage: prompt={}, candidates={}, total={}",
                usage.prompt_token_count.unwrap_or(0),
                usage.candidates_token_count.unwrap_or(0),
                usage.total_token_count.unwrap_or(0),
            );
        }

        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            debug!("Prompt blocked: {reason}");
        }

        let candidate = parsed.candidates.and_then(|c| c.into_iter().next());
        let (text, finish_reason) = match candidate {
            Some(c) => (
                c.content.map(|content| content.text()).unwrap_or_default(),
                c.finish_reason,
            ),
            None => (String::new(), None),
        };
        debug!("LLM output: {} chars text", text.len());

        Ok(GeneratedText {
            text,
            finish_reason,
            usage: parsed.usage_metadata,
        })
    }
}

impl ContentGenerator for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> GenerateFuture<'a> {
        Box::pin(async move {
            let mut body = GenerateContentRequest::from_prompt(prompt);
            body.generation_config = self.config.generation_config();
            self.generate_content(&body).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn request_serializes_camel_case_and_skips_none() {
        let mut req = GenerateContentRequest::from_prompt("hi");
        req.generation_config = Some(GenerationConfig {
            max_output_tokens: Some(100),
            ..Default::default()
        });
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 100);
        assert!(json["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "A: B\n"}, {"text": "C: D"}]},
                 "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
        }"#;
        let parsed: RawGenerateResponse = serde_json::from_str(body).unwrap();
        let first = parsed.candidates.unwrap().into_iter().next().unwrap();
        assert_eq!(first.content.unwrap().text(), "A: B\nC: D");
        assert_eq!(first.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(parsed.usage_metadata.unwrap().total_token_count, Some(15));
    }

    #[test]
    fn candidate_without_parts_has_empty_text() {
        let body = r#"{"candidates": [{"content": {"role": "model"}, "finishReason": "SAFETY"}]}"#;
        let parsed: RawGenerateResponse = serde_json::from_str(body).unwrap();
        let first = parsed.candidates.unwrap().into_iter().next().unwrap();
        assert_eq!(first.content.unwrap().text(), "");
    }

    #[test]
    fn error_message_prefers_service_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(
            error_message(body),
            "API key not valid. Please pass a valid API key."
        );
        assert_eq!(error_message("  upstream down \n"), "upstream down");
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let client = GeminiClient::build(None, GeneratorConfig::default()).unwrap();
        assert!(!client.has_api_key());
        let err = client.generate("prompt").await.unwrap_err();
        assert_eq!(err, "API_KEY environment variable is not set");
    }

    // ── HTTP round trips against a mock Gemini endpoint ──

    const GENERATE_PATH: &str = "/models/gemini-2.0-flash-exp:generateContent";

    fn mock_client(server: &MockServer, config: GeneratorConfig) -> GeminiClient {
        GeminiClient::new("test-key", config.with_api_base(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn generate_posts_prompt_with_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "Make cards"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hello: Hola\n"}, {"text": "Goodbye: Adiós"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 8, "totalTokenCount": 20}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server, GeneratorConfig::default());
        let out = client.generate("Make cards").await.unwrap();
        assert_eq!(out.text, "Hello: Hola\nGoodbye: Adiós");
        assert_eq!(out.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(out.usage.unwrap().total_token_count, Some(20));
    }

    #[tokio::test]
    async fn generation_settings_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": {"temperature": 0.5, "maxOutputTokens": 256}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "A: B"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = GeneratorConfig::default()
            .with_model("gemini-2.5-flash")
            .with_temperature(0.5)
            .with_max_output_tokens(256);
        let out = mock_client(&server, config).generate("p").await.unwrap();
        assert_eq!(out.text, "A: B");
    }

    #[tokio::test]
    async fn http_error_carries_status_and_service_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "permission denied", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let err = mock_client(&server, GeneratorConfig::default())
            .generate("p")
            .await
            .unwrap_err();
        assert_eq!(err, "Gemini API HTTP 403 Forbidden: permission denied");
    }

    #[tokio::test]
    async fn http_error_with_plain_body_uses_body_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable\n"))
            .mount(&server)
            .await;

        let err = mock_client(&server, GeneratorConfig::default())
            .generate("p")
            .await
            .unwrap_err();
        assert_eq!(err, "Gemini API HTTP 503 Service Unavailable: upstream unavailable");
    }

    #[tokio::test]
    async fn success_status_with_error_object_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"message": "quota exhausted"}
            })))
            .mount(&server)
            .await;

        let err = mock_client(&server, GeneratorConfig::default())
            .generate("p")
            .await
            .unwrap_err();
        assert_eq!(err, "Gemini API error: quota exhausted");
    }

    #[tokio::test]
    async fn unparseable_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = mock_client(&server, GeneratorConfig::default())
            .generate("p")
            .await
            .unwrap_err();
        assert!(err.starts_with("failed to parse response:"), "{err}");
    }

    #[tokio::test]
    async fn no_candidates_yields_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let out = mock_client(&server, GeneratorConfig::default())
            .generate("p")
            .await
            .unwrap();
        assert_eq!(out.text, "");
        assert!(out.finish_reason.is_none());
    }
}
