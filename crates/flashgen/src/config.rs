//! Model client configuration with sensible defaults.
//!
//! [`GeneratorConfig`] captures what the Gemini client needs and converts
//! it into the wire-level [`GenerationConfig`] via
//! [`generation_config`](GeneratorConfig::generation_config).

use std::time::Duration;

use crate::{DEFAULT_MODEL, GEMINI_API_BASE, GenerationConfig};

/// Configuration for a [`GeminiClient`](crate::GeminiClient).
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// API base URL, without a trailing slash. Default: [`GEMINI_API_BASE`].
    pub api_base: String,
    /// Sampling temperature. `None` leaves the model default in place.
    pub temperature: Option<f32>,
    /// Maximum tokens in the response. `None` leaves the model default.
    pub max_output_tokens: Option<u32>,
    /// Per-request timeout. Default: 120 seconds.
    pub request_timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: GEMINI_API_BASE.to_string(),
            temperature: None,
            max_output_tokens: None,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl GeneratorConfig {
    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different API base (e.g. a local mock).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the response length.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full `generateContent` endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// Wire-level generation settings, or `None` if nothing is overridden.
    pub fn generation_config(&self) -> Option<GenerationConfig> {
        if self.temperature.is_none() && self.max_output_tokens.is_none() {
            return None;
        }
        Some(GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        })
    }
}
