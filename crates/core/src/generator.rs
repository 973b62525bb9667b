//! Generator trait — the abstraction over the generative-text service.
//!
//! A Generator knows how to turn a fully composed prompt into answer text.
//! Exactly one call per query: no streaming, no retries, no caching. The
//! pipeline converts every failure into a fixed fallback answer, so
//! implementations only need to classify errors, not recover from them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;

/// A single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The model to use (e.g., "gemini-1.5-flash")
    pub model: String,

    /// The fully composed prompt text
    pub prompt: String,

    /// Temperature (0.0 = deterministic, higher = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.4
}

impl GenerateRequest {
    /// Create a request with the default sampling configuration.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: default_temperature(),
            max_output_tokens: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output token cap.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
}

/// A complete response from the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated answer text
    pub text: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics, when the provider reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Generator trait.
///
/// The answering pipeline calls `generate()` without knowing which backend
/// is configured — pure polymorphism, same as swapping a mock in tests.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this generator (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a prompt and get a complete answer.
    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<GenerateResponse, GeneratorError>;

    /// Health check — can we reach the service?
    async fn health_check(&self) -> std::result::Result<bool, GeneratorError> {
        Ok(true)
    }
}
