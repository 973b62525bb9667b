//! Google Gemini provider implementation.
//!
//! Uses the Generative Language `generateContent` API directly.
//!
//! Features:
//! - `x-goog-api-key` header authentication
//! - Single-shot generation (no streaming — each query is one call)
//! - Status-code classification into the domain error taxonomy

use async_trait::async_trait;
use rescueline_core::error::GeneratorError;
use rescueline_core::generator::{GenerateRequest, GenerateResponse, Generator, Usage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Google Generative Language API provider.
pub struct GeminiProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the API request body for a generation request.
    fn to_api_body(request: &GenerateRequest) -> GeminiRequestBody {
        GeminiRequestBody {
            contents: vec![GeminiContent {
                role: "user".into(),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }

    /// Convert a Gemini API response to our GenerateResponse.
    fn response_to_generate_response(
        resp: GeminiResponseBody,
        model: &str,
    ) -> Result<GenerateResponse, GeneratorError> {
        let text = resp
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| {
                GeneratorError::MalformedResponse("response contained no candidate text".into())
            })?;

        if text.is_empty() {
            return Err(GeneratorError::MalformedResponse(
                "candidate text was empty".into(),
            ));
        }

        let usage = resp.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(GenerateResponse {
            text,
            model: model.to_string(),
            usage,
        })
    }
}

#[async_trait]
impl Generator for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<GenerateResponse, GeneratorError> {
        if self.api_key.is_empty() {
            return Err(GeneratorError::NotConfigured(
                "No API key configured for Gemini".into(),
            ));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );
        let body = Self::to_api_body(&request);

        debug!(provider = "gemini", model = %request.model, prompt_len = request.prompt.len(),
            "Sending generation request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Timeout(e.to_string())
                } else {
                    GeneratorError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GeneratorError::RateLimited { retry_after_secs: 5 });
        }
        if status == 401 || status == 403 {
            return Err(GeneratorError::AuthenticationFailed(
                "Invalid Gemini API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini API error");
            return Err(GeneratorError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: GeminiResponseBody = response.json().await.map_err(|e| {
            GeneratorError::MalformedResponse(format!("Failed to parse Gemini response: {e}"))
        })?;

        debug!(provider = "gemini", "Received generation response");
        Self::response_to_generate_response(api_resp, &request.model)
    }

    async fn health_check(&self) -> std::result::Result<bool, GeneratorError> {
        // Minimal request to verify the key and endpoint are reachable
        let request = GenerateRequest::new("gemini-1.5-flash", "ping").with_max_output_tokens(1);
        match self.generate(request).await {
            Ok(_) => Ok(true),
            Err(GeneratorError::AuthenticationFailed(_)) => Ok(false),
            Err(GeneratorError::Network(_)) | Err(GeneratorError::Timeout(_)) => Ok(false),
            // Reachable but unhappy (rate limit, odd response) still counts
            Err(_) => Ok(true),
        }
    }
}

// --- Gemini API types ---

#[derive(Debug, Serialize)]
struct GeminiRequestBody {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseBody {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
    #[serde(default, rename = "finishReason")]
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}
