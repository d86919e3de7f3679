//! Gemini Hosted Completion Backend
//!
//! Completion backend for Google's generative API via `:generateContent`.
//! The API key is held in a `SecretString` and never logged or serialized.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{CompletionBackend, CompletionResponse, SamplingOptions};
use crate::config::BackendConfig;
use crate::constants::backend as backend_constants;
use crate::types::{ForgeError, Result};

/// Gemini hosted completion backend with secure API key handling
pub struct GeminiBackend {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .clone()
            .or_else(|| std::env::var(backend_constants::GEMINI_API_KEY_ENV).ok())
            .ok_or_else(|| {
                ForgeError::config(format!(
                    "Gemini API key not found. Set {} env var or provide in config",
                    backend_constants::GEMINI_API_KEY_ENV
                ))
            })?;

        let api_base = config
            .endpoint
            .clone()
            .unwrap_or_else(|| backend_constants::GEMINI_DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| backend_constants::GEMINI_DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ForgeError::backend("gemini", format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model,
            client,
        })
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(
        &self,
        system_instructions: &str,
        prompt: &str,
        sampling: &SamplingOptions,
    ) -> Result<CompletionResponse> {
        info!(
            "Generating with Gemini (model: {}, temperature: {})",
            self.model, sampling.temperature
        );

        let start_time = Instant::now();
        let request = GenerateContentRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: system_instructions.to_string(),
                }],
            },
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: sampling.temperature,
                top_p: sampling.top_p,
                max_output_tokens: sampling.max_output_tokens,
            },
        };
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ForgeError::backend("gemini", format!("request failed: {e}")))?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ForgeError::backend(
                "gemini",
                format!("API error ({status}): {body}"),
            ));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ForgeError::backend("gemini", format!("failed to parse response: {e}")))?;

        let text = body
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ForgeError::backend("gemini", "no content in response"))?;

        debug!(
            elapsed_ms = elapsed.as_millis() as u64,
            chars = text.len(),
            "received Gemini response"
        );

        Ok(CompletionResponse {
            text,
            elapsed_ms: elapsed.as_millis() as u64,
            model: self.model.clone(),
            backend: "gemini".to_string(),
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/v1beta/models/{}", self.api_base, self.model);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("Gemini API is available with model: {}", self.model);
                Ok(true)
            }
            Ok(resp) => {
                warn!("Gemini API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Gemini API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
