//! Ollama Local Completion Backend
//!
//! Completion backend for locally-running Ollama models via `/api/generate`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{CompletionBackend, CompletionResponse, SamplingOptions};
use crate::config::BackendConfig;
use crate::constants::backend as backend_constants;
use crate::types::{ForgeError, Result};

/// Ollama local completion backend
pub struct OllamaBackend {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| backend_constants::OLLAMA_DEFAULT_ENDPOINT.to_string());
        let endpoint = Self::validate_endpoint(&endpoint)?;

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| backend_constants::OLLAMA_DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ForgeError::backend("ollama", format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            model,
            client,
        })
    }

    /// Validate endpoint URL (scheme check, SSRF warning for remote hosts).
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            ForgeError::config(format!("invalid Ollama endpoint URL '{endpoint}': {e}"))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ForgeError::config(format!(
                "Ollama endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "::1")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        // Remove trailing slash for consistency
        let mut result = url.to_string();
        if result.ends_with('/') {
            result.pop();
        }
        Ok(result)
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    async fn complete(
        &self,
        system_instructions: &str,
        prompt: &str,
        sampling: &SamplingOptions,
    ) -> Result<CompletionResponse> {
        info!(
            "Generating with Ollama (model: {}, temperature: {})",
            self.model, sampling.temperature
        );

        let start_time = Instant::now();
        let request = OllamaRequest {
            model: self.model.clone(),
            system: system_instructions.to_string(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: sampling.temperature,
                top_p: sampling.top_p,
                num_predict: sampling.max_output_tokens,
            },
        };
        let url = format!("{}/api/generate", self.endpoint);

        debug!("Sending request to Ollama API");

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ForgeError::backend(
                        "ollama",
                        format!(
                            "failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                            self.endpoint
                        ),
                    )
                } else {
                    ForgeError::backend("ollama", format!("request failed: {e}"))
                }
            })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ForgeError::backend(
                "ollama",
                format!("API error ({status}): {body}"),
            ));
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ForgeError::backend("ollama", format!("failed to parse response: {e}")))?;

        debug!(
            elapsed_ms = elapsed.as_millis() as u64,
            chars = body.response.len(),
            "received Ollama response"
        );

        Ok(CompletionResponse {
            text: body.response,
            elapsed_ms: elapsed.as_millis() as u64,
            model: self.model.clone(),
            backend: "ollama".to_string(),
        })
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.endpoint);

        let response = self.client.get(&url).send().await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                if let Ok(tags) = resp.json::<OllamaTagsResponse>().await {
                    let model_available = tags.models.iter().any(|m| {
                        m.name == self.model
                            || m.name.starts_with(&self.model.replace(":latest", ""))
                    });

                    if model_available {
                        info!("Ollama is available with model: {}", self.model);
                        Ok(true)
                    } else {
                        warn!(
                            "Ollama is running but model '{}' not found. Pull with: ollama pull {}",
                            self.model, self.model
                        );
                        Ok(false)
                    }
                } else {
                    info!("Ollama is available");
                    Ok(true)
                }
            }
            Ok(resp) => {
                warn!("Ollama API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Ollama not available: {}. Start with: ollama serve", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    system: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}
