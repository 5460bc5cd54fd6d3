
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::answer::CompletionModel;
use crate::config::Config;
use crate::embeddings::Embedder;
use crate::{QaError, Result};

const EXPONENTIAL_BACKOFF_BASE: u32 = 2;
const BACKOFF_UNIT_MS: u64 = 1000;

/// Client for an OpenAI-compatible embeddings and completions API
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: Url,
    api_key: String,
    embedding_model: String,
    completion_model: String,
    temperature: f32,
    max_tokens: u32,
    batch_size: u32,
    agent: ureq::Agent,
    retry_attempts: u32,
    backoff_unit: Duration,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

impl OpenAiClient {
    /// Build a client from the config, reading the API key from the environment
    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            QaError::RemoteService(format!(
                "Authentication failed: environment variable {} is not set",
                config.openai.api_key_env
            ))
        })?;
        Self::new(config, api_key)
    }

    #[inline]
    pub fn new(config: &Config, api_key: String) -> Result<Self> {
        let openai = &config.openai;
        let base_url = openai.api_url()?;

        Ok(Self {
            base_url,
            api_key,
            embedding_model: openai.embedding_model.clone(),
            completion_model: openai.completion_model.clone(),
            temperature: openai.temperature,
            max_tokens: openai.max_tokens,
            batch_size: openai.batch_size,
            agent: build_agent(Duration::from_secs(openai.timeout_seconds)),
            retry_attempts: openai.retry_attempts,
            backoff_unit: Duration::from_millis(BACKOFF_UNIT_MS),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Base delay of the exponential backoff between retries
    #[inline]
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Generate embeddings for multiple texts, batching requests by the configured batch size
    #[inline]
    pub fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(position) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(QaError::Validation(format!(
                "Cannot embed empty text (input {})",
                position
            )));
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks((self.batch_size as usize).max(1)) {
            embeddings.extend(self.generate_embeddings_single_batch(batch)?);
        }

        debug!("Generated {} embeddings total", embeddings.len());
        Ok(embeddings)
    }

    fn generate_embeddings_single_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: texts,
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| QaError::Other(anyhow::anyhow!("Failed to serialize request: {}", e)))?;

        let response_text = self.post("embeddings", &request_json)?;

        let response: EmbeddingResponse = serde_json::from_str(&response_text).map_err(|e| {
            QaError::RemoteService(format!("Failed to parse embedding response: {}", e))
        })?;

        if response.data.len() != texts.len() {
            return Err(QaError::RemoteService(format!(
                "Mismatch between request and response counts: {} vs {}",
                texts.len(),
                response.data.len()
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        let dimension = data.first().map_or(0, |d| d.embedding.len());
        if dimension == 0 || data.iter().any(|d| d.embedding.len() != dimension) {
            return Err(QaError::RemoteService(
                "Embedding response has empty or inconsistent vectors".to_string(),
            ));
        }

        debug!(
            "Generated {} embeddings with {} dimensions",
            data.len(),
            dimension
        );
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    /// Generate a completion for the prompt
    #[inline]
    pub fn generate_completion(&self, prompt: &str) -> Result<String> {
        debug!("Requesting completion (prompt length: {})", prompt.len());

        let request = CompletionRequest {
            model: &self.completion_model,
            prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| QaError::Other(anyhow::anyhow!("Failed to serialize request: {}", e)))?;

        let response_text = self.post("completions", &request_json)?;

        let response: CompletionResponse = serde_json::from_str(&response_text).map_err(|e| {
            QaError::RemoteService(format!("Failed to parse completion response: {}", e))
        })?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            QaError::RemoteService("Completion response contained no choices".to_string())
        })?;

        info!("Completion received ({} chars)", choice.text.len());
        Ok(choice.text)
    }

    fn post(&self, endpoint: &str, body: &str) -> Result<String> {
        let url = self.base_url.join(endpoint).map_err(|e| {
            QaError::Config(format!("Failed to build {} URL: {}", endpoint, e))
        })?;
        let authorization = format!("Bearer {}", self.api_key);

        self.make_request_with_retry(|| {
            self.agent
                .post(url.as_str())
                .header("Content-Type", "application/json")
                .header("Authorization", &authorization)
                .send(body)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
    }

    fn make_request_with_retry<F>(&self, mut request_fn: F) -> Result<String>
    where
        F: FnMut() -> std::result::Result<String, ureq::Error>,
    {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("HTTP request attempt {}/{}", attempt, self.retry_attempts);

            match request_fn() {
                Ok(response_text) => {
                    debug!("Request succeeded on attempt {}", attempt);
                    return Ok(response_text);
                }
                Err(error) => {
                    let should_retry = match &error {
                        ureq::Error::StatusCode(status @ (401 | 403)) => {
                            warn!("Authentication rejected (status {})", status);
                            return Err(QaError::RemoteService(format!(
                                "Authentication failed: HTTP {}",
                                status
                            )));
                        }
                        ureq::Error::StatusCode(429) => {
                            warn!(
                                "Rate limited (status 429), attempt {}/{}",
                                attempt, self.retry_attempts
                            );
                            true
                        }
                        ureq::Error::StatusCode(status) => {
                            if *status >= 500 {
                                warn!(
                                    "Server error (status {}), attempt {}/{}",
                                    status, attempt, self.retry_attempts
                                );
                                true
                            } else {
                                warn!("Client error (status {}), not retrying", status);
                                return Err(QaError::RemoteService(format!(
                                    "Client error: HTTP {}",
                                    status
                                )));
                            }
                        }
                        ureq::Error::ConnectionFailed
                        | ureq::Error::HostNotFound
                        | ureq::Error::Timeout(_)
                        | ureq::Error::Io(_) => {
                            warn!(
                                "Transport error: {}, attempt {}/{}",
                                error, attempt, self.retry_attempts
                            );
                            true
                        }
                        _ => {
                            warn!("Non-retryable error: {}", error);
                            false
                        }
                    };

                    if !should_retry {
                        return Err(QaError::RemoteService(format!(
                            "Non-retryable error: {}",
                            error
                        )));
                    }

                    last_error = Some(match &error {
                        ureq::Error::StatusCode(429) => {
                            QaError::RemoteService("Rate limit exceeded: HTTP 429".to_string())
                        }
                        _ => QaError::RemoteService(format!("Request error: {}", error)),
                    });

                    if attempt < self.retry_attempts {
                        let delay = self.backoff_unit * EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1);
                        debug!("Waiting {:?} before retry", delay);
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        error!("All retry attempts failed for request to {}", self.base_url);

        Err(last_error
            .unwrap_or_else(|| QaError::RemoteService("Request failed after retries".to_string())))
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

impl Embedder for OpenAiClient {
    #[inline]
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.generate_embeddings(texts)
    }
}

impl CompletionModel for OpenAiClient {
    #[inline]
    fn complete(&self, prompt: &str) -> Result<String> {
        self.generate_completion(prompt)
    }
}
