//! Inference Client - OpenAI-compatible Chat Completions
//!
//! Wraps reqwest with timeouts and bounded retries (exponential backoff on
//! 429/5xx/transport errors) for the decision oracle. Runs at low
//! temperature to reduce output variance; the decision parser still treats
//! every reply as untrusted.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::ports::oracle::{Oracle, OracleError};

/// Configuration for the inference HTTP client.
#[derive(Debug, Clone)]
pub struct InferenceClientConfig {
    /// Base URL of the OpenAI-compatible API (no trailing slash).
    pub base_url: String,
    /// Model identifier passed through to the endpoint.
    pub model: String,
    /// Sampling temperature; low for stable structured output.
    pub temperature: f32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient errors.
    pub max_retries: u32,
    /// Base delay between retries (exponential backoff).
    pub retry_base_delay: Duration,
}

impl Default for InferenceClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(250),
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// HTTP client implementing the `Oracle` port.
pub struct InferenceClient {
    http: Client,
    api_key: String,
    config: InferenceClientConfig,
}

impl InferenceClient {
    /// Create a client with an explicit API key.
    pub fn new(api_key: String, config: InferenceClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(2)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    /// Create a client reading the API key from `ORACLE_API_KEY`
    /// (falling back to `OPENAI_API_KEY`).
    pub fn from_env(config: InferenceClientConfig) -> Result<Self> {
        let api_key = std::env::var("ORACLE_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .context("ORACLE_API_KEY or OPENAI_API_KEY must be set")?;
        Self::new(api_key, config)
    }

    async fn send_once(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(self.config.timeout)
                } else {
                    OracleError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(OracleError::EmptyCompletion)
    }

    fn is_retryable(error: &OracleError) -> bool {
        match error {
            OracleError::Transport(_) | OracleError::Timeout(_) => true,
            OracleError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            OracleError::EmptyCompletion => false,
        }
    }
}

#[async_trait]
impl Oracle for InferenceClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, OracleError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis(), "Retrying inference");
                sleep(delay).await;
            }

            match self.send_once(system_prompt, user_message).await {
                Ok(text) => return Ok(text),
                Err(e) if Self::is_retryable(&e) => {
                    warn!(error = %e, attempt, "Inference attempt failed");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| OracleError::Transport("max retries exceeded".to_string())))
    }

    async fn is_healthy(&self) -> bool {
        let url = format!("{}/models", self.config.base_url);
        self.http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
