//! Oracle Port - External Inference Boundary
//!
//! One synchronous request/response call carrying a system prompt (which
//! embeds live portfolio state) and a user message, returning raw text.
//! The output is untrusted: it goes through the decision parser even
//! though the prompt asks for clean JSON.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failures of the inference call itself (as opposed to unusable output,
/// which is a `ParseError`). Both degrade to the safe HOLD fallback.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("inference request failed: {0}")]
    Transport(String),
    #[error("inference endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("inference request timed out after {0:?}")]
    Timeout(Duration),
    #[error("inference response carried no completion text")]
    EmptyCompletion,
}

/// Trait for decision oracle providers.
#[async_trait]
pub trait Oracle: Send + Sync + 'static {
    /// Run one inference call; returns the raw completion text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, OracleError>;

    /// Check if the inference endpoint is reachable.
    async fn is_healthy(&self) -> bool;
}
