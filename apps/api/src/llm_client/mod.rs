/// Completion Client: the single seam between MockMate and a text-completion provider.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Every completion goes through `CompletionClient`, which owns timeout and
/// retry policy so all providers behave the same way.
///
/// A provider only has to accept prompt text plus a model identifier and
/// return text. Nothing here assumes a specific provider's wire shape.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod anthropic;
pub mod gemini;
#[cfg(test)]
pub mod scripted;

pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Failure kinds surfaced by a completion call.
///
/// `Unauthorized` and `MalformedResponse` are fatal. `RateLimited`,
/// `Transient` and `Timeout` are retried inside `CompletionClient::complete`
/// and only reach callers once the retry budget is spent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("provider rejected the credential: {0}")]
    Unauthorized(String),

    #[error("provider rate limit reached: {0}")]
    RateLimited(String),

    #[error("transient provider failure: {0}")]
    Transient(String),

    #[error("completion timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("provider returned no usable text: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited(_)
                | CompletionError::Transient(_)
                | CompletionError::Timeout { .. }
        )
    }

    /// Stable snake_case name of the failure kind, used in logs and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Unauthorized(_) => "unauthorized",
            CompletionError::RateLimited(_) => "rate_limited",
            CompletionError::Transient(_) => "transient",
            CompletionError::Timeout { .. } => "timeout",
            CompletionError::MalformedResponse(_) => "malformed_response",
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CompletionError::MalformedResponse(e.to_string())
        } else {
            CompletionError::Transient(e.to_string())
        }
    }
}

/// Maps a non-success provider status to a failure kind.
pub(crate) fn classify_status(status: StatusCode, message: String) -> CompletionError {
    match status.as_u16() {
        401 | 403 => CompletionError::Unauthorized(message),
        429 => CompletionError::RateLimited(message),
        408 => CompletionError::Transient(message),
        s if s >= 500 => CompletionError::Transient(message),
        _ => CompletionError::MalformedResponse(format!("status {status}: {message}")),
    }
}

/// A text-in/text-out completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name for logs ("gemini", "anthropic", ...).
    fn name(&self) -> &'static str;

    /// Performs exactly one provider call. No retries here.
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, CompletionError>;
}

/// Per-call policy for `CompletionClient::complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub model: String,
    /// Budget for a single attempt, not for the whole retry loop.
    pub timeout_ms: u64,
    /// Extra attempts after the first one.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

#[cfg(test)]
impl CompletionOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        }
    }
}

/// The single completion client used by every feature in MockMate.
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn CompletionProvider>,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Sends `prompt` to the provider and returns the raw text.
    /// Each attempt is bounded by `timeout_ms`; retryable failures back off
    /// exponentially (base, 2x base, 4x base, ...) up to `max_retries` times.
    pub async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let per_attempt = Duration::from_millis(options.timeout_ms);
        let mut retries = 0;

        loop {
            let outcome =
                match tokio::time::timeout(per_attempt, self.provider.complete(prompt, &options.model))
                    .await
                {
                    Ok(Ok(text)) if text.trim().is_empty() => Err(CompletionError::MalformedResponse(
                        "provider returned an empty body".to_string(),
                    )),
                    Ok(result) => result,
                    Err(_) => Err(CompletionError::Timeout {
                        timeout_ms: options.timeout_ms,
                    }),
                };

            match outcome {
                Ok(text) => {
                    debug!(
                        "{} completion succeeded after {} retries ({} chars)",
                        self.provider.name(),
                        retries,
                        text.len()
                    );
                    return Ok(text);
                }
                Err(e) if e.is_retryable() && retries < options.max_retries => {
                    retries += 1;
                    let delay = backoff_delay(options.backoff_base_ms, retries);
                    warn!(
                        "{} completion attempt {} failed ({}), retrying after {}ms...",
                        self.provider.name(),
                        retries,
                        e.kind(),
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Delay before retry number `retry` (1-based).
fn backoff_delay(base_ms: u64, retry: u32) -> Duration {
    let factor = 1u64 << retry.saturating_sub(1).min(16);
    Duration::from_millis(base_ms.saturating_mul(factor))
}
