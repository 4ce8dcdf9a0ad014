use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::llm_client::{
    anthropic, gemini, CompletionOptions, DEFAULT_BACKOFF_BASE_MS, DEFAULT_MAX_RETRIES,
    DEFAULT_TIMEOUT_MS,
};

/// Thirty days.
const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Which completion backend serves every generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Anthropic,
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => gemini::DEFAULT_MODEL,
            ProviderKind::Anthropic => anthropic::DEFAULT_MODEL,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => bail!("LLM_PROVIDER must be 'gemini' or 'anthropic', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub port: u16,
    pub rust_log: String,
    pub session_ttl_secs: u64,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider: ProviderKind = lookup("LLM_PROVIDER")
            .unwrap_or_else(|| "gemini".to_string())
            .parse()?;

        Ok(Config {
            provider,
            api_key: lookup("LLM_API_KEY").with_context(|| {
                "Required environment variable 'LLM_API_KEY' is not set".to_string()
            })?,
            model: lookup("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            timeout_ms: parse_or(&lookup, "LLM_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            max_retries: parse_or(&lookup, "LLM_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            backoff_base_ms: parse_or(&lookup, "LLM_BACKOFF_BASE_MS", DEFAULT_BACKOFF_BASE_MS)?,
            port: parse_or(&lookup, "PORT", 8080u16)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            session_ttl_secs: match parse_or(&lookup, "SESSION_TTL_SECS", 7_200u64)? {
                secs if secs > MAX_SESSION_TTL_SECS => {
                    bail!("SESSION_TTL_SECS must be at most {MAX_SESSION_TTL_SECS}, got {secs}")
                }
                secs => secs,
            },
            max_sessions: match parse_or(&lookup, "MAX_SESSIONS", 1_000usize)? {
                0 => bail!("MAX_SESSIONS must be at least 1"),
                n => n,
            },
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs as i64)
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.model.clone(),
            timeout_ms: self.timeout_ms,
            max_retries: self.max_retries,
            backoff_base_ms: self.backoff_base_ms,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
