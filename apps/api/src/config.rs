use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default per-attempt ceiling for a completion call.
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

/// Sessions older than this are dropped by the background sweep.
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Process-level configuration loaded from environment variables.
///
/// Credentials and model names live in `secrets::CredentialResolver`, which
/// re-reads them on every completion call.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub secrets_file: PathBuf,
    pub llm_timeout: Duration,
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_timeout_secs = match optional_env("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };

        let session_ttl_secs = match optional_env("SESSION_TTL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("SESSION_TTL_SECS must be a whole number of seconds")?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        Ok(Config {
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            secrets_file: optional_env("SECRETS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("secrets.toml")),
            llm_timeout: Duration::from_secs(llm_timeout_secs.max(1)),
            session_ttl: Duration::from_secs(session_ttl_secs.max(60)),
        })
    }
}

/// Reads an env var, treating an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
