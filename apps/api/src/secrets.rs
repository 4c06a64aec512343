//! Credential Resolver: API key, base URL and per-stage model names.
//!
//! Every lookup walks the same ladder: secrets file, then process environment,
//! then (where one exists) a hard-coded default. Nothing is cached; the
//! completion client resolves afresh on each call.

#[cfg(test)]
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::models::Stage;

pub const API_KEY: &str = "OPENAI_API_KEY";
pub const BASE_URL: &str = "OPENAI_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set in the secrets file or the environment")]
    MissingApiKey,

    #[error("Failed to read secrets file {path:?}: {source}")]
    SecretsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse secrets file {path:?}: {source}")]
    SecretsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A layer in the configuration ladder.
pub trait SecretSource: Send + Sync {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

/// Reads the process environment.
pub struct EnvSource;

impl SecretSource for EnvSource {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(std::env::var(key).ok())
    }

    fn name(&self) -> &'static str {
        "env"
    }
}

/// Flat TOML table of string values, e.g. `OPENAI_API_KEY = "sk-..."`.
///
/// A missing file is an empty store; a file that exists but cannot be read or
/// parsed is an error.
pub struct SecretsFile {
    path: PathBuf,
}

impl SecretsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Option<toml::Table>, ConfigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::SecretsRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        toml::from_str::<toml::Table>(&content)
            .map(Some)
            .map_err(|source| ConfigError::SecretsParse {
                path: self.path.clone(),
                source,
            })
    }
}

impl SecretSource for SecretsFile {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.load()?.and_then(|table| {
            table
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        }))
    }

    fn name(&self) -> &'static str {
        "secrets_file"
    }
}

/// In-memory source for wiring fixed values in tests.
#[cfg(test)]
#[derive(Default)]
pub struct StaticSource(pub HashMap<String, String>);

#[cfg(test)]
impl StaticSource {
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }
}

#[cfg(test)]
impl SecretSource for StaticSource {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.0.get(key).cloned())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Bearer credential and endpoint root for the completion API.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub base_url: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Walks the layered sources in precedence order.
#[derive(Clone)]
pub struct CredentialResolver {
    layers: Vec<Arc<dyn SecretSource>>,
}

impl CredentialResolver {
    /// Highest-precedence layer first.
    pub fn new(layers: Vec<Arc<dyn SecretSource>>) -> Self {
        Self { layers }
    }

    /// Secrets file first, then the environment.
    pub fn from_secrets_file(path: impl Into<PathBuf>) -> Self {
        Self::new(vec![
            Arc::new(SecretsFile::new(path)),
            Arc::new(EnvSource),
        ])
    }

    /// Resolves API key and base URL. Fails before any network activity when
    /// no key is configured anywhere.
    pub fn resolve(&self) -> Result<Credentials, ConfigError> {
        let api_key = self.lookup(API_KEY)?.ok_or(ConfigError::MissingApiKey)?;
        let base_url = self
            .lookup(BASE_URL)?
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Credentials {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Model identifier for `stage`. The salary estimator inherits the
    /// analyzer's configured model before falling back to its own default.
    pub fn resolve_model(&self, stage: Stage) -> Result<String, ConfigError> {
        if let Some(model) = self.lookup(stage.model_key())? {
            return Ok(model);
        }
        if stage == Stage::SalaryEstimator {
            if let Some(model) = self.lookup(Stage::Analyzer.model_key())? {
                return Ok(model);
            }
        }
        Ok(stage.default_model().to_string())
    }

    /// First non-blank value across the layers.
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        for layer in &self.layers {
            if let Some(value) = layer.lookup(key)? {
                let value = value.trim();
                if !value.is_empty() {
                    debug!("Resolved {key} from {}", layer.name());
                    return Ok(Some(value.to_string()));
                }
            }
        }
        Ok(None)
    }
}
