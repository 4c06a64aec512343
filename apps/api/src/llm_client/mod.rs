/// Completion Client: the single point of entry for chat completion calls.
///
/// ARCHITECTURAL RULE: stage modules never talk to the completion endpoint
/// directly. Every call goes through `CompletionClient::complete`, which
/// resolves credentials, enforces the per-attempt timeout, retries with
/// backoff, and decodes the payload for the requested output mode.
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Stage;
use crate::secrets::{ConfigError, CredentialResolver};

pub mod prompts;
pub mod retry;
pub mod transport;

pub use retry::BackoffPolicy;
pub use transport::{ChatTransport, HttpTransport};

/// Hard ceiling for a single attempt unless the caller overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Completion failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<LlmError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Ask the endpoint for a single JSON object.
    Json,
    /// Unconstrained free text.
    Text,
}

/// One logical completion call. Built fresh per call and never mutated once
/// handed to the client, so every retry sends the same payload.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub mode: OutputMode,
    pub timeout: Duration,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>, mode: OutputMode) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: 0.0,
            max_tokens: None,
            mode,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Clamped to [0, 1].
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = if temperature.is_finite() {
            temperature.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Zero is ignored; the endpoint rejects it.
    #[cfg(test)]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = (max_tokens > 0).then_some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionResult {
    Text(String),
    StructuredJson(Map<String, Value>),
}

impl CompletionResult {
    /// The JSON object, or `{}` when the call was made in text mode.
    pub fn into_json(self) -> Map<String, Value> {
        match self {
            CompletionResult::StructuredJson(map) => map,
            CompletionResult::Text(text) => parse_json_object(&text),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            CompletionResult::Text(text) => text,
            CompletionResult::StructuredJson(map) => Value::Object(map).to_string(),
        }
    }
}

/// Wraps a `ChatTransport` with credential resolution, timeout, retry and
/// payload decoding.
#[derive(Clone)]
pub struct CompletionClient {
    transport: Arc<dyn ChatTransport>,
    resolver: CredentialResolver,
    backoff: BackoffPolicy,
    timeout: Duration,
}

impl CompletionClient {
    pub fn new(transport: Arc<dyn ChatTransport>, resolver: CredentialResolver) -> Self {
        Self {
            transport,
            resolver,
            backoff: BackoffPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds a request for `stage` using its configured model, default
    /// temperature (unless overridden) and this client's timeout.
    pub fn request_for(
        &self,
        stage: Stage,
        mode: OutputMode,
        messages: Vec<ChatMessage>,
        temperature: Option<f32>,
    ) -> Result<CompletionRequest, LlmError> {
        let model = self.resolver.resolve_model(stage)?;
        Ok(CompletionRequest::new(model, messages, mode)
            .with_temperature(temperature.unwrap_or_else(|| stage.default_temperature()))
            .with_timeout(self.timeout))
    }

    /// Runs one logical call: up to `backoff.max_attempts` tries, sleeping
    /// `backoff.delay(n)` after the n-th failure.
    ///
    /// Credentials are resolved before the first attempt, so a missing key
    /// surfaces as `LlmError::Configuration` without touching the network.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, LlmError> {
        let credentials = self.resolver.resolve()?;

        let mut last_error: Option<LlmError> = None;
        let mut attempt = 0;

        while attempt < self.backoff.max_attempts {
            attempt += 1;

            let outcome =
                tokio::time::timeout(request.timeout, self.transport.send(&credentials, request))
                    .await;

            match outcome {
                Ok(Ok(content)) => {
                    debug!(
                        "Completion succeeded on attempt {attempt}: model={}, mode={:?}",
                        request.model, request.mode
                    );
                    return Ok(decode(request.mode, content));
                }
                Ok(Err(e)) => last_error = Some(e),
                Err(_) => last_error = Some(LlmError::Timeout(request.timeout)),
            }

            if self.backoff.should_retry(attempt) {
                let delay = self.backoff.delay(attempt);
                warn!(
                    "Completion attempt {attempt} failed ({}), retrying after {}ms...",
                    last_error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }

        let last = last_error.unwrap_or_else(|| {
            LlmError::MalformedResponse("retry policy allowed no attempts".to_string())
        });
        warn!("Completion gave up after {attempt} attempts: {last}");
        Err(LlmError::Exhausted {
            attempts: attempt,
            last: Box::new(last),
        })
    }
}

fn decode(mode: OutputMode, content: String) -> CompletionResult {
    match mode {
        OutputMode::Text => CompletionResult::Text(content),
        OutputMode::Json => CompletionResult::StructuredJson(parse_json_object(&content)),
    }
}

/// Parses a JSON object out of model output. Empty, unparseable or non-object
/// payloads become `{}`; schema validation downstream rejects them.
pub fn parse_json_object(content: &str) -> Map<String, Value> {
    let text = strip_json_fences(content);
    if text.is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!("Expected a JSON object, got {}; treating as {{}}", json_kind(&other));
            Map::new()
        }
        Err(e) => {
            warn!("Completion payload is not valid JSON ({e}); treating as {{}}");
            Map::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
