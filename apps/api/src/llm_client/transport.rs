//! Wire transport for OpenAI-compatible chat completion endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ChatMessage, CompletionRequest, LlmError, OutputMode};
use crate::secrets::Credentials;

/// One round trip to the completion endpoint, returning the raw message
/// content. Retries, timeouts and decoding live in `CompletionClient`.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(
        &self,
        credentials: &Credentials,
        request: &CompletionRequest,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn build_body(request: &CompletionRequest) -> ChatCompletionBody<'_> {
    ChatCompletionBody {
        model: &request.model,
        messages: &request.messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        response_format: match request.mode {
            OutputMode::Json => Some(ResponseFormat {
                kind: "json_object",
            }),
            OutputMode::Text => None,
        },
    }
}

/// reqwest-backed transport: `POST {base_url}/chat/completions` with bearer auth.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
        })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(
        &self,
        credentials: &Credentials,
        request: &CompletionRequest,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", credentials.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&credentials.api_key)
            .timeout(request.timeout)
            .json(&build_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Completion API returned {status}: {message}");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::MalformedResponse("response has no choices".to_string()))?;

        let content = choice.message.content.unwrap_or_default();
        debug!(
            "Completion from {} returned {} chars",
            request.model,
            content.len()
        );
        Ok(content)
    }
}
