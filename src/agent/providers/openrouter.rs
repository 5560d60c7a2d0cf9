//! OpenRouter chat-completions provider.
//!
//! Speaks the OpenAI-compatible `/chat/completions` dialect over HTTPS.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agent::message::{ChatMessage, ChatRequest};
use crate::agent::provider::ChatProvider;
use crate::error::{AgentError, Result};

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenRouter-compatible chat backend.
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OpenRouterProvider {
    /// Creates a provider against `base_url` with the given request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Orchestration`] if the HTTP client cannot
    /// be constructed.
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Orchestration {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ChatProvider for OpenRouterProvider {
    async fn chat(&self, api_key: &str, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = CompletionRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            // Attribution headers OpenRouter uses for ranking/abuse checks.
            .header("HTTP-Referer", "https://github.com/agri-agent")
            .header("X-Title", "agri-agent")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ApiRequest {
                message: format!("request to {url} failed: {e}"),
                status: e.status().map(|s| s.as_u16()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::ApiRequest {
                message: format!("upstream returned {status}: {text}"),
                status: Some(status.as_u16()),
            });
        }

        let text = response.text().await.map_err(|e| AgentError::ApiRequest {
            message: format!("failed to read response body: {e}"),
            status: Some(status.as_u16()),
        })?;

        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|e| AgentError::ResponseParse {
                message: format!("malformed completion response: {e}"),
                content: text.clone(),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(AgentError::ResponseParse {
                message: "completion response carried no choices".to_string(),
                content: text,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Use drip irrigation."}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(json).unwrap_or_else(|_| {
            CompletionResponse {
                choices: Vec::new(),
            }
        });
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Use drip irrigation.")
        );
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![ChatMessage::user("q")];
        let body = CompletionRequest {
            model: "mistralai/mistral-7b-instruct-v0.2",
            messages: &messages,
            max_tokens: 200,
            temperature: 0.3,
        };
        let json = serde_json::to_string(&body).unwrap_or_default();
        assert!(json.contains("\"model\":\"mistralai/mistral-7b-instruct-v0.2\""));
        assert!(json.contains("\"max_tokens\":200"));
    }
}
