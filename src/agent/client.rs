//! Generation client: credential rotation and retry on top of a
//! [`ChatProvider`].
//!
//! One client exists per model role (decision, answer); both share the
//! same [`KeyPool`]. Each attempt draws a fresh key, so a rate-limited
//! credential is sidelined for every subsequent attempt and caller.

use std::sync::Arc;
use std::time::Duration;

use crate::agent::keypool::{KeyPool, mask_key};
use crate::agent::message::{ChatMessage, ChatRequest};
use crate::agent::provider::ChatProvider;
use crate::error::{AgentError, Result};

/// Retrying chat client bound to one model.
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn ChatProvider>,
    pool: Arc<KeyPool>,
    model: String,
    max_retries: u32,
    rate_limit_delay: Duration,
    retry_delay: Duration,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl GenerationClient {
    /// Creates a client for `model` over the given provider and pool.
    #[must_use]
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        pool: Arc<KeyPool>,
        model: impl Into<String>,
        max_retries: u32,
        rate_limit_delay: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            provider,
            pool,
            model: model.into(),
            max_retries,
            rate_limit_delay,
            retry_delay,
        }
    }

    /// The model this client generates with.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `messages` to the model and returns the assistant reply.
    ///
    /// Rate-limited keys are disabled in the shared pool and the call
    /// moves on to the next key after a short delay; other failures
    /// retry the same rotation after a longer delay.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::KeysExhausted`] when no usable key remains,
    /// or [`AgentError::MaxRetries`] when the retry budget is spent.
    pub async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens,
            temperature,
        };

        let mut last_error = String::new();
        for attempt in 0..self.max_retries {
            let Some(key) = self.pool.next() else {
                return Err(AgentError::KeysExhausted {
                    cooldown_secs: self.pool.cooldown().as_secs(),
                });
            };

            match self.provider.chat(&key, &request).await {
                Ok(content) => return Ok(content),
                Err(err) => {
                    let rate_limited = err.is_rate_limit();
                    tracing::warn!(
                        model = %self.model,
                        key = %mask_key(&key),
                        attempt = attempt + 1,
                        rate_limited,
                        error = %err,
                        "generation attempt failed"
                    );
                    last_error = err.to_string();
                    if rate_limited {
                        let status = match &err {
                            AgentError::ApiRequest {
                                status: Some(code), ..
                            } => *code,
                            _ => 429,
                        };
                        self.pool.mark_failed(&key, status);
                        tokio::time::sleep(self.rate_limit_delay).await;
                    } else if attempt + 1 < self.max_retries {
                        // Escalate: 1x, 2x, 3x the base delay.
                        tokio::time::sleep(self.retry_delay * (attempt + 1)).await;
                    }
                }
            }
        }

        Err(AgentError::MaxRetries {
            message: last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted provider: pops one canned outcome per call.
    struct ScriptedProvider {
        script: Mutex<Vec<Result<String>>>,
        keys_seen: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<String>>) -> Self {
            Self {
                script: Mutex::new(script),
                keys_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn chat(&self, api_key: &str, _request: &ChatRequest) -> Result<String> {
            self.keys_seen
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(api_key.to_string());
            let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
            if script.is_empty() {
                Ok("fallthrough".to_string())
            } else {
                script.remove(0)
            }
        }
    }

    fn client(provider: Arc<dyn ChatProvider>, keys: &[&str], max_retries: u32) -> GenerationClient {
        let pool = Arc::new(KeyPool::new(
            keys.iter().map(ToString::to_string).collect(),
            Duration::from_secs(300),
        ));
        GenerationClient::new(
            provider,
            pool,
            "test-model",
            max_retries,
            Duration::ZERO,
            Duration::ZERO,
        )
    }

    fn rate_limit_err() -> AgentError {
        AgentError::ApiRequest {
            message: "rate limit".to_string(),
            status: Some(429),
        }
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("answer".to_string())]));
        let client = client(provider.clone(), &["k1", "k2"], 3);
        let reply = client
            .generate(vec![ChatMessage::user("q")], 100, 0.7)
            .await
            .unwrap_or_default();
        assert_eq!(reply, "answer");
        let seen = provider.keys_seen.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(seen.as_slice(), ["k1"]);
    }

    #[tokio::test]
    async fn test_rate_limit_rotates_to_next_key() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(rate_limit_err()),
            Ok("answer".to_string()),
        ]));
        let client = client(provider.clone(), &["k1", "k2"], 3);
        let reply = client
            .generate(vec![ChatMessage::user("q")], 100, 0.7)
            .await
            .unwrap_or_default();
        assert_eq!(reply, "answer");
        let seen = provider.keys_seen.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(seen.as_slice(), ["k1", "k2"]);
    }

    #[tokio::test]
    async fn test_all_keys_exhausted() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(rate_limit_err()),
            Err(rate_limit_err()),
        ]));
        let client = client(provider, &["k1", "k2"], 5);
        let err = client
            .generate(vec![ChatMessage::user("q")], 100, 0.7)
            .await;
        assert!(matches!(err, Err(AgentError::KeysExhausted { .. })));
    }

    #[tokio::test]
    async fn test_generic_errors_spend_retry_budget() {
        let generic = || AgentError::ApiRequest {
            message: "connection reset".to_string(),
            status: Some(500),
        };
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(generic()),
            Err(generic()),
            Err(generic()),
        ]));
        let client = client(provider.clone(), &["k1"], 3);
        let err = client
            .generate(vec![ChatMessage::user("q")], 100, 0.7)
            .await;
        assert!(matches!(err, Err(AgentError::MaxRetries { .. })));
        // 500s do not disable the key; every attempt reuses it.
        let seen = provider.keys_seen.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(seen.as_slice(), ["k1", "k1", "k1"]);
    }

    #[tokio::test]
    async fn test_empty_pool_fails_fast() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let client = client(provider, &[], 3);
        let err = client
            .generate(vec![ChatMessage::user("q")], 100, 0.7)
            .await;
        assert!(matches!(err, Err(AgentError::KeysExhausted { .. })));
    }
}
