//! Tool selection: decision LLM with a keyword fallback.
//!
//! The decision model is asked to emit a small JSON object choosing
//! evidence sources. Model output is messy in practice (prose around the
//! JSON, markdown fences, truncation), so the first brace-delimited
//! fragment is extracted by regex and parsed leniently. Any failure
//! along that path falls back to keyword matching; selection itself
//! never fails.

use regex::Regex;

use crate::agent::client::GenerationClient;
use crate::agent::decision::ToolDecision;
use crate::agent::message::ChatMessage;
use crate::agent::prompt;

/// Keyword lists driving the fallback selection. Matching is
/// case-insensitive substring containment.
#[derive(Debug, Clone)]
pub struct FallbackKeywords {
    /// Triggers the weather lookup.
    pub weather: Vec<String>,
    /// Triggers the commodity price lookup.
    pub market: Vec<String>,
    /// Triggers water/irrigation facts.
    pub water: Vec<String>,
    /// Triggers the pest advisory.
    pub pest: Vec<String>,
}

impl Default for FallbackKeywords {
    fn default() -> Self {
        let list = |words: &[&str]| words.iter().map(ToString::to_string).collect();
        Self {
            weather: list(&[
                "weather", "temperature", "rain", "climate", "humidity", "wind",
            ]),
            market: list(&["price", "market", "cost", "rate", "selling", "commodity"]),
            water: list(&["water", "irrigation", "moisture", "rainfall", "groundwater"]),
            pest: list(&["pest", "disease", "insect", "fungal", "virus", "infection"]),
        }
    }
}

/// Selects evidence sources for a question.
pub struct ToolSelector {
    client: GenerationClient,
    json_fragment: Regex,
    keywords: FallbackKeywords,
}

impl std::fmt::Debug for ToolSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSelector")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl ToolSelector {
    /// Creates a selector over the decision-model client.
    #[must_use]
    pub fn new(client: GenerationClient, keywords: FallbackKeywords) -> Self {
        Self {
            client,
            // First brace-delimited fragment, non-greedy, across lines.
            // Compiled from a literal, so construction cannot fail.
            json_fragment: Regex::new(r"(?s)\{.*?\}").unwrap_or_else(|_| unreachable!()),
            keywords,
        }
    }

    /// Decides which sources to consult for `question`.
    ///
    /// Infallible: model, transport, extraction, or parse failures all
    /// degrade to the keyword fallback. The knowledge base is always
    /// selected.
    pub async fn decide(&self, question: &str) -> ToolDecision {
        let messages = vec![
            ChatMessage::system(prompt::DECISION_SYSTEM),
            ChatMessage::user(prompt::decision_user(question)),
        ];

        match self
            .client
            .generate(messages, prompt::DECISION_MAX_TOKENS, prompt::DECISION_TEMPERATURE)
            .await
        {
            Ok(reply) => match self.parse_decision(&reply) {
                Some(decision) => decision.normalized(),
                None => {
                    tracing::warn!(
                        reply_len = reply.len(),
                        "decision reply carried no parseable JSON, using keyword fallback"
                    );
                    self.keyword_fallback(question)
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "decision model unavailable, using keyword fallback");
                self.keyword_fallback(question)
            }
        }
    }

    fn parse_decision(&self, reply: &str) -> Option<ToolDecision> {
        let fragment = self.json_fragment.find(reply)?.as_str();
        serde_json::from_str(fragment).ok()
    }

    /// Keyword-driven selection. Knowledge base is always on.
    #[must_use]
    pub fn keyword_fallback(&self, question: &str) -> ToolDecision {
        let lower = question.to_lowercase();
        let hit = |words: &[String]| words.iter().any(|w| lower.contains(w.as_str()));
        ToolDecision {
            knowledge_base: true,
            weather: hit(&self.keywords.weather),
            market: hit(&self.keywords.market),
            water: hit(&self.keywords.water),
            pest: hit(&self.keywords.pest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::keypool::KeyPool;
    use crate::agent::message::ChatRequest;
    use crate::agent::provider::ChatProvider;
    use crate::error::{AgentError, Result};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct FixedProvider {
        reply: Result<String, String>,
    }

    #[async_trait]
    impl ChatProvider for FixedProvider {
        async fn chat(&self, _api_key: &str, _request: &ChatRequest) -> Result<String> {
            self.reply
                .clone()
                .map_err(|message| AgentError::ApiRequest {
                    message,
                    status: Some(500),
                })
        }
    }

    fn selector(reply: Result<String, String>) -> ToolSelector {
        let pool = Arc::new(KeyPool::new(
            vec!["k".to_string()],
            Duration::from_secs(300),
        ));
        let client = GenerationClient::new(
            Arc::new(FixedProvider { reply }),
            pool,
            "decision-model",
            1,
            Duration::ZERO,
            Duration::ZERO,
        );
        ToolSelector::new(client, FallbackKeywords::default())
    }

    #[tokio::test]
    async fn test_clean_json_reply() {
        let sel = selector(Ok(
            r#"{"rag": false, "weather": true, "market": false, "water": false, "pest": false}"#
                .to_string(),
        ));
        let decision = sel.decide("Will it rain tomorrow?").await;
        // Knowledge base is forced on even when the model said no.
        assert!(decision.knowledge_base);
        assert!(decision.weather);
        assert!(!decision.market);
    }

    #[tokio::test]
    async fn test_json_embedded_in_prose() {
        let sel = selector(Ok(
            "Sure! Here is the tool selection:\n```json\n{\"pest\": true}\n```\nHope that helps."
                .to_string(),
        ));
        let decision = sel.decide("leaf spots on my tomato").await;
        assert!(decision.knowledge_base);
        assert!(decision.pest);
        assert!(!decision.weather);
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back_to_keywords() {
        let sel = selector(Ok("I cannot answer that.".to_string()));
        let decision = sel
            .decide("What is the weather in Hyderabad and market price of rice?")
            .await;
        assert!(decision.knowledge_base);
        assert!(decision.weather);
        assert!(decision.market);
        assert!(!decision.pest);
        assert!(!decision.water);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_to_keywords() {
        let sel = selector(Err("connection reset".to_string()));
        let decision = sel.decide("drip irrigation schedule for cotton").await;
        assert!(decision.knowledge_base);
        assert!(decision.water);
        assert!(!decision.market);
    }

    #[test]
    fn test_keyword_fallback_no_hits() {
        let sel = selector(Ok(String::new()));
        let decision = sel.keyword_fallback("how do I improve soil fertility");
        assert!(decision.knowledge_base);
        assert!(!decision.weather);
        assert!(!decision.market);
        assert!(!decision.water);
        assert!(!decision.pest);
    }

    // (weather, market, water, pest)
    #[test_case::test_case("will it rain this week" => (true, false, false, false); "weather terms")]
    #[test_case::test_case("mandi price for cotton" => (false, true, false, false); "market terms")]
    #[test_case::test_case("irrigation schedule for chili" => (false, false, true, false); "water terms")]
    #[test_case::test_case("fungal spots on leaves" => (false, false, false, true); "pest terms")]
    #[test_case::test_case("best seed variety" => (false, false, false, false); "no terms")]
    fn test_keyword_categories(question: &str) -> (bool, bool, bool, bool) {
        let sel = selector(Ok(String::new()));
        let d = sel.keyword_fallback(question);
        (d.weather, d.market, d.water, d.pest)
    }

    #[test]
    fn test_keyword_fallback_case_insensitive() {
        let sel = selector(Ok(String::new()));
        let decision = sel.keyword_fallback("PEST attack expected after heavy RAIN");
        assert!(decision.pest);
        assert!(decision.weather);
    }
}
