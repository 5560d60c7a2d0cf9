//! End-to-end question pipeline: tool selection, evidence gathering,
//! answer synthesis.

use std::sync::Arc;

use serde::Serialize;

use crate::agent::client::GenerationClient;
use crate::agent::evidence::{EvidenceQuery, EvidenceResult, EvidenceSource};
use crate::agent::keypool::KeyPool;
use crate::agent::message::ChatMessage;
use crate::agent::prompt;
use crate::agent::providers::OpenRouterProvider;
use crate::agent::selector::{FallbackKeywords, ToolSelector};
use crate::config::AgriConfig;
use crate::embedding::create_embedder;
use crate::error::{AgentError, Result};
use crate::index::{DocumentStore, FlatIndex};
use crate::tools::{
    KnowledgeSearch, MarketPriceTool, PestAdvisoryTool, WaterFactsTool, WeatherTool,
};

/// Placeholder topic when the question names no known crop.
const GENERIC_TOPIC: &str = "your crop";

/// Tool name reported for the knowledge base.
const KNOWLEDGE_BASE_NAME: &str = "knowledge-base";

/// Answer shown when every credential is cooling down.
const SERVICE_UNAVAILABLE_ANSWER: &str = "**Service unavailable:** all API keys \
are temporarily rate-limited. Please try again in a few minutes.";

/// Answer shown on any other generation failure.
const INTERNAL_ERROR_ANSWER: &str = "Sorry, something went wrong while \
generating the answer. Please try again.";

/// Final result of one question.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResult {
    /// The farmer's question verbatim.
    pub question: String,
    /// Synthesized answer text.
    pub answer: String,
    /// Sorted, de-duplicated names of the evidence sources that
    /// delivered data.
    pub tools_used: Vec<String>,
    /// The full evidence bundle the answer was grounded on.
    pub context: String,
}

/// The question-answering agent.
pub struct AgriAgent {
    selector: ToolSelector,
    answer_client: GenerationClient,
    knowledge: KnowledgeSearch,
    weather: Box<dyn EvidenceSource>,
    market: Box<dyn EvidenceSource>,
    water: Box<dyn EvidenceSource>,
    pest: Box<dyn EvidenceSource>,
    default_city: String,
    topic_candidates: Vec<String>,
}

impl std::fmt::Debug for AgriAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgriAgent")
            .field("knowledge", &self.knowledge)
            .field("default_city", &self.default_city)
            .finish_non_exhaustive()
    }
}

impl AgriAgent {
    /// Assembles an agent from its parts.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        selector: ToolSelector,
        answer_client: GenerationClient,
        knowledge: KnowledgeSearch,
        weather: Box<dyn EvidenceSource>,
        market: Box<dyn EvidenceSource>,
        water: Box<dyn EvidenceSource>,
        pest: Box<dyn EvidenceSource>,
        default_city: impl Into<String>,
        topic_candidates: Vec<String>,
    ) -> Self {
        Self {
            selector,
            answer_client,
            knowledge,
            weather,
            market,
            water,
            pest,
            default_city: default_city.into(),
            topic_candidates,
        }
    }

    /// Builds a fully wired agent from configuration: loads the index
    /// and document store, constructs the shared key pool, and stands up
    /// both LLM clients and all evidence sources.
    ///
    /// # Errors
    ///
    /// Returns an error if the index or document store cannot be loaded
    /// or the HTTP client cannot be built.
    pub fn from_config(config: &AgriConfig) -> Result<Self> {
        let pool = Arc::new(KeyPool::new(config.api_keys.clone(), config.key_cooldown));
        let provider = Arc::new(OpenRouterProvider::new(
            config.base_url.clone(),
            config.generation_timeout,
        )?);

        let decision_client = GenerationClient::new(
            Arc::clone(&provider) as Arc<dyn crate::agent::provider::ChatProvider>,
            Arc::clone(&pool),
            config.decision_model.clone(),
            config.max_retries,
            config.rate_limit_delay,
            config.retry_delay,
        );
        let answer_client = GenerationClient::new(
            provider,
            pool,
            config.answer_model.clone(),
            config.max_retries,
            config.rate_limit_delay,
            config.retry_delay,
        );

        let index = FlatIndex::load(&config.index_path)?;
        let store = DocumentStore::load(&config.metadata_path)?;
        let knowledge = KnowledgeSearch::new(
            create_embedder(config.embedding_dim),
            index,
            store,
            config.search_top_k,
            config.search_threshold,
        );

        Ok(Self::new(
            ToolSelector::new(decision_client, FallbackKeywords::default()),
            answer_client,
            knowledge,
            Box::new(WeatherTool::new(
                config.weather_base_url.clone(),
                config.weather_api_key.clone(),
                config.weather_timeout,
            )),
            Box::new(MarketPriceTool::new(config.market_prices_path.clone())),
            Box::new(WaterFactsTool::new(config.default_region.clone())),
            Box::new(PestAdvisoryTool::new()),
            config.default_city.clone(),
            config.topic_candidates.clone(),
        ))
    }

    /// Answers a farmer's question.
    ///
    /// Infallible by design: evidence-source failures appear as
    /// unavailability notes inside the bundle, and generation failures
    /// produce an apologetic answer rather than an error.
    pub async fn query(&self, question: &str) -> AgentResult {
        let decision = self.selector.decide(question).await;
        let topic = self.detect_topic(question);
        let evidence_query = EvidenceQuery {
            question,
            city: &self.default_city,
            topic: &topic,
        };
        tracing::info!(?decision, topic = %topic, "running evidence pipeline");

        let mut sections: Vec<String> = Vec::new();
        let mut tools_used: Vec<String> = Vec::new();

        // Knowledge base first; it is consulted for every question.
        // Counted as used when the search itself succeeds, relevant or not.
        let (kb_section, kb_succeeded) = self.knowledge_section(question);
        sections.push(kb_section);
        if kb_succeeded {
            tools_used.push(KNOWLEDGE_BASE_NAME.to_string());
        }

        let selected: [(bool, &dyn EvidenceSource); 4] = [
            (decision.weather, self.weather.as_ref()),
            (decision.market, self.market.as_ref()),
            (decision.water, self.water.as_ref()),
            (decision.pest, self.pest.as_ref()),
        ];
        for (wanted, source) in selected {
            if !wanted {
                continue;
            }
            let label = source.section_label(&evidence_query);
            let result = source.invoke(&evidence_query).await;
            if matches!(result, EvidenceResult::Available { .. }) {
                tools_used.push(source.name().to_string());
            }
            sections.push(format!("{label}\n{}", result.into_section_body()));
        }

        tools_used.sort_unstable();
        tools_used.dedup();

        let context = sections.join("\n\n");
        let answer = self.generate_answer(question, &context).await;

        AgentResult {
            question: question.to_string(),
            answer,
            tools_used,
            context,
        }
    }

    /// Runs the knowledge-base search and formats its section. The
    /// second element reports whether the search itself succeeded.
    fn knowledge_section(&self, question: &str) -> (String, bool) {
        match self.knowledge.search(question) {
            Ok(outcome) if !outcome.relevant() => (
                "[Knowledge Base]\nNo relevant information found.".to_string(),
                true,
            ),
            Ok(outcome) => (
                outcome
                    .hits
                    .iter()
                    .enumerate()
                    .map(|(i, hit)| {
                        format!(
                            "[Knowledge Base - Context {} (Source: {}, Relevance: {:.1}%)]\n{}",
                            i + 1,
                            hit.source,
                            hit.similarity * 100.0,
                            hit.text
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n"),
                true,
            ),
            Err(err) => {
                tracing::warn!(error = %err, "knowledge-base search failed");
                (format!("[Knowledge Base]\nData unavailable. {err}"), false)
            }
        }
    }

    async fn generate_answer(&self, question: &str, evidence: &str) -> String {
        let messages = vec![
            ChatMessage::system(prompt::ANSWER_SYSTEM),
            ChatMessage::user(prompt::answer_user(question, evidence)),
        ];
        match self
            .answer_client
            .generate(messages, prompt::ANSWER_MAX_TOKENS, prompt::ANSWER_TEMPERATURE)
            .await
        {
            Ok(answer) => answer,
            Err(err @ AgentError::KeysExhausted { .. }) => {
                tracing::error!(error = %err, "answer generation failed: keys exhausted");
                SERVICE_UNAVAILABLE_ANSWER.to_string()
            }
            Err(err) => {
                tracing::error!(error = %err, "answer generation failed");
                INTERNAL_ERROR_ANSWER.to_string()
            }
        }
    }

    /// Scans the question for the first configured crop/commodity name.
    fn detect_topic(&self, question: &str) -> String {
        let lower = question.to_lowercase();
        self.topic_candidates
            .iter()
            .find(|candidate| lower.contains(candidate.as_str()))
            .cloned()
            .unwrap_or_else(|| GENERIC_TOPIC.to_string())
    }
}
