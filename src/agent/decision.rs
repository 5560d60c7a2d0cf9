//! Tool-selection decision produced by the decision LLM (or the keyword
//! fallback).

use serde::{Deserialize, Serialize};

/// Which evidence sources to consult for a question.
///
/// Deserialized leniently from model output: missing keys default to
/// `false`, unknown keys are ignored. The knowledge base is consulted
/// for every question regardless of what the model said; callers go
/// through [`normalized`](Self::normalized) to enforce that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDecision {
    /// Semantic knowledge-base search.
    #[serde(default, alias = "rag")]
    pub knowledge_base: bool,
    /// Live weather lookup.
    #[serde(default)]
    pub weather: bool,
    /// Commodity price lookup.
    #[serde(default)]
    pub market: bool,
    /// Water/irrigation facts.
    #[serde(default)]
    pub water: bool,
    /// Pest advisory.
    #[serde(default)]
    pub pest: bool,
}

impl ToolDecision {
    /// Decision with only the knowledge base selected.
    #[must_use]
    pub const fn knowledge_base_only() -> Self {
        Self {
            knowledge_base: true,
            weather: false,
            market: false,
            water: false,
            pest: false,
        }
    }

    /// Returns a copy with the knowledge base forced on.
    #[must_use]
    pub const fn normalized(mut self) -> Self {
        self.knowledge_base = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_default_to_false() {
        let decision: ToolDecision =
            serde_json::from_str(r#"{"weather": true}"#).unwrap_or_else(|_| unreachable!());
        assert!(decision.weather);
        assert!(!decision.knowledge_base);
        assert!(!decision.market);
        assert!(!decision.water);
        assert!(!decision.pest);
    }

    #[test]
    fn test_rag_alias() {
        let decision: ToolDecision =
            serde_json::from_str(r#"{"rag": true, "pest": true}"#)
                .unwrap_or_else(|_| unreachable!());
        assert!(decision.knowledge_base);
        assert!(decision.pest);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let decision: ToolDecision =
            serde_json::from_str(r#"{"market": true, "satellite": true}"#)
                .unwrap_or_else(|_| unreachable!());
        assert!(decision.market);
    }

    #[test]
    fn test_normalized_forces_knowledge_base() {
        let decision: ToolDecision =
            serde_json::from_str(r#"{"rag": false, "weather": true}"#)
                .unwrap_or_else(|_| unreachable!());
        assert!(!decision.knowledge_base);
        let normalized = decision.normalized();
        assert!(normalized.knowledge_base);
        assert!(normalized.weather);
    }
}
