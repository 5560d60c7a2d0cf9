//! Evidence source seam and result type.
//!
//! Weather, market, water, and pest lookups all implement
//! [`EvidenceSource`]. Source failures are data, not errors: a source
//! that cannot deliver reports [`EvidenceResult::Unavailable`] with a
//! human-readable reason, and the orchestrator folds that into the
//! evidence bundle so the answer model can acknowledge the gap.

use async_trait::async_trait;

/// What to ask an evidence source for.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceQuery<'a> {
    /// The farmer's question verbatim.
    pub question: &'a str,
    /// City for location-bound lookups.
    pub city: &'a str,
    /// Detected crop/commodity, or a generic placeholder when none was
    /// found in the question.
    pub topic: &'a str,
}

/// Outcome of one evidence-source invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvidenceResult {
    /// The source delivered usable content.
    Available {
        /// Formatted evidence text for the bundle.
        content: String,
    },
    /// The source could not deliver.
    Unavailable {
        /// Human-readable reason, rendered into the bundle.
        reason: String,
    },
}

impl EvidenceResult {
    /// Renders this result as section body text.
    #[must_use]
    pub fn into_section_body(self) -> String {
        match self {
            Self::Available { content } => content,
            Self::Unavailable { reason } => format!("Data unavailable. {reason}"),
        }
    }
}

/// A consultable evidence source.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    /// Stable lowercase name, reported in `tools_used`.
    fn name(&self) -> &'static str;

    /// Section header for this source's evidence, given the query.
    fn section_label(&self, query: &EvidenceQuery<'_>) -> String;

    /// Fetches evidence. Never fails; failures become
    /// [`EvidenceResult::Unavailable`].
    async fn invoke(&self, query: &EvidenceQuery<'_>) -> EvidenceResult;
}
