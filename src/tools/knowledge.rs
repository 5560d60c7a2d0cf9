//! Semantic knowledge-base search over the prebuilt index.
//!
//! Embeds the question, scans the flat index, converts squared-L2
//! distances to cosine similarity, and keeps hits above the acceptance
//! threshold. Index positions missing from the document store are
//! skipped with a warning rather than failing the search.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::{DocumentStore, FlatIndex};

/// Converts a squared-L2 distance between unit vectors to cosine
/// similarity. For unit vectors, `|a - b|^2 = 2 - 2*cos(a, b)`.
#[must_use]
pub fn cosine_from_l2_squared(distance_squared: f32) -> f32 {
    1.0 - distance_squared / 2.0
}

/// One accepted search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeHit {
    /// Document text.
    pub text: String,
    /// Source label from the document store.
    pub source: String,
    /// Document type label from the document store.
    pub doc_type: String,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity: f32,
}

/// Outcome of one knowledge-base search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Hits at or above the threshold, best first.
    pub hits: Vec<KnowledgeHit>,
    /// Highest similarity seen among the k neighbors, thresholded or not.
    pub max_similarity: f32,
}

impl SearchOutcome {
    /// `true` iff at least one hit cleared the threshold.
    #[must_use]
    pub fn relevant(&self) -> bool {
        !self.hits.is_empty()
    }
}

/// Knowledge-base searcher: embedder, index, and document store loaded
/// once at startup.
pub struct KnowledgeSearch {
    embedder: Box<dyn Embedder>,
    index: FlatIndex,
    store: DocumentStore,
    top_k: usize,
    threshold: f32,
}

impl std::fmt::Debug for KnowledgeSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeSearch")
            .field("documents", &self.store.len())
            .field("top_k", &self.top_k)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl KnowledgeSearch {
    /// Assembles a searcher from loaded components.
    #[must_use]
    pub fn new(
        embedder: Box<dyn Embedder>,
        index: FlatIndex,
        store: DocumentStore,
        top_k: usize,
        threshold: f32,
    ) -> Self {
        Self {
            embedder,
            index,
            store,
            top_k,
            threshold,
        }
    }

    /// Searches the knowledge base for `question`.
    ///
    /// Returns at most `top_k` hits above the similarity threshold,
    /// best first. An empty hit list is normal, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails or the query dimension does
    /// not match the index.
    pub fn search(&self, question: &str) -> Result<SearchOutcome> {
        let query = self.embedder.embed(question)?;
        let neighbors = self.index.search(&query, self.top_k)?;

        let mut hits = Vec::with_capacity(neighbors.len());
        let mut max_similarity = 0.0_f32;
        for (distance_squared, position) in neighbors {
            let similarity = cosine_from_l2_squared(distance_squared);
            max_similarity = max_similarity.max(similarity);
            if similarity < self.threshold {
                continue;
            }
            match self.store.get(position) {
                Some((text, meta)) => hits.push(KnowledgeHit {
                    text: text.to_string(),
                    source: meta.source.clone(),
                    doc_type: meta.doc_type.clone(),
                    similarity,
                }),
                None => {
                    // Index and store were built separately and can drift.
                    tracing::warn!(position, "index position missing from document store");
                }
            }
        }
        Ok(SearchOutcome {
            hits,
            max_similarity,
        })
    }
}
