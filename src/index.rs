//! Prebuilt nearest-neighbor index and its parallel document store.
//!
//! Both artifacts are produced offline by the index build pipeline and
//! loaded read-only at startup: a flat vector index queried by exhaustive
//! squared-L2 scan, and a parallel array of document texts with source
//! metadata. The two files can drift independently, so every index
//! position is bounds-checked before dereferencing the store.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Flat vector index queried by exhaustive scan.
///
/// Query interface matches the offline build contract:
/// `search(vector, k)` returns the `k` nearest stored vectors as
/// `(squared-L2 distance, position)` pairs, ascending by distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Creates an index over pre-normalized vectors.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Index`] if any vector's length differs from
    /// `dimension`.
    pub fn new(dimension: usize, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if let Some(bad) = vectors.iter().position(|v| v.len() != dimension) {
            return Err(AgentError::Index {
                message: format!(
                    "vector {bad} has dimension {}, expected {dimension}",
                    vectors[bad].len()
                ),
            });
        }
        Ok(Self { dimension, vectors })
    }

    /// Loads an index from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Index`] if the file is missing or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| AgentError::Index {
            message: format!("cannot open index {}: {e}", path.display()),
        })?;
        let index: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| AgentError::Index {
                message: format!("cannot parse index {}: {e}", path.display()),
            })?;
        if let Some(bad) = index.vectors.iter().position(|v| v.len() != index.dimension) {
            return Err(AgentError::Index {
                message: format!("vector {bad} does not match declared dimension"),
            });
        }
        Ok(index)
    }

    /// Number of stored vectors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns `true` if the index holds no vectors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vector dimension.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the `k` nearest stored vectors as
    /// `(squared-L2 distance, position)` pairs, ascending by distance.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Index`] on query dimension mismatch.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>> {
        if query.len() != self.dimension {
            return Err(AgentError::Index {
                message: format!(
                    "query dimension {} does not match index dimension {}",
                    query.len(),
                    self.dimension
                ),
            });
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, stored)| {
                let distance: f32 = stored
                    .iter()
                    .zip(query.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (distance, position)
            })
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(k);
        Ok(scored)
    }
}

/// Metadata for one stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Source label (e.g. a handbook or bulletin name).
    pub source: String,
    /// Document type label (e.g. "crop_practice", "advisory").
    #[serde(rename = "type")]
    pub doc_type: String,
}

/// Parallel array of document texts and metadata, aligned with the
/// index positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStore {
    /// Document texts, index-aligned.
    pub documents: Vec<String>,
    /// Per-document metadata, index-aligned.
    pub metadata: Vec<DocumentMeta>,
}

impl DocumentStore {
    /// Loads the store from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Index`] if the file is missing or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| AgentError::Index {
            message: format!("cannot open document store {}: {e}", path.display()),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| AgentError::Index {
            message: format!("cannot parse document store {}: {e}", path.display()),
        })
    }

    /// Number of documents with complete metadata.
    ///
    /// When the two arrays drifted out of sync, only the overlapping
    /// prefix is addressable.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len().min(self.metadata.len())
    }

    /// Returns `true` if no document is addressable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the document text and metadata at `position`, or `None`
    /// when the position is outside either array.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<(&str, &DocumentMeta)> {
        let text = self.documents.get(position)?;
        let meta = self.metadata.get(position)?;
        Some((text.as_str(), meta))
    }
}
