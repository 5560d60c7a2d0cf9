//! Question embedding for knowledge-base search.
//!
//! The index was built offline with a fixed-dimension sentence embedding
//! model; this module only defines the query-side seam. The shipped
//! implementation is a deterministic hashed bag-of-words embedder, which
//! keeps the pipeline self-contained; a real model plugs in behind the
//! same trait.

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::error::Result;

/// Text-to-fixed-length-vector function, loaded once at startup.
pub trait Embedder: Send + Sync {
    /// Output vector dimension.
    fn dimension(&self) -> usize;

    /// Embeds a single text into a vector of [`Self::dimension`] floats.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing model fails. The hash embedder
    /// never fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Deterministic hashed bag-of-words embedder.
///
/// Each lowercased alphanumeric token is hashed into a bucket; the
/// accumulated vector is L2-normalized. Identical input always yields
/// an identical vector, which the tests rely on.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Creates a hash embedder producing vectors of `dimension` floats.
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0_f32; self.dimension];

        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let hashed = hasher.finish();

            #[allow(clippy::cast_possible_truncation)]
            let bucket = (hashed % self.dimension as u64) as usize;
            // Separate bit decides the sign so collisions partially cancel
            // instead of always reinforcing.
            let sign = if hashed & (1 << 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        Ok(l2_normalize(vector))
    }
}

/// Normalizes a vector to unit L2 length. Zero vectors pass through
/// unchanged.
#[must_use]
pub fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

/// Creates the default embedder for the given dimension.
#[must_use]
pub fn create_embedder(dimension: usize) -> Box<dyn Embedder> {
    Box::new(HashEmbedder::new(dimension))
}
