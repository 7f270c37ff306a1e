//! Text embedding capability.
//!
//! The embedding model is an externally loaded resource. Rather than a
//! process-wide singleton, it enters the library as an explicitly
//! constructed [`Embedder`] passed into the semantic classifier and the
//! relevance ranker, so tests and offline callers can substitute a stub.
//!
//! The contract: a deterministic function from text to a fixed-length
//! vector. Backends wrap whatever model runtime the application ships;
//! [`HashingEmbedder`] is a model-free reference backend.

use crate::error::{Error, Result};
use crate::ranking::word_tokens;

/// A text-to-vector encoding backend.
///
/// Implementations must be deterministic for a fixed model version and
/// must return vectors of exactly [`Embedder::dimensions`] length.
/// `Send + Sync` lets one instance be shared read-only across parallel
/// document workers.
pub trait Embedder: Send + Sync {
    /// Length of every vector this backend produces.
    fn dimensions(&self) -> usize;

    /// Encode one text into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Encode a batch of texts. The default implementation loops over
    /// [`Embedder::embed`]; backends with real batch inference override it.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero magnitude or the lengths differ,
/// so degenerate inputs sort below any genuine match instead of poisoning
/// the ordering with NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Deterministic bag-of-words feature-hashing embedder.
///
/// Tokenizes with the shared word pattern, hashes each case-folded token
/// into a fixed-size bucket vector, and L2-normalizes the counts. No model
/// file, no I/O. Texts sharing vocabulary land near each other, which is
/// enough for tests and for offline environments without a model runtime.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dims: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

impl HashingEmbedder {
    /// Create an embedder producing `dims`-length vectors.
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }
}

impl Embedder for HashingEmbedder {
    fn dimensions(&self) -> usize {
        self.dims
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{Hash, Hasher};

        let mut vector = vec![0.0f32; self.dims];
        for token in word_tokens(text) {
            // DefaultHasher::new() uses fixed keys: stable across runs
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dims as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

/// Validate that a batch of vectors all have the expected length.
pub(crate) fn check_dimensions(vectors: &[Vec<f32>], expected: usize) -> Result<()> {
    for v in vectors {
        if v.len() != expected {
            return Err(Error::Embedding(format!(
                "backend returned a {}-length vector, expected {}",
                v.len(),
                expected
            )));
        }
    }
    Ok(())
}
