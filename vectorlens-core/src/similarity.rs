//! Distance measures: the term-overlap approximator used in simulated mode
//! and cosine distance over real embeddings.

use rand::Rng;

/// Smallest distance the approximator produces before jitter.
const MIN_DISTANCE: f32 = 0.01;

/// Scores free text against a document by term overlap.
///
/// This stands in for nearest-neighbor search when no backend is available.
/// The only contract is that more overlapping terms typically yield a lower
/// distance; rankings are jittered and not deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityApproximator;

impl SimilarityApproximator {
    pub fn new() -> Self {
        Self
    }

    /// Distance in `(0, 1]` between `document` and `query`, jittered with the thread RNG.
    pub fn score(&self, document: &str, query: &str) -> f32 {
        self.score_with(&mut rand::thread_rng(), document, query)
    }

    /// Like [`score`](Self::score) but draws jitter from the given RNG.
    ///
    /// A query with no terms scores `1.0`.
    pub fn score_with<R: Rng>(&self, rng: &mut R, document: &str, query: &str) -> f32 {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return 1.0;
        }

        let haystack = document.to_lowercase();
        let found = terms.iter().filter(|term| haystack.contains(term.as_str())).count();
        let match_ratio = found as f32 / terms.len() as f32;

        let jitter: f32 = rng.gen_range(0.8..1.0);
        (1.0 - match_ratio * 0.9).max(MIN_DISTANCE) * jitter
    }
}

/// Cosine similarity between two vectors. Returns 0.0 if either has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// `1 - cosine_similarity`. Zero-magnitude vectors are at distance 1.0.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}
