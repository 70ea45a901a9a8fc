//! Relationship graph over a sample of chunks.

use serde::{Deserialize, Serialize};

use crate::types::Chunk;

/// Characters of document text used as a node label.
pub const LABEL_CHARS: usize = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    /// Document preview, at most [`LABEL_CHARS`] characters.
    pub label: String,
    pub source: String,
    /// `YYYY-MM-DD`, or empty when the chunk carries no date.
    pub date: String,
}

impl GraphNode {
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            id: chunk.id.clone(),
            label: chunk.preview(LABEL_CHARS),
            source: chunk.source(),
            date: chunk.date().unwrap_or_default(),
        }
    }
}

/// An undirected edge between two related chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphLink {
    /// Id of the chunk earlier in the sample.
    pub source: String,
    /// Id of the chunk later in the sample.
    pub target: String,
    pub distance: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Build a graph with one node per sampled chunk and a link for every pair `i < j`
/// whose relatedness distance is strictly below `threshold`.
///
/// `relatedness` returns `None` for pairs that must never be linked. Pairs sharing
/// an id are skipped. This is a quadratic pass; callers bound the sample.
pub fn build_graph<F>(sample: &[Chunk], threshold: f32, mut relatedness: F) -> Graph
where
    F: FnMut(&Chunk, &Chunk) -> Option<f32>,
{
    let nodes = sample.iter().map(GraphNode::from_chunk).collect();
    let mut links = Vec::new();

    for (i, a) in sample.iter().enumerate() {
        for b in &sample[i + 1..] {
            if a.id == b.id {
                continue;
            }
            match relatedness(a, b) {
                Some(distance) if distance < threshold => {
                    links.push(GraphLink { source: a.id.clone(), target: b.id.clone(), distance });
                }
                _ => {}
            }
        }
    }

    Graph { nodes, links }
}

/// Tag-overlap relatedness used when no embeddings are available.
///
/// `0.05 + (1 - overlap / max(|tags_a|, |tags_b|)) * 0.1`, or `None` with no shared tag.
pub fn tag_overlap_distance(a: &Chunk, b: &Chunk) -> Option<f32> {
    let tags_a = a.tags();
    let tags_b = b.tags();
    let overlap = tags_a.iter().filter(|t| tags_b.contains(t)).count();
    if overlap == 0 {
        return None;
    }
    let widest = tags_a.len().max(tags_b.len()) as f32;
    Some(0.05 + (1.0 - overlap as f32 / widest) * 0.1)
}
