//! Near-duplicate cluster detection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{Chunk, ScoredChunk};

/// An anchor chunk and the chunks found within the threshold of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateGroup {
    pub anchor: Chunk,
    /// Sorted by ascending distance. Never contains the anchor.
    pub similar: Vec<ScoredChunk>,
}

/// Result of a duplicate scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DuplicateReport {
    #[serde(rename = "duplicates", alias = "groups")]
    pub groups: Vec<DuplicateGroup>,
    /// Number of chunks actually examined.
    pub scanned: usize,
    /// Size of the whole collection, when known.
    #[serde(default)]
    pub total: usize,
}

impl DuplicateReport {
    /// Apply a deletion to this report.
    ///
    /// The chunk is removed from every `similar` list; a group is dropped only when
    /// its `similar` list ends up empty and its anchor is the deleted chunk.
    pub fn remove_chunk(&mut self, id: &str) {
        for group in &mut self.groups {
            group.similar.retain(|s| s.chunk.id != id);
        }
        self.groups.retain(|g| !g.similar.is_empty() || g.anchor.id != id);
    }
}

/// Group `sample` into anchor/similar clusters.
///
/// Chunks are visited in order. Each one not already consumed becomes a candidate
/// anchor and is compared against every other unconsumed chunk; matches strictly
/// below `threshold` form its group. Once a group is emitted, its anchor and
/// members are consumed so no pair is reported twice.
pub fn detect_duplicates<F>(sample: &[Chunk], threshold: f32, mut distance: F) -> Vec<DuplicateGroup>
where
    F: FnMut(&Chunk, &Chunk) -> f32,
{
    let mut consumed: HashSet<&str> = HashSet::new();
    let mut groups = Vec::new();

    for (i, anchor) in sample.iter().enumerate() {
        if consumed.contains(anchor.id.as_str()) {
            continue;
        }

        let mut matched: Vec<(usize, f32)> = sample
            .iter()
            .enumerate()
            .filter(|(j, candidate)| {
                *j != i && candidate.id != anchor.id && !consumed.contains(candidate.id.as_str())
            })
            .filter_map(|(j, candidate)| {
                let d = distance(anchor, candidate);
                (d < threshold).then_some((j, d))
            })
            .collect();

        if matched.is_empty() {
            continue;
        }

        matched.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        consumed.insert(anchor.id.as_str());
        let similar = matched
            .into_iter()
            .map(|(j, d)| {
                consumed.insert(sample[j].id.as_str());
                ScoredChunk { chunk: sample[j].without_embedding(), distance: d }
            })
            .collect();
        groups.push(DuplicateGroup { anchor: anchor.without_embedding(), similar });
    }

    groups
}
