//! Date-ordered browsing and per-source counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Chunk, Metadata, null_as_default};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEntry {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub document: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
    /// `YYYY-MM-DD`; `None` when the chunk has no date.
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimelinePage {
    pub items: Vec<TimelineEntry>,
    /// Number of chunks in the whole collection.
    pub total: usize,
}

/// Chunk counts keyed by `source` metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceCounts {
    pub sources: BTreeMap<String, usize>,
    pub total: usize,
}

/// A collection name with its size and the distinct sources it holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionSummary {
    pub name: String,
    pub count: usize,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Order chunks newest first and cut out `offset..offset + limit`.
///
/// Dated chunks sort before undated ones; ties keep their stored order.
pub fn timeline_page(chunks: &[Chunk], offset: usize, limit: usize) -> TimelinePage {
    let mut entries: Vec<TimelineEntry> = chunks
        .iter()
        .map(|c| TimelineEntry {
            id: c.id.clone(),
            document: c.document.clone(),
            metadata: c.metadata.clone(),
            date: c.date(),
        })
        .collect();

    // `Option` orders `None` first, so compare reversed to put undated entries last.
    entries.sort_by(|a, b| b.date.cmp(&a.date));

    let total = entries.len();
    let items = entries.into_iter().skip(offset).take(limit).collect();
    TimelinePage { items, total }
}

pub fn source_counts(chunks: &[Chunk]) -> SourceCounts {
    let mut sources = BTreeMap::new();
    for chunk in chunks {
        *sources.entry(chunk.source()).or_insert(0) += 1;
    }
    SourceCounts { sources, total: chunks.len() }
}

/// Summarize a collection; sources are distinct and sorted.
pub fn summarize(name: &str, chunks: &[Chunk]) -> CollectionSummary {
    let sources = source_counts(chunks).sources.into_keys().collect();
    CollectionSummary { name: name.to_string(), count: chunks.len(), sources }
}
