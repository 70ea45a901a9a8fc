//! Data types for collections, chunks, pages, and query results.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{LensError, Result};

/// Chunk or collection metadata: string keys to scalar JSON values.
pub type Metadata = serde_json::Map<String, Value>;

/// A named, countable set of chunks sharing an embedding space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    /// Opaque backend identifier, needed for raw paginated access.
    pub id: String,
    /// Unique, human-facing name used by every analytics operation.
    pub name: String,
    /// Collection-level metadata.
    #[serde(default)]
    pub metadata: Metadata,
    /// Number of chunks, as reported by the backend at describe time.
    #[serde(default)]
    pub count: usize,
}

/// One retrievable unit of text plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Identifier, unique within its collection.
    pub id: String,
    /// The text content.
    #[serde(default, deserialize_with = "null_as_default")]
    pub document: String,
    /// Metadata. Recognized keys: `source`, `section`, `timestamp`, `date`, `tags`, `importance`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
    /// The stored embedding, when it was requested and is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// The `source` metadata value, or `"unknown"` when absent.
    pub fn source(&self) -> String {
        match self.metadata.get("source") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::String(_)) | Some(Value::Null) | None => "unknown".to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// The comma-separated `tags` metadata value split into trimmed, non-empty tokens.
    pub fn tags(&self) -> Vec<String> {
        match self.metadata.get("tags") {
            Some(Value::String(raw)) => raw
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The calendar date of the chunk (`YYYY-MM-DD`).
    ///
    /// Uses the `date` metadata key if present, else the date part of `timestamp`.
    pub fn date(&self) -> Option<String> {
        if let Some(Value::String(date)) = self.metadata.get("date") {
            if !date.is_empty() {
                return Some(date.clone());
            }
        }
        match self.metadata.get("timestamp") {
            Some(Value::String(ts)) if !ts.is_empty() => {
                Some(ts.split('T').next().unwrap_or(ts).to_string())
            }
            _ => None,
        }
    }

    /// The first `max_chars` characters of the document text.
    pub fn preview(&self, max_chars: usize) -> String {
        self.document.chars().take(max_chars).collect()
    }

    /// A copy of this chunk without its embedding.
    pub fn without_embedding(&self) -> Self {
        Self { embedding: None, ..self.clone() }
    }
}

/// Read an explicit `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A page of raw chunks as parallel sequences; index `i` describes one chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// Chunk identifiers.
    pub ids: Vec<String>,
    /// Chunk texts.
    pub documents: Vec<String>,
    /// Chunk metadata.
    pub metadatas: Vec<Metadata>,
    /// Chunk embeddings, only present when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<Vec<Vec<f32>>>,
}

impl Page {
    /// Build a page from chunks, keeping embeddings only when asked to.
    pub fn from_chunks<'a, I>(chunks: I, include_embeddings: bool) -> Self
    where
        I: IntoIterator<Item = &'a Chunk>,
    {
        let mut page = Page::default();
        let mut embeddings = Vec::new();
        for chunk in chunks {
            page.ids.push(chunk.id.clone());
            page.documents.push(chunk.document.clone());
            page.metadatas.push(chunk.metadata.clone());
            if include_embeddings {
                embeddings.push(chunk.embedding.clone().unwrap_or_default());
            }
        }
        if include_embeddings {
            page.embeddings = Some(embeddings);
        }
        page
    }

    /// Number of chunks in the page.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the page holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Zip the parallel sequences back into chunks.
    ///
    /// Missing documents or metadata (short arrays) become empty values.
    pub fn into_chunks(self) -> Vec<Chunk> {
        let Page { ids, documents, metadatas, embeddings } = self;
        let mut documents = documents.into_iter();
        let mut metadatas = metadatas.into_iter();
        let mut embeddings = embeddings.map(Vec::into_iter);
        ids.into_iter()
            .map(|id| Chunk {
                id,
                document: documents.next().unwrap_or_default(),
                metadata: metadatas.next().unwrap_or_default(),
                embedding: embeddings.as_mut().and_then(Iterator::next).filter(|e| !e.is_empty()),
            })
            .collect()
    }
}

/// A chunk paired with its distance from some reference (smaller is more similar).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// The matched chunk.
    #[serde(flatten)]
    pub chunk: Chunk,
    /// Dissimilarity score; not clamped.
    pub distance: f32,
}

impl ScoredChunk {
    /// `round((1 - distance) * 100)`. Distances above 1 yield negative values.
    pub fn similarity_percent(&self) -> i64 {
        similarity_percent(self.distance)
    }
}

/// `round((1 - distance) * 100)`, passed through unclamped.
pub fn similarity_percent(distance: f32) -> i64 {
    ((1.0 - f64::from(distance)) * 100.0).round() as i64
}

/// Ranked matches for a query, ordered by ascending distance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// The ranked matches.
    pub matches: Vec<ScoredChunk>,
}

impl QueryResult {
    /// Number of matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether there are no matches.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// The rank (0-based) of the chunk with the given id, if present.
    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.matches.iter().position(|m| m.chunk.id == id)
    }
}

/// Opaque liveness payload returned by a heartbeat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Heartbeat(pub Value);

/// Fields for storing a new chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreRequest {
    /// The text to store. Required and non-blank.
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// `YYYY-MM-DD`; defaults to today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Comma-separated tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl StoreRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }

    /// Reject blank text before anything is sent anywhere.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(LensError::InvalidInput("text is required".to_string()));
        }
        Ok(())
    }

    /// Fill in defaults: source `live`, section `memory`, date `today`.
    pub fn resolve(&self, today: NaiveDate) -> ResolvedStore {
        fn non_blank(value: &Option<String>) -> Option<String> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
        }
        ResolvedStore {
            text: self.text.clone(),
            source: non_blank(&self.source).unwrap_or_else(|| "live".to_string()),
            section: non_blank(&self.section).unwrap_or_else(|| "memory".to_string()),
            date: non_blank(&self.date).unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            tags: non_blank(&self.tags),
        }
    }
}

/// A [`StoreRequest`] with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStore {
    pub text: String,
    pub source: String,
    pub section: String,
    pub date: String,
    pub tags: Option<String>,
}

impl ResolvedStore {
    /// Content-derived id: hex of `sha256(source:section:first-50-chars:date)`, 32 chars.
    ///
    /// Storing the same fact twice on the same day yields the same id.
    pub fn chunk_id(&self) -> String {
        let head: String = self.text.chars().take(50).collect();
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}:{}:{}", self.source, self.section, head, self.date));
        let digest = format!("{:x}", hasher.finalize());
        digest.chars().take(32).collect()
    }

    /// Metadata to persist alongside the text.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), Value::String(self.source.clone()));
        metadata.insert("section".into(), Value::String(self.section.clone()));
        metadata.insert("date".into(), Value::String(self.date.clone()));
        if let Some(tags) = &self.tags {
            metadata.insert("tags".into(), Value::String(tags.clone()));
        }
        metadata
    }
}

/// Outcome of a store request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreReceipt {
    pub success: bool,
    /// Identifier of the stored chunk.
    pub id: String,
    /// Collection the chunk was written to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Chunk count of the target collection after the write.
    #[serde(default)]
    pub chunks: usize,
}

/// Outcome of a delete request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteReceipt {
    pub success: bool,
    #[serde(default)]
    pub deleted: usize,
}

/// Outcome of a sync request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncReport {
    pub success: bool,
    #[serde(default)]
    pub output: Vec<String>,
    #[serde(default)]
    pub summary: String,
}
