//! Wire shapes of the vector-store REST API and the analytics proxy.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::{LensError, Result};
use crate::types::{Chunk, Metadata, Page, QueryResult, ScoredChunk};

/// A collection as listed by the store (no count).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Body of a `/get` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    pub include: Vec<String>,
}

impl GetRequest {
    pub fn new(limit: Option<usize>, offset: Option<usize>, include_embeddings: bool) -> Self {
        let mut include = vec!["documents".to_string(), "metadatas".to_string()];
        if include_embeddings {
            include.push("embeddings".to_string());
        }
        Self { limit, offset, include }
    }
}

/// Response of a `/get` request. Every column except `ids` may be absent or hold nulls.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawPage {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Option<Metadata>>>,
    #[serde(default)]
    pub embeddings: Option<Vec<Option<Vec<f32>>>>,
}

impl RawPage {
    /// Normalize nulls into empty values, keeping the columns parallel to `ids`.
    pub fn into_page(self) -> Page {
        let len = self.ids.len();
        let documents = fill(self.documents, len);
        let metadatas = fill(self.metadatas, len);
        let embeddings = self.embeddings.map(|column| {
            let mut rows: Vec<Vec<f32>> = column.into_iter().map(Option::unwrap_or_default).collect();
            rows.resize(len, Vec::new());
            rows
        });
        Page { ids: self.ids, documents, metadatas, embeddings }
    }
}

/// Body of a `/query` request against the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_texts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_embeddings: Option<Vec<Vec<f32>>>,
    pub n_results: usize,
    pub include: Vec<String>,
}

impl QueryRequest {
    pub fn text(text: &str, n_results: usize) -> Self {
        Self {
            query_texts: Some(vec![text.to_string()]),
            query_embeddings: None,
            n_results,
            include: vec!["documents".into(), "metadatas".into(), "distances".into()],
        }
    }
}

/// Query response: one row per query, columns parallel to `ids`.
///
/// Both the store and the analytics proxy answer `/query` with this shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NestedQueryResult {
    #[serde(default)]
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default)]
    pub distances: Option<Vec<Vec<Option<f32>>>>,
}

impl NestedQueryResult {
    /// The first row as ranked matches. Missing distances become `1.0`.
    pub fn into_result(self) -> QueryResult {
        let ids = self.ids.into_iter().next().unwrap_or_default();
        let len = ids.len();
        let documents = fill(self.documents.and_then(|rows| rows.into_iter().next()), len);
        let metadatas = fill(self.metadatas.and_then(|rows| rows.into_iter().next()), len);
        let distances = self.distances.and_then(|rows| rows.into_iter().next()).unwrap_or_default();

        let matches = ids
            .into_iter()
            .zip(documents)
            .zip(metadatas)
            .enumerate()
            .map(|(i, ((id, document), metadata))| ScoredChunk {
                chunk: Chunk { id, document, metadata, embedding: None },
                distance: distances.get(i).copied().flatten().unwrap_or(1.0),
            })
            .collect();
        QueryResult { matches }
    }

    /// Wrap ranked matches as a single-row response.
    pub fn from_result(result: &QueryResult) -> Self {
        let m = &result.matches;
        Self {
            ids: vec![m.iter().map(|s| s.chunk.id.clone()).collect()],
            documents: Some(vec![m.iter().map(|s| Some(s.chunk.document.clone())).collect()]),
            metadatas: Some(vec![m.iter().map(|s| Some(s.chunk.metadata.clone())).collect()]),
            distances: Some(vec![m.iter().map(|s| Some(s.distance)).collect()]),
        }
    }
}

/// Unwrap a nullable column into exactly `len` values.
fn fill<T: Default + Clone>(column: Option<Vec<Option<T>>>, len: usize) -> Vec<T> {
    let mut values: Vec<T> =
        column.unwrap_or_default().into_iter().map(Option::unwrap_or_default).collect();
    values.resize(len, T::default());
    values
}

/// Send a request and decode a JSON body.
///
/// Transport failures become [`LensError::Unreachable`]; any non-2xx status becomes
/// [`LensError::BadResponse`] carrying the body text verbatim.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    endpoint: &str,
) -> Result<T> {
    let response = send(request, endpoint).await?;
    response.json::<T>().await.map_err(|e| {
        error!(endpoint, error = %e, "failed to decode response");
        LensError::Decode(format!("{endpoint}: {e}"))
    })
}

/// Send a request and read a successful body as text.
pub(crate) async fn send_text(request: RequestBuilder, endpoint: &str) -> Result<String> {
    let response = send(request, endpoint).await?;
    response.text().await.map_err(|e| {
        warn!(endpoint, error = %e, "response body interrupted");
        LensError::Unreachable { endpoint: endpoint.to_string(), message: e.to_string() }
    })
}

/// Send a request, discarding a successful body.
pub(crate) async fn send_unit(request: RequestBuilder, endpoint: &str) -> Result<()> {
    send(request, endpoint).await.map(|_| ())
}

async fn send(request: RequestBuilder, endpoint: &str) -> Result<Response> {
    let response = request.send().await.map_err(|e| {
        warn!(endpoint, error = %e, "request failed");
        LensError::Unreachable { endpoint: endpoint.to_string(), message: e.to_string() }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(endpoint, %status, "backend returned an error status");
        return Err(LensError::BadResponse { status: status.as_u16(), body });
    }
    Ok(response)
}
