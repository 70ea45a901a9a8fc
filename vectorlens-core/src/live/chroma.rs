//! Client for the vector store's REST API (`/api/v2` layout).

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::LensConfig;
use crate::error::{LensError, Result};
use crate::live::wire::{
    CollectionDescriptor, GetRequest, NestedQueryResult, QueryRequest, RawPage, send_json,
    send_text, send_unit,
};
use crate::types::{Collection, Heartbeat, Metadata, Page, QueryResult};

/// A thin client over the store's tenant/database-scoped endpoints.
#[derive(Debug, Clone)]
pub struct ChromaClient {
    client: reqwest::Client,
    api_base: String,
    tenant: String,
    database: String,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
}

#[derive(Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Metadata>,
    get_or_create: bool,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    ids: &'a [String],
    documents: &'a [String],
    metadatas: &'a [Metadata],
}

impl ChromaClient {
    /// Create a client from the configured base URL, tenant and database.
    pub fn new(config: &LensConfig) -> Result<Self> {
        Ok(Self::with_client(config.http_client()?, config))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, config: &LensConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.clone(),
            tenant: config.tenant.clone(),
            database: config.database.clone(),
        }
    }

    fn collections_url(&self) -> Result<String> {
        self.endpoint(&["tenants", self.tenant.as_str(), "databases", self.database.as_str(), "collections"])
    }

    fn collection_url(&self, id_or_name: &str, action: &str) -> Result<String> {
        let mut segments = vec![
            "tenants",
            self.tenant.as_str(),
            "databases",
            self.database.as_str(),
            "collections",
            id_or_name,
        ];
        if !action.is_empty() {
            segments.push(action);
        }
        self.endpoint(&segments)
    }

    /// Append percent-encoded path segments to the API base.
    fn endpoint(&self, segments: &[&str]) -> Result<String> {
        let mut url = reqwest::Url::parse(&self.api_base)
            .map_err(|e| LensError::Config(format!("invalid api base '{}': {e}", self.api_base)))?;
        url.path_segments_mut()
            .map_err(|_| LensError::Config(format!("api base '{}' cannot carry a path", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// `GET /heartbeat`. Any 2xx answer counts; a body that is not JSON is kept as a string.
    pub async fn heartbeat(&self) -> Result<Heartbeat> {
        let url = self.endpoint(&["heartbeat"])?;
        let body = send_text(self.client.get(&url), &url).await?;
        let value = serde_json::from_str(&body).unwrap_or(Value::String(body));
        Ok(Heartbeat(value))
    }

    /// `GET .../collections`.
    pub async fn list_collections(&self) -> Result<Vec<CollectionDescriptor>> {
        let url = self.collections_url()?;
        send_json(self.client.get(&url), &url).await
    }

    /// `GET .../collections/{name}`. A 404 becomes [`LensError::NotFound`].
    pub async fn get_collection(&self, name: &str) -> Result<CollectionDescriptor> {
        let url = self.collection_url(name, "")?;
        send_json(self.client.get(&url), &url).await.map_err(|e| not_found(e, name))
    }

    /// `GET .../collections/{id}/count`.
    pub async fn count(&self, collection_id: &str) -> Result<usize> {
        let url = self.collection_url(collection_id, "count")?;
        send_json(self.client.get(&url), &url).await.map_err(|e| not_found(e, collection_id))
    }

    /// Descriptor plus count.
    pub async fn describe(&self, name: &str) -> Result<Collection> {
        let descriptor = self.get_collection(name).await?;
        let count = self.count(&descriptor.id).await?;
        debug!(collection = name, count, "described collection");
        Ok(Collection {
            id: descriptor.id,
            name: descriptor.name,
            metadata: descriptor.metadata.unwrap_or_default(),
            count,
        })
    }

    /// `POST .../collections/{id}/get`. Omitting `limit` returns every chunk.
    pub async fn get(&self, collection_id: &str, request: &GetRequest) -> Result<Page> {
        let url = self.collection_url(collection_id, "get")?;
        let raw: RawPage = send_json(self.client.post(&url).json(request), &url)
            .await
            .map_err(|e| not_found(e, collection_id))?;
        Ok(raw.into_page())
    }

    /// `POST .../collections/{id}/query` with a text query, embedded by the store.
    pub async fn query_text(&self, collection_id: &str, text: &str, n_results: usize) -> Result<QueryResult> {
        let url = self.collection_url(collection_id, "query")?;
        let request = QueryRequest::text(text, n_results);
        let nested: NestedQueryResult = send_json(self.client.post(&url).json(&request), &url)
            .await
            .map_err(|e| not_found(e, collection_id))?;
        Ok(nested.into_result())
    }

    /// `POST .../collections/{id}/delete`.
    pub async fn delete(&self, collection_id: &str, ids: &[String]) -> Result<()> {
        let url = self.collection_url(collection_id, "delete")?;
        send_unit(self.client.post(&url).json(&DeleteRequest { ids }), &url)
            .await
            .map_err(|e| not_found(e, collection_id))
    }

    /// `POST .../collections` with `get_or_create`.
    pub async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: Option<&Metadata>,
    ) -> Result<CollectionDescriptor> {
        let url = self.collections_url()?;
        let body = CreateCollectionRequest { name, metadata, get_or_create: true };
        send_json(self.client.post(&url).json(&body), &url).await
    }

    /// `POST .../collections/{id}/upsert` with documents only; the store embeds them.
    pub async fn upsert(
        &self,
        collection_id: &str,
        ids: &[String],
        documents: &[String],
        metadatas: &[Metadata],
    ) -> Result<()> {
        if ids.len() != documents.len() || ids.len() != metadatas.len() {
            return Err(LensError::InvalidInput(
                "ids, documents and metadatas must have the same length".to_string(),
            ));
        }
        let url = self.collection_url(collection_id, "upsert")?;
        send_unit(self.client.post(&url).json(&UpsertRequest { ids, documents, metadatas }), &url)
            .await
    }
}

fn not_found(error: LensError, what: &str) -> LensError {
    match error {
        LensError::BadResponse { status: 404, .. } => {
            LensError::NotFound(format!("collection '{what}'"))
        }
        other => other,
    }
}
