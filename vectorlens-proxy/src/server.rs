use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use vectorlens_core::live::wire::NestedQueryResult;
use vectorlens_core::{
    CollectionSummary, DeleteReceipt, DuplicateReport, Graph, SourceCounts, StoreReceipt,
    StoreRequest, SyncReport, TimelinePage,
};

use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::service::AnalyticsService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub service: Arc<AnalyticsService>,
}

impl AppState {
    pub fn new(service: AnalyticsService) -> Self {
        Self { service: Arc::new(service) }
    }
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    collection: Option<String>,
    #[serde(default)]
    query: String,
    #[serde(default = "default_n_results")]
    n_results: usize,
}

#[derive(Debug, Deserialize)]
struct CollectionBody {
    collection: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimelineBody {
    collection: Option<String>,
    #[serde(default)]
    offset: usize,
    #[serde(default = "default_timeline_limit")]
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct DuplicatesBody {
    collection: Option<String>,
    #[serde(default = "default_duplicate_threshold")]
    threshold: f32,
    #[serde(default = "default_duplicate_sample")]
    sample_size: usize,
}

#[derive(Debug, Deserialize)]
struct DeleteBody {
    collection: Option<String>,
    #[serde(default)]
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GraphBody {
    collection: Option<String>,
    #[serde(default = "default_graph_sample")]
    sample_size: usize,
    #[serde(default = "default_graph_threshold")]
    threshold: f32,
}

fn default_n_results() -> usize {
    10
}

fn default_timeline_limit() -> usize {
    100
}

fn default_duplicate_threshold() -> f32 {
    0.1
}

fn default_duplicate_sample() -> usize {
    200
}

fn default_graph_sample() -> usize {
    100
}

fn default_graph_threshold() -> f32 {
    0.15
}

/// Decode a JSON body; an empty body reads as `{}`.
fn parse<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) { b"{}" } else { &body[..] };
    serde_json::from_slice(raw).map_err(|e| ProxyError::BadRequest(format!("invalid JSON body: {e}")))
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/query", post(query))
        .route("/timeline", post(timeline))
        .route("/sources", post(sources))
        .route("/duplicates", post(duplicates))
        .route("/delete", post(delete))
        .route("/graph", post(graph))
        .route("/collections", post(collections))
        .route("/store", post(store))
        .route("/sync", post(sync))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run_server(config: ProxyConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let state = AppState::new(AnalyticsService::new(&config)?);
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind vectorlens-proxy to {addr}"))?;
    info!(
        upstream = %config.upstream.api_base,
        default_collection = %config.default_collection,
        "vectorlens-proxy listening on http://{}",
        addr
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let upstream = state.service.chroma().heartbeat().await.is_ok();
    Json(json!({ "status": "ok", "service": "vectorlens-proxy", "upstream": upstream }))
}

async fn query(State(state): State<AppState>, body: Bytes) -> Result<Json<NestedQueryResult>> {
    let body: QueryBody = parse(&body)?;
    let collection = state.service.collection_or_default(body.collection.as_deref());
    let result = state.service.query(collection, &body.query, body.n_results).await?;
    Ok(Json(NestedQueryResult::from_result(&result)))
}

async fn timeline(State(state): State<AppState>, body: Bytes) -> Result<Json<TimelinePage>> {
    let body: TimelineBody = parse(&body)?;
    let collection = state.service.collection_or_default(body.collection.as_deref());
    Ok(Json(state.service.timeline(collection, body.offset, body.limit).await?))
}

async fn sources(State(state): State<AppState>, body: Bytes) -> Result<Json<SourceCounts>> {
    let body: CollectionBody = parse(&body)?;
    let collection = state.service.collection_or_default(body.collection.as_deref());
    Ok(Json(state.service.sources(collection).await?))
}

async fn duplicates(State(state): State<AppState>, body: Bytes) -> Result<Json<DuplicateReport>> {
    let body: DuplicatesBody = parse(&body)?;
    let collection = state.service.collection_or_default(body.collection.as_deref());
    Ok(Json(state.service.duplicates(collection, body.threshold, body.sample_size).await?))
}

async fn delete(State(state): State<AppState>, body: Bytes) -> Result<Json<DeleteReceipt>> {
    let body: DeleteBody = parse(&body)?;
    let collection = state.service.collection_or_default(body.collection.as_deref());
    Ok(Json(state.service.delete(collection, &body.ids).await?))
}

async fn graph(State(state): State<AppState>, body: Bytes) -> Result<Json<Graph>> {
    let body: GraphBody = parse(&body)?;
    let collection = state.service.collection_or_default(body.collection.as_deref());
    Ok(Json(state.service.graph(collection, body.sample_size, body.threshold).await?))
}

async fn collections(State(state): State<AppState>) -> Result<Json<Vec<CollectionSummary>>> {
    Ok(Json(state.service.collections().await?))
}

async fn store(State(state): State<AppState>, body: Bytes) -> Result<Json<StoreReceipt>> {
    let request: StoreRequest = parse(&body)?;
    Ok(Json(state.service.store(&request).await?))
}

async fn sync(State(state): State<AppState>) -> Result<Json<SyncReport>> {
    Ok(Json(state.service.sync().await?))
}
