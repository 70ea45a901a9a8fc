//! End-to-end proxy routes against an in-process fake of the vector store.

use axum::extract::{Json, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{Value, json};
use vectorlens_core::LensConfig;
use vectorlens_proxy::{AnalyticsService, AppState, ProxyConfig, app_router};

const COLLECTIONS: &str = "/api/v2/tenants/default_tenant/databases/default_database/collections";

fn stored() -> Vec<Value> {
    vec![
        json!({ "id": "c-1", "doc": "User runs k3s at home", "meta": {"source": "dm:homelab", "date": "2025-01-10"}, "emb": [1.0, 0.0] }),
        json!({ "id": "c-2", "doc": "User runs k3s on Raspberry Pis", "meta": {"source": "dm:homelab", "date": "2025-01-12"}, "emb": [0.999, 0.01] }),
        json!({ "id": "c-3", "doc": "User has a cat", "meta": {"source": "dm:personal"}, "emb": [0.0, 1.0] }),
    ]
}

async fn describe(Path(name): Path<String>) -> Response {
    if name == "notes" {
        Json(json!({ "id": "uuid-notes", "name": "notes" })).into_response()
    } else {
        (StatusCode::NOT_FOUND, format!("Collection [{name}] does not exist")).into_response()
    }
}

async fn get_chunks(Json(body): Json<Value>) -> Json<Value> {
    let limit = body["limit"].as_u64().map(|l| l as usize).unwrap_or(usize::MAX);
    let rows: Vec<Value> = stored().into_iter().take(limit).collect();
    Json(json!({
        "ids": rows.iter().map(|r| r["id"].clone()).collect::<Vec<_>>(),
        "documents": rows.iter().map(|r| r["doc"].clone()).collect::<Vec<_>>(),
        "metadatas": rows.iter().map(|r| r["meta"].clone()).collect::<Vec<_>>(),
        "embeddings": rows.iter().map(|r| r["emb"].clone()).collect::<Vec<_>>(),
    }))
}

async fn query_chunks(Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["query_texts"][0], "k3s");
    Json(json!({
        "ids": [["c-2", "c-1"]],
        "documents": [["User runs k3s on Raspberry Pis", "User runs k3s at home"]],
        "metadatas": [[{"source": "dm:homelab"}, {"source": "dm:homelab"}]],
        "distances": [[0.21, 0.34]],
    }))
}

fn fake_store() -> Router {
    Router::new()
        .route("/api/v2/heartbeat", get(|| async { Json(json!({ "nanosecond heartbeat": 1 })) }))
        .route(
            COLLECTIONS,
            get(|| async { Json(json!([{ "id": "uuid-notes", "name": "notes" }])) }).post(
                |Json(body): Json<Value>| async move {
                    assert_eq!(body["get_or_create"], true);
                    Json(json!({ "id": "uuid-memory", "name": body["name"] }))
                },
            ),
        )
        .route(&format!("{COLLECTIONS}/{{name}}"), get(describe))
        .route(&format!("{COLLECTIONS}/{{name}}/count"), get(|| async { Json(json!(3)) }))
        .route(&format!("{COLLECTIONS}/{{name}}/get"), post(get_chunks))
        .route(&format!("{COLLECTIONS}/{{name}}/query"), post(query_chunks))
        .route(&format!("{COLLECTIONS}/{{name}}/delete"), post(|| async { Json(json!([])) }))
        .route(
            &format!("{COLLECTIONS}/{{name}}/upsert"),
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["ids"].as_array().map(Vec::len), Some(1));
                Json(json!(true))
            }),
        )
}

async fn serve(app: Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });
    (format!("http://{addr}"), handle)
}

struct Harness {
    proxy: String,
    client: reqwest::Client,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Harness {
    async fn start() -> Self {
        let (store_base, store) = serve(fake_store()).await;
        let config = ProxyConfig {
            upstream: LensConfig::builder().api_base(format!("{store_base}/api/v2")).build().unwrap(),
            ..ProxyConfig::default()
        };
        let service = AnalyticsService::new(&config).unwrap();
        let (proxy, server) = serve(app_router(AppState::new(service))).await;
        Self { proxy, client: reqwest::Client::new(), handles: vec![store, server] }
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(format!("{}{path}", self.proxy))
            .json(&body)
            .send()
            .await
            .expect("proxy response");
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.expect("json body"))
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[tokio::test]
async fn health_reports_upstream() {
    let h = Harness::start().await;
    let body: Value = h
        .client
        .get(format!("{}/health", h.proxy))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["upstream"], true);
}

#[tokio::test]
async fn query_answers_in_nested_shape() {
    let h = Harness::start().await;
    let (status, body) =
        h.post("/query", json!({ "collection": "notes", "query": "k3s", "n_results": 2 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ids"], json!([["c-2", "c-1"]]));
    assert_eq!(body["distances"][0].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn duplicates_cluster_by_embedding() {
    let h = Harness::start().await;
    let (status, body) = h.post("/duplicates", json!({ "collection": "notes", "threshold": 0.05 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scanned"], 3);
    assert_eq!(body["total"], 3);

    let groups = body["duplicates"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["anchor"]["id"], "c-1");
    assert_eq!(groups[0]["similar"][0]["id"], "c-2");
    assert!(groups[0]["similar"][0]["distance"].as_f64().unwrap() < 0.05);
    assert!(groups[0]["anchor"].get("embedding").is_none());
}

#[tokio::test]
async fn graph_links_close_embeddings_only() {
    let h = Harness::start().await;
    let (status, body) = h.post("/graph", json!({ "collection": "notes", "sample_size": 10 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodes"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["nodes"][0]["label"], "User runs k3s at home");

    let links = body["links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["source"], "c-1");
    assert_eq!(links[0]["target"], "c-2");
}

#[tokio::test]
async fn timeline_orders_newest_first() {
    let h = Harness::start().await;
    let (status, body) = h.post("/timeline", json!({ "collection": "notes" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    let ids: Vec<&str> = body["items"].as_array().unwrap().iter().filter_map(|i| i["id"].as_str()).collect();
    assert_eq!(ids, vec!["c-2", "c-1", "c-3"]);
}

#[tokio::test]
async fn sources_and_collections_summaries() {
    let h = Harness::start().await;
    let (_, sources) = h.post("/sources", json!({ "collection": "notes" })).await;
    assert_eq!(sources["sources"]["dm:homelab"], 2);
    assert_eq!(sources["total"], 3);

    let (status, collections) = h.post("/collections", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(collections[0]["name"], "notes");
    assert_eq!(collections[0]["count"], 3);
}

#[tokio::test]
async fn unknown_collection_is_404_with_error_body() {
    let h = Harness::start().await;
    let (status, body) = h.post("/sources", json!({ "collection": "ghost" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn delete_requires_ids() {
    let h = Harness::start().await;
    let (status, _) = h.post("/delete", json!({ "collection": "notes", "ids": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h.post("/delete", json!({ "collection": "notes", "ids": ["c-3"] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "deleted": 1 }));
}

#[tokio::test]
async fn store_validates_and_upserts_into_default_collection() {
    let h = Harness::start().await;
    let (status, _) = h.post("/store", json!({ "text": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        h.post("/store", json!({ "text": "User prefers dark mode", "tags": "ui" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["collection"], "vectorlens-memory");
    assert_eq!(body["id"].as_str().map(str::len), Some(32));
    assert_eq!(body["chunks"], 3);
}

#[tokio::test]
async fn sync_without_command_is_reported() {
    let h = Harness::start().await;
    let (status, body) = h.post("/sync", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
}
