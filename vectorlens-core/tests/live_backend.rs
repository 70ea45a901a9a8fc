//! Live-mode dispatch against an in-process fake of the store and proxy.

use axum::extract::{Json, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{Value, json};
use vectorlens_core::{
    BackendMode, ConnectivityProbe, LensConfig, LensError, StoreRequest, connect,
};

const COLLECTIONS: &str = "/api/v2/tenants/default_tenant/databases/default_database/collections";

const IDS: [&str; 3] = ["c-1", "c-2", "c-3"];

async fn describe(Path(name): Path<String>) -> Response {
    if name == "notes" {
        Json(json!({ "id": "uuid-notes", "name": "notes", "metadata": {"hnsw:space": "cosine"} }))
            .into_response()
    } else {
        (StatusCode::NOT_FOUND, format!("Collection [{name}] does not exist")).into_response()
    }
}

async fn get_chunks(Json(body): Json<Value>) -> Json<Value> {
    let offset = body["offset"].as_u64().unwrap_or(0) as usize;
    let limit = body["limit"].as_u64().map(|l| l as usize).unwrap_or(IDS.len());
    let ids: Vec<&str> = IDS.iter().copied().skip(offset).take(limit).collect();
    let with_embeddings = body["include"]
        .as_array()
        .is_some_and(|inc| inc.iter().any(|v| v == "embeddings"));
    let embeddings = if with_embeddings {
        json!(ids.iter().map(|_| vec![1.0, 0.0]).collect::<Vec<_>>())
    } else {
        Value::Null
    };
    Json(json!({
        "ids": ids,
        "documents": ids.iter().map(|id| format!("doc {id}")).collect::<Vec<_>>(),
        "metadatas": ids.iter().map(|_| json!({"source": "test"})).collect::<Vec<_>>(),
        "embeddings": embeddings,
    }))
}

async fn proxy_query(Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["collection"], "notes");
    let n = body["n_results"].as_u64().unwrap_or(10) as usize;
    let ids: Vec<&str> = IDS.iter().copied().take(n).collect();
    Json(json!({
        "ids": [ids],
        "documents": [ids.iter().map(|id| format!("doc {id}")).collect::<Vec<_>>()],
        "metadatas": [ids.iter().map(|_| json!({})).collect::<Vec<_>>()],
        "distances": [ids.iter().enumerate().map(|(i, _)| 0.1 * (i as f64 + 1.0)).collect::<Vec<_>>()],
    }))
}

fn fake_router() -> Router {
    Router::new()
        .route("/api/v2/heartbeat", get(|| async { Json(json!({ "nanosecond heartbeat": 1 })) }))
        .route(
            COLLECTIONS,
            get(|| async { Json(json!([{ "id": "uuid-notes", "name": "notes" }])) }),
        )
        .route(&format!("{COLLECTIONS}/{{name}}"), get(describe))
        .route(&format!("{COLLECTIONS}/{{name}}/count"), get(|| async { Json(json!(3)) }))
        .route(&format!("{COLLECTIONS}/{{name}}/get"), post(get_chunks))
        .route("/proxy/query", post(proxy_query))
        .route(
            "/proxy/duplicates",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "embedding model offline") }),
        )
        .route(
            "/proxy/timeline",
            post(|| async {
                Json(json!({
                    "items": [
                        { "id": "c-2", "document": null, "metadata": {"date": "2025-01-12"}, "date": "2025-01-12" },
                        { "id": "c-1", "document": "doc c-1", "metadata": null, "date": null }
                    ],
                    "total": 3
                }))
            }),
        )
        .route(
            "/proxy/store",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "success": true, "id": "abc", "collection": "notes", "chunks": 4, "echo": body }))
            }),
        )
}

async fn spawn_fake() -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, fake_router()).await.expect("server run");
    });
    (format!("http://{addr}"), handle)
}

fn config_for(base: &str) -> LensConfig {
    LensConfig::builder()
        .api_base(format!("{base}/api/v2"))
        .proxy_base(format!("{base}/proxy"))
        .request_timeout_secs(5)
        .build()
        .unwrap()
}

/// A base URL on which nothing listens.
async fn dead_base() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn probe_selects_live_when_heartbeat_answers() {
    let (base, handle) = spawn_fake().await;
    let probe = ConnectivityProbe::new(&config_for(&base)).unwrap();
    assert!(probe.check().await);
    assert_eq!(probe.mode().await, BackendMode::Live);

    let explorer = connect(&config_for(&base)).await.unwrap();
    assert_eq!(explorer.mode(), BackendMode::Live);
    handle.abort();
}

#[tokio::test]
async fn plain_text_heartbeat_still_selects_live() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = Router::new().route("/api/v2/heartbeat", get(|| async { "ok" }));
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    let probe = ConnectivityProbe::new(&config_for(&base)).unwrap();
    assert_eq!(probe.mode().await, BackendMode::Live);

    let explorer = connect(&config_for(&base)).await.unwrap();
    let heartbeat = explorer.heartbeat().await.unwrap();
    assert_eq!(heartbeat.0, json!("ok"));
    handle.abort();
}

#[tokio::test]
async fn error_status_heartbeat_selects_simulated() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = Router::new()
        .route("/api/v2/heartbeat", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "starting") }));
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    let probe = ConnectivityProbe::new(&config_for(&base)).unwrap();
    assert_eq!(probe.mode().await, BackendMode::Simulated);
    handle.abort();
}

#[tokio::test]
async fn probe_falls_back_to_simulated_when_unreachable() {
    let config = config_for(&dead_base().await);
    let explorer = connect(&config).await.unwrap();
    assert_eq!(explorer.mode(), BackendMode::Simulated);
    assert_eq!(
        explorer.list_collections().await.unwrap(),
        vec!["ai-agent-memories".to_string(), "knowledge-base".to_string()]
    );
}

#[tokio::test]
async fn probe_memoizes_its_first_answer() {
    let (base, handle) = spawn_fake().await;
    let probe = ConnectivityProbe::new(&config_for(&base)).unwrap();
    assert!(probe.check().await);
    handle.abort();
    let _ = handle.await;
    // The server is gone, but the session keeps its mode.
    assert!(probe.check().await);
}

#[tokio::test]
async fn describe_and_page_through_the_store() {
    let (base, handle) = spawn_fake().await;
    let explorer = connect(&config_for(&base)).await.unwrap();

    assert_eq!(explorer.list_collections().await.unwrap(), vec!["notes".to_string()]);

    let collection = explorer.describe_collection("notes").await.unwrap();
    assert_eq!(collection.id, "uuid-notes");
    assert_eq!(collection.count, 3);

    let all = explorer.get_all(&collection.id, true).await.unwrap();
    assert_eq!(all.len(), collection.count);
    assert_eq!(all.embeddings.as_ref().map(Vec::len), Some(3));

    let page = explorer.get_page(&collection.id, 2, 1).await.unwrap();
    assert_eq!(page.ids, vec!["c-2", "c-3"]);

    let past_end = explorer.get_page(&collection.id, 2, 3).await.unwrap();
    assert!(past_end.is_empty());
    handle.abort();
}

#[tokio::test]
async fn missing_collection_is_not_found() {
    let (base, handle) = spawn_fake().await;
    let explorer = connect(&config_for(&base)).await.unwrap();
    let err = explorer.describe_collection("ghost").await.unwrap_err();
    assert!(matches!(err, LensError::NotFound(_)), "got {err:?}");
    handle.abort();
}

#[tokio::test]
async fn query_goes_through_the_proxy() {
    let (base, handle) = spawn_fake().await;
    let explorer = connect(&config_for(&base)).await.unwrap();

    let result = explorer.query("notes", "anything", 2).await.unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.matches[0].chunk.id, "c-1");
    assert_eq!(result.matches[0].similarity_percent(), 90);
    assert_eq!(result.rank_of("c-2"), Some(1));
    handle.abort();
}

#[tokio::test]
async fn proxy_chunks_with_null_fields_decode() {
    let (base, handle) = spawn_fake().await;
    let explorer = connect(&config_for(&base)).await.unwrap();
    let page = explorer.timeline("notes", 0, 10).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items[0].id, "c-2");
    assert!(page.items[0].document.is_empty());
    assert!(page.items[1].metadata.is_empty());
    handle.abort();
}

#[tokio::test]
async fn non_success_status_carries_the_body() {
    let (base, handle) = spawn_fake().await;
    let explorer = connect(&config_for(&base)).await.unwrap();

    let err = explorer.find_duplicates("notes", 0.1, 50).await.unwrap_err();
    match err {
        LensError::BadResponse { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "embedding model offline");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    handle.abort();
}

#[tokio::test]
async fn store_forwards_fields_and_returns_receipt() {
    let (base, handle) = spawn_fake().await;
    let explorer = connect(&config_for(&base)).await.unwrap();

    let receipt = explorer.store(&StoreRequest::new("User prefers dark mode")).await.unwrap();
    assert!(receipt.success);
    assert_eq!(receipt.collection.as_deref(), Some("notes"));
    assert_eq!(receipt.chunks, 4);
    handle.abort();
}

#[tokio::test]
async fn lost_connection_surfaces_as_unreachable() {
    let (base, handle) = spawn_fake().await;
    let explorer = connect(&config_for(&base)).await.unwrap();
    handle.abort();
    let _ = handle.await;

    let err = explorer.list_collections().await.unwrap_err();
    assert!(err.is_unreachable(), "got {err:?}");
}
