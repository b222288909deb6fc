use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use ref_converter::config::StoreConfig;
use ref_converter::store::mutation_body;
use ref_converter::{
    build_patch, find_references, scan_documents, ConversionMode, ConverterConfig,
    ConverterError, Document, DocumentStore, HttpDocumentStore, Patch, ReferenceGroup,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What the fake document store saw for one request
#[derive(Debug, Clone)]
struct ReceivedRequest {
    dataset: String,
    params: HashMap<String, String>,
    authorization: Option<String>,
    body: Option<Value>,
}

/// Fake document store: records requests and answers with canned replies
struct FakeStore {
    received: Mutex<Vec<ReceivedRequest>>,
    query_reply: Mutex<(StatusCode, Value)>,
    mutate_reply: Mutex<(StatusCode, Value)>,
}

impl FakeStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            received: Mutex::new(Vec::new()),
            query_reply: Mutex::new((StatusCode::OK, json!({"result": []}))),
            mutate_reply: Mutex::new((StatusCode::OK, json!({"transactionId": "tx-1"}))),
        })
    }

    fn reply_to_queries(&self, status: StatusCode, body: Value) {
        *self.query_reply.lock().unwrap() = (status, body);
    }

    fn reply_to_mutations(&self, status: StatusCode, body: Value) {
        *self.mutate_reply.lock().unwrap() = (status, body);
    }

    fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().unwrap().clone()
    }

    fn record(&self, dataset: String, params: HashMap<String, String>, headers: &HeaderMap, body: Option<Value>) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.received.lock().unwrap().push(ReceivedRequest {
            dataset,
            params,
            authorization,
            body,
        });
    }
}

async fn query(
    State(fake): State<Arc<FakeStore>>,
    Path(dataset): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    fake.record(dataset, params, &headers, None);
    let (status, body) = fake.query_reply.lock().unwrap().clone();
    (status, Json(body))
}

async fn mutate(
    State(fake): State<Arc<FakeStore>>,
    Path(dataset): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.record(dataset, params, &headers, Some(body));
    let (status, body) = fake.mutate_reply.lock().unwrap().clone();
    (status, Json(body))
}

async fn spawn_fake_store(fake: Arc<FakeStore>) -> SocketAddr {
    let app = Router::new()
        .route("/v1/data/query/:dataset", get(query))
        .route("/v1/data/mutate/:dataset", post(mutate))
        .with_state(fake);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, token: Option<&str>) -> HttpDocumentStore {
    let config = StoreConfig {
        base_url: format!("http://{}/v1/", addr),
        dataset: "staging".to_string(),
        token: None,
        timeout_secs: 5,
    };
    HttpDocumentStore::new(&config, token.map(str::to_string)).unwrap()
}

#[tokio::test]
async fn fetch_sends_query_and_bearer_token() {
    let fake = FakeStore::new();
    fake.reply_to_queries(
        StatusCode::OK,
        json!({"ms": 3, "result": [{"_id": "a", "_type": "post"}, {"_id": "b", "_type": "post"}]}),
    );
    let store = client(spawn_fake_store(fake.clone()).await, Some("secret"));

    let docs = store.fetch(r#"*[_type == "post"]"#).await.unwrap();
    let ids: Vec<_> = docs.iter().filter_map(Document::id).collect();
    assert_eq!(ids, vec!["a", "b"]);

    let received = fake.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].dataset, "staging");
    assert_eq!(received[0].params["query"], r#"*[_type == "post"]"#);
    assert_eq!(received[0].authorization.as_deref(), Some("Bearer secret"));
    println!("✓ Query string and bearer token reach the store");
}

#[tokio::test]
async fn fetch_without_token_sends_no_authorization() {
    let fake = FakeStore::new();
    let store = client(spawn_fake_store(fake.clone()).await, None);

    store.fetch("*").await.unwrap();
    assert_eq!(fake.received()[0].authorization, None);
}

#[tokio::test]
async fn fetch_unwraps_null_and_single_results() {
    let fake = FakeStore::new();
    let store = client(spawn_fake_store(fake.clone()).await, None);

    fake.reply_to_queries(StatusCode::OK, json!({"result": null}));
    assert!(store.fetch("*[_id == \"missing\"][0]").await.unwrap().is_empty());

    fake.reply_to_queries(StatusCode::OK, json!({"result": {"_id": "only", "title": "One"}}));
    let docs = store.fetch("*[_id == \"only\"][0]").await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id(), Some("only"));

    fake.reply_to_queries(StatusCode::OK, json!({"result": 42}));
    let err = store.fetch("count(*)").await.unwrap_err();
    assert!(format!("{:#}", err).contains("non-document result"));
}

#[tokio::test]
async fn rejected_query_carries_status_and_description() {
    let fake = FakeStore::new();
    fake.reply_to_queries(
        StatusCode::BAD_REQUEST,
        json!({"error": {"description": "expected ']' following expression", "type": "queryParseError"}}),
    );
    let store = client(spawn_fake_store(fake).await, None);

    let err = store.fetch("*[_type == ").await.unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Query rejected"), "{}", message);
    assert!(message.contains("400"), "{}", message);
    assert!(message.contains("expected ']' following expression"), "{}", message);

    // A scan over the same store surfaces it as a query error
    let config = ConverterConfig {
        custom_query: Some("*[_type == ".to_string()),
        ..Default::default()
    };
    match scan_documents(&store, &config).await {
        Err(ConverterError::Query(detail)) => {
            assert!(detail.contains("expected ']' following expression"), "{}", detail)
        }
        other => panic!("expected a query error, got {:?}", other.map(|g| g.len())),
    }
    println!("✓ Store errors keep their status and description");
}

#[tokio::test]
async fn commit_posts_mutation_body() {
    let fake = FakeStore::new();
    let store = client(spawn_fake_store(fake.clone()).await, Some("secret"));

    let doc = json!({
        "_id": "post-1",
        "author": {"_type": "reference", "_ref": "person-1"},
        "labels": {"en.US": {"_type": "reference", "_ref": "term-1"}}
    });
    let occurrences = find_references(&doc, ConversionMode::StrongToWeak);
    let group = ReferenceGroup::new(Document::new(doc), occurrences).unwrap();
    let patch = build_patch(&group, ConversionMode::StrongToWeak);
    let expected = mutation_body(&patch);

    store.commit(patch).await.unwrap();

    let received = fake.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].params["returnIds"], "true");
    assert_eq!(received[0].params["visibility"], "sync");
    assert_eq!(received[0].authorization.as_deref(), Some("Bearer secret"));
    assert_eq!(received[0].body.as_ref(), Some(&expected));
    assert_eq!(
        expected["mutations"][0]["patch"]["set"],
        json!({"author._weak": true, "labels[\"en.US\"]._weak": true})
    );
    println!("✓ Commit sends the grouped mutation");
}

#[tokio::test]
async fn empty_patch_sends_nothing() {
    let fake = FakeStore::new();
    let store = client(spawn_fake_store(fake.clone()).await, None);

    store.commit(Patch::new("post-1")).await.unwrap();
    assert!(fake.received().is_empty());
}

#[tokio::test]
async fn rejected_mutation_carries_status_and_description() {
    let fake = FakeStore::new();
    fake.reply_to_mutations(
        StatusCode::CONFLICT,
        json!({"error": {"description": "Document revision mismatch"}}),
    );
    let store = client(spawn_fake_store(fake).await, None);

    let patch = Patch::new("post-1").set("author._weak".parse().unwrap(), json!(true));
    let message = format!("{:#}", store.commit(patch).await.unwrap_err());
    assert!(message.contains("409"), "{}", message);
    assert!(message.contains("Document revision mismatch"), "{}", message);
}

#[tokio::test]
async fn unreadable_error_body_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 4096];
        let _ = socket.read(&mut request).await.unwrap();
        // Promise more body than is sent, then hang up
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\nshort")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });
    let store = client(addr, None);

    let message = format!("{:#}", store.fetch("*").await.unwrap_err());
    assert!(message.contains("500"), "{}", message);
    assert!(message.contains("failed to read error body"), "{}", message);
}
