use anyhow::{anyhow, Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::config::StoreConfig;
use crate::model::Document;
use crate::store::traits::{DocumentStore, Patch, PatchOperation};

/// Document store reached over its HTTP query and mutation endpoints
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
    dataset: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: Value,
}

impl HttpDocumentStore {
    pub fn new(config: &StoreConfig, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dataset: config.dataset.clone(),
            token,
        })
    }

    fn query_url(&self) -> String {
        format!("{}/data/query/{}", self.base_url, self.dataset)
    }

    fn mutate_url(&self) -> String {
        format!("{}/data/mutate/{}", self.base_url, self.dataset)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Turn a non-2xx response into an error carrying the status and the server's message
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = match response.text().await {
        Ok(body) => error_detail(body),
        Err(e) => format!("failed to read error body: {}", e),
    };

    Err(anyhow!("{}: {}", status, detail))
}

/// Server message from a JSON error body, or the raw body when it has none
fn error_detail(body: String) -> String {
    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/description")
                .or_else(|| v.pointer("/error/message"))
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(body)
}

/// Wire form of a patch: `{"patch": {"id", "set": {...}, "unset": [...]}}`
pub fn mutation_body(patch: &Patch) -> Value {
    let mut set = Map::new();
    let mut unset = Vec::new();

    for operation in &patch.operations {
        match operation {
            PatchOperation::Set { path, value } => {
                set.insert(path.to_string(), value.clone());
            }
            PatchOperation::Unset { path } => unset.push(Value::String(path.to_string())),
        }
    }

    let mut body = Map::new();
    body.insert("id".to_string(), Value::String(patch.document_id.clone()));
    if !set.is_empty() {
        body.insert("set".to_string(), Value::Object(set));
    }
    if !unset.is_empty() {
        body.insert("unset".to_string(), Value::Array(unset));
    }

    json!({ "mutations": [{ "patch": body }] })
}

#[async_trait::async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn fetch(&self, query: &str) -> Result<Vec<Document>> {
        log::debug!("Fetching documents: {}", query);

        let request = self.client.get(self.query_url()).query(&[("query", query)]);
        let response = self
            .authorize(request)
            .send()
            .await
            .context("Failed to reach document store")?;
        let response = check_status(response).await.context("Query rejected")?;

        let body: QueryResponse = response
            .json()
            .await
            .context("Failed to decode query response")?;

        match body.result {
            Value::Array(items) => Ok(items.into_iter().map(Document::new).collect()),
            Value::Null => Ok(Vec::new()),
            // Queries selecting a single document return it unwrapped
            single @ Value::Object(_) => Ok(vec![Document::new(single)]),
            other => Err(anyhow!("Query returned a non-document result: {}", other)),
        }
    }

    async fn commit(&self, patch: Patch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let request = self
            .client
            .post(self.mutate_url())
            .query(&[("returnIds", "true"), ("visibility", "sync")])
            .json(&mutation_body(&patch));
        let response = self
            .authorize(request)
            .send()
            .await
            .context("Failed to reach document store")?;
        check_status(response).await?;

        Ok(())
    }
}
