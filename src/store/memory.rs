use anyhow::{anyhow, bail, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::model::{Document, FieldPath, Id, PathSegment};
use crate::store::traits::{DocumentStore, Patch, PatchOperation};

/// Document store held in memory.
///
/// Queries are recorded but not evaluated: `fetch` returns every stored document in
/// insertion order. Commits follow the HTTP store's semantics and are all-or-nothing.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<Vec<Document>>,
    queries: RwLock<Vec<String>>,
    commits: RwLock<Vec<Patch>>,
    fetch_failure: RwLock<Option<String>>,
    commit_failures: RwLock<HashMap<Id, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: impl IntoIterator<Item = Value>) -> Self {
        Self {
            documents: RwLock::new(documents.into_iter().map(Document::new).collect()),
            ..Self::default()
        }
    }

    pub async fn insert(&self, document: Value) {
        self.documents.write().await.push(Document::new(document));
    }

    pub async fn get(&self, id: &str) -> Option<Document> {
        let documents = self.documents.read().await;
        documents.iter().find(|doc| doc.id() == Some(id)).cloned()
    }

    pub async fn documents(&self) -> Vec<Document> {
        self.documents.read().await.clone()
    }

    /// Every query passed to `fetch`, oldest first
    pub async fn queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Every patch that was successfully committed, oldest first
    pub async fn commits(&self) -> Vec<Patch> {
        self.commits.read().await.clone()
    }

    /// Make subsequent fetches fail with `message`; `None` restores normal behaviour
    pub async fn fail_fetch(&self, message: Option<&str>) {
        *self.fetch_failure.write().await = message.map(str::to_string);
    }

    /// Make every commit against `document_id` fail with `message`
    pub async fn fail_commit(&self, document_id: &str, message: &str) {
        self.commit_failures
            .write()
            .await
            .insert(document_id.to_string(), message.to_string());
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryStore {
    async fn fetch(&self, query: &str) -> Result<Vec<Document>> {
        self.queries.write().await.push(query.to_string());

        if let Some(message) = self.fetch_failure.read().await.as_ref() {
            bail!("{}", message);
        }

        Ok(self.documents.read().await.clone())
    }

    async fn commit(&self, patch: Patch) -> Result<()> {
        if let Some(message) = self.commit_failures.read().await.get(&patch.document_id) {
            bail!("{}", message);
        }

        let mut documents = self.documents.write().await;
        let document = documents
            .iter_mut()
            .find(|doc| doc.id() == Some(patch.document_id.as_str()))
            .ok_or_else(|| anyhow!("Document not found: {}", patch.document_id))?;

        // Work on a copy so a failing operation leaves the stored document untouched
        let mut updated = document.as_value().clone();
        for operation in &patch.operations {
            apply_operation(&mut updated, operation)?;
        }
        *document = Document::new(updated);
        drop(documents);

        self.commits.write().await.push(patch);
        Ok(())
    }
}

/// Apply one operation to a JSON tree in place
pub fn apply_operation(root: &mut Value, operation: &PatchOperation) -> Result<()> {
    match operation {
        PatchOperation::Set { path, value } => set_path(root, path, value.clone()),
        PatchOperation::Unset { path } => {
            unset_path(root, path);
            Ok(())
        }
    }
}

fn set_path(root: &mut Value, path: &FieldPath, value: Value) -> Result<()> {
    let Some((last, parents)) = path.segments().split_last() else {
        bail!("Cannot set the document root");
    };

    let mut current = root;
    for segment in parents {
        current = match segment {
            PathSegment::Key(key) => {
                let map = current
                    .as_object_mut()
                    .ok_or_else(|| anyhow!("Cannot set {}: '{}' is not inside an object", path, key))?;
                map.entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()))
            }
            PathSegment::Index(index) => current
                .as_array_mut()
                .and_then(|items| items.get_mut(*index))
                .ok_or_else(|| anyhow!("Cannot set {}: index {} out of range", path, index))?,
        };
    }

    match last {
        PathSegment::Key(key) => {
            let map = current
                .as_object_mut()
                .ok_or_else(|| anyhow!("Cannot set {}: parent is not an object", path))?;
            map.insert(key.clone(), value);
        }
        PathSegment::Index(index) => {
            let slot = current
                .as_array_mut()
                .and_then(|items| items.get_mut(*index))
                .ok_or_else(|| anyhow!("Cannot set {}: index {} out of range", path, index))?;
            *slot = value;
        }
    }
    Ok(())
}

fn unset_path(root: &mut Value, path: &FieldPath) {
    let Some((last, parents)) = path.segments().split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        let next = match segment {
            PathSegment::Key(key) => current.get_mut(key.as_str()),
            PathSegment::Index(index) => current.get_mut(*index),
        };
        match next {
            Some(value) => current = value,
            None => return,
        }
    }

    match last {
        PathSegment::Key(key) => {
            if let Some(map) = current.as_object_mut() {
                map.shift_remove(key.as_str());
            }
        }
        PathSegment::Index(index) => {
            if let Some(items) = current.as_array_mut() {
                if *index < items.len() {
                    items.remove(*index);
                }
            }
        }
    }
}
