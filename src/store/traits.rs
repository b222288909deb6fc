use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Document, FieldPath, Id};

/// A single field-level mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Set { path: FieldPath, value: Value },
    /// Removes the field entirely; a missing field is left as is
    Unset { path: FieldPath },
}

/// Mutations applied atomically to one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub document_id: Id,
    pub operations: Vec<PatchOperation>,
}

impl Patch {
    pub fn new(document_id: impl Into<Id>) -> Self {
        Self {
            document_id: document_id.into(),
            operations: Vec::new(),
        }
    }

    pub fn set(mut self, path: FieldPath, value: Value) -> Self {
        self.operations.push(PatchOperation::Set { path, value });
        self
    }

    pub fn unset(mut self, path: FieldPath) -> Self {
        self.operations.push(PatchOperation::Unset { path });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Read/patch access to the document database
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a query and return matching documents in store order
    async fn fetch(&self, query: &str) -> Result<Vec<Document>>;
    /// Apply every operation of `patch` or none of them, returning once committed
    async fn commit(&self, patch: Patch) -> Result<()>;

    /// Start building a patch for `document_id`
    fn patch(&self, document_id: &str) -> PatchBuilder<'_, Self>
    where
        Self: Sized,
    {
        PatchBuilder {
            store: self,
            patch: Patch::new(document_id),
        }
    }
}

/// Fluent patch construction bound to the store that will commit it
pub struct PatchBuilder<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    patch: Patch,
}

impl<'a, S: DocumentStore + ?Sized> PatchBuilder<'a, S> {
    pub fn set(mut self, path: FieldPath, value: Value) -> Self {
        self.patch = self.patch.set(path, value);
        self
    }

    pub fn unset(mut self, path: FieldPath) -> Self {
        self.patch = self.patch.unset(path);
        self
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.patch.operations
    }

    pub fn into_patch(self) -> Patch {
        self.patch
    }

    pub async fn commit(self) -> Result<()> {
        self.store.commit(self.patch).await
    }
}

#[async_trait::async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    async fn fetch(&self, query: &str) -> Result<Vec<Document>> {
        (**self).fetch(query).await
    }

    async fn commit(&self, patch: Patch) -> Result<()> {
        (**self).commit(patch).await
    }
}
