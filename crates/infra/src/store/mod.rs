//! Document store: the persistence collaborator surface.
//!
//! Records are plain JSON documents grouped into per-tenant collections and
//! addressed by a store-assigned [`DocumentId`]. Every committed write is
//! followed by a [`CollectionSnapshot`] on the store's change feed.

pub mod in_memory;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use billbook_core::{Collection, DocumentId, TenantContext};
use billbook_events::{CollectionSnapshot, Document, Subscription};

pub use in_memory::InMemoryDocumentStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    NotFound { collection: Collection, id: DocumentId },

    #[error("document could not be (de)serialized: {0}")]
    Serialization(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store lock poisoned")]
    Poisoned,
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Create/read/update/delete/subscribe over tenant-scoped collections.
///
/// The tenant is always passed explicitly through a [`TenantContext`].
/// Writes are last-write-wins; there is no concurrency token.
pub trait DocumentStore: Send + Sync {
    /// Store a new document; its body must be a JSON object.
    fn create(&self, ctx: &TenantContext, collection: Collection, data: Value) -> StoreResult<DocumentId>;

    fn get(&self, ctx: &TenantContext, collection: Collection, id: DocumentId) -> StoreResult<Document>;

    /// All documents of the collection, oldest first.
    fn list(&self, ctx: &TenantContext, collection: Collection) -> StoreResult<Vec<Document>>;

    /// Shallow-merge `patch` into the stored document: top-level keys in the
    /// patch overwrite, everything else is kept.
    fn update(&self, ctx: &TenantContext, collection: Collection, id: DocumentId, patch: Value) -> StoreResult<()>;

    fn delete(&self, ctx: &TenantContext, collection: Collection, id: DocumentId) -> StoreResult<()>;

    /// Snapshots of every collection written after this call, for all tenants.
    fn subscribe(&self) -> Subscription<CollectionSnapshot>;
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn create(&self, ctx: &TenantContext, collection: Collection, data: Value) -> StoreResult<DocumentId> {
        (**self).create(ctx, collection, data)
    }

    fn get(&self, ctx: &TenantContext, collection: Collection, id: DocumentId) -> StoreResult<Document> {
        (**self).get(ctx, collection, id)
    }

    fn list(&self, ctx: &TenantContext, collection: Collection) -> StoreResult<Vec<Document>> {
        (**self).list(ctx, collection)
    }

    fn update(&self, ctx: &TenantContext, collection: Collection, id: DocumentId, patch: Value) -> StoreResult<()> {
        (**self).update(ctx, collection, id, patch)
    }

    fn delete(&self, ctx: &TenantContext, collection: Collection, id: DocumentId) -> StoreResult<()> {
        (**self).delete(ctx, collection, id)
    }

    fn subscribe(&self) -> Subscription<CollectionSnapshot> {
        (**self).subscribe()
    }
}

/// Merge the top-level keys of `patch` into `target`.
pub(crate) fn merge_shallow(target: &mut Value, patch: Value) -> StoreResult<()> {
    match (target.as_object_mut(), patch) {
        (Some(dst), Value::Object(src)) => {
            dst.extend(src);
            Ok(())
        }
        _ => Err(StoreError::Serialization(
            "documents and patches must be JSON objects".to_string(),
        )),
    }
}
