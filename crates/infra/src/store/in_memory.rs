use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::Value;
use tracing::{debug, warn};

use billbook_core::{Collection, CollectionPath, DocumentId, TenantContext};
use billbook_events::{ChangeFeed, CollectionSnapshot, Document, InMemoryChangeFeed, Subscription};

use super::{DocumentStore, StoreError, StoreResult, merge_shallow};

type Documents = BTreeMap<DocumentId, Value>;

/// In-memory document store for tests/dev.
///
/// Collections are keyed by their full path, so two stores with different
/// application ids never see each other's data even on a shared map. Ids are
/// time-ordered, so listing in id order is listing in creation order.
#[derive(Debug)]
pub struct InMemoryDocumentStore<F = InMemoryChangeFeed<CollectionSnapshot>> {
    app_id: String,
    inner: RwLock<HashMap<CollectionPath, Documents>>,
    feed: F,
}

impl InMemoryDocumentStore {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self::with_feed(app_id, InMemoryChangeFeed::new())
    }
}

impl<F> InMemoryDocumentStore<F>
where
    F: ChangeFeed<CollectionSnapshot>,
{
    pub fn with_feed(app_id: impl Into<String>, feed: F) -> Self {
        Self {
            app_id: app_id.into(),
            inner: RwLock::new(HashMap::new()),
            feed,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    fn path(&self, ctx: &TenantContext, collection: Collection) -> CollectionPath {
        ctx.path(&self.app_id, collection)
    }

    /// Publish the collection's full record set. Called with the write lock
    /// held so snapshots go out in commit order.
    fn publish(&self, path: &CollectionPath, docs: Option<&Documents>) {
        let documents = docs
            .map(|d| d.iter().map(|(id, data)| Document::new(*id, data.clone())).collect())
            .unwrap_or_default();
        let snapshot = CollectionSnapshot::new(path.tenant_id, path.collection, documents);

        debug!(path = %path, documents = snapshot.documents.len(), "publishing collection snapshot");
        if let Err(err) = self.feed.publish(snapshot) {
            // The write itself is committed; views catch up on the next snapshot.
            warn!(path = %path, error = ?err, "failed to publish collection snapshot");
        }
    }
}

impl<F> DocumentStore for InMemoryDocumentStore<F>
where
    F: ChangeFeed<CollectionSnapshot>,
{
    fn create(&self, ctx: &TenantContext, collection: Collection, data: Value) -> StoreResult<DocumentId> {
        if !data.is_object() {
            return Err(StoreError::Serialization("documents must be JSON objects".to_string()));
        }

        let path = self.path(ctx, collection);
        let id = DocumentId::new();
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let docs = map.entry(path.clone()).or_default();
        docs.insert(id, data);
        self.publish(&path, Some(docs));
        Ok(id)
    }

    fn get(&self, ctx: &TenantContext, collection: Collection, id: DocumentId) -> StoreResult<Document> {
        let path = self.path(ctx, collection);
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        map.get(&path)
            .and_then(|docs| docs.get(&id))
            .map(|data| Document::new(id, data.clone()))
            .ok_or(StoreError::NotFound { collection, id })
    }

    fn list(&self, ctx: &TenantContext, collection: Collection) -> StoreResult<Vec<Document>> {
        let path = self.path(ctx, collection);
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map
            .get(&path)
            .map(|docs| docs.iter().map(|(id, data)| Document::new(*id, data.clone())).collect())
            .unwrap_or_default())
    }

    fn update(&self, ctx: &TenantContext, collection: Collection, id: DocumentId, patch: Value) -> StoreResult<()> {
        let path = self.path(ctx, collection);
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let docs = map.get_mut(&path).ok_or(StoreError::NotFound { collection, id })?;
        let doc = docs.get_mut(&id).ok_or(StoreError::NotFound { collection, id })?;

        // Merge into a copy so a rejected patch leaves the document untouched.
        let mut merged = doc.clone();
        merge_shallow(&mut merged, patch)?;
        *doc = merged;

        self.publish(&path, Some(docs));
        Ok(())
    }

    fn delete(&self, ctx: &TenantContext, collection: Collection, id: DocumentId) -> StoreResult<()> {
        let path = self.path(ctx, collection);
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let removed = map.get_mut(&path).and_then(|docs| docs.remove(&id));
        if removed.is_none() {
            return Err(StoreError::NotFound { collection, id });
        }
        self.publish(&path, map.get(&path));
        Ok(())
    }

    fn subscribe(&self) -> Subscription<CollectionSnapshot> {
        self.feed.subscribe()
    }
}
