//! Live views: in-memory copies of tenant collections kept current by the
//! store's change feed.
//!
//! Each snapshot replaces what a view holds for its tenant and collection.
//! Queued snapshots are applied on every read, so a read issued after a
//! write returns from the store always reflects that write.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use serde::de::DeserializeOwned;
use tracing::debug;

use billbook_core::{Collection, DocumentId, TenantContext, TenantId};
use billbook_events::{CollectionSnapshot, Subscription, TenantScoped};

use crate::store::{DocumentStore, StoreError, StoreResult};

#[derive(Debug)]
pub struct LiveViews {
    subscription: Mutex<Subscription<CollectionSnapshot>>,
    snapshots: RwLock<HashMap<(TenantId, Collection), CollectionSnapshot>>,
}

impl LiveViews {
    /// Subscribe to `store`. Must happen before any write the views should see.
    pub fn attach<S: DocumentStore + ?Sized>(store: &S) -> Self {
        Self {
            subscription: Mutex::new(store.subscribe()),
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Apply every snapshot queued on the subscription; returns how many.
    pub fn pump(&self) -> StoreResult<usize> {
        let sub = self.subscription.lock().map_err(|_| StoreError::Poisoned)?;
        let mut snapshots = self.snapshots.write().map_err(|_| StoreError::Poisoned)?;

        let mut applied = 0;
        while let Ok(snapshot) = sub.try_recv() {
            snapshots.insert((snapshot.tenant_id(), snapshot.collection()), snapshot);
            applied += 1;
        }
        if applied > 0 {
            debug!(applied, "live views refreshed");
        }
        Ok(applied)
    }

    /// The current record set of one tenant collection.
    ///
    /// A collection with no snapshot yet is seeded from a one-off `list`.
    pub fn snapshot<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
        ctx: &TenantContext,
        collection: Collection,
    ) -> StoreResult<CollectionSnapshot> {
        self.pump()?;
        let key = (ctx.tenant_id(), collection);

        if let Some(snapshot) = self.snapshots.read().map_err(|_| StoreError::Poisoned)?.get(&key) {
            return Ok(snapshot.clone());
        }

        let seeded = CollectionSnapshot::new(ctx.tenant_id(), collection, store.list(ctx, collection)?);
        let mut snapshots = self.snapshots.write().map_err(|_| StoreError::Poisoned)?;
        // A snapshot that raced in while listing is newer than the seed.
        Ok(snapshots.entry(key).or_insert(seeded).clone())
    }

    /// Decoded records of one tenant collection; undecodable documents are skipped.
    pub fn records<T, S>(&self, store: &S, ctx: &TenantContext, collection: Collection) -> StoreResult<Vec<(DocumentId, T)>>
    where
        T: DeserializeOwned,
        S: DocumentStore + ?Sized,
    {
        Ok(self.snapshot(store, ctx, collection)?.decode_all())
    }

    /// Number of tenant collections currently held.
    pub fn len(&self) -> usize {
        self.snapshots.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
