//! Snapshot messages: the full, authoritative record set of one collection.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use billbook_core::{Collection, DocumentId, TenantId};

/// A stored document: store-assigned id plus its JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub data: Value,
}

impl Document {
    pub fn new(id: DocumentId, data: Value) -> Self {
        Self { id, data }
    }

    /// Decode the body into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}

/// Every record currently visible in a tenant's collection.
///
/// Consumers must treat each snapshot as a full replacement of what they
/// hold, never as an incremental diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub tenant_id: TenantId,
    pub collection: Collection,
    pub documents: Vec<Document>,
    pub published_at: DateTime<Utc>,
}

impl CollectionSnapshot {
    pub fn new(tenant_id: TenantId, collection: Collection, documents: Vec<Document>) -> Self {
        Self {
            tenant_id,
            collection,
            documents,
            published_at: Utc::now(),
        }
    }

    /// Decode all documents, skipping (and logging) any that do not fit `T`.
    pub fn decode_all<T: DeserializeOwned>(&self) -> Vec<(DocumentId, T)> {
        self.documents
            .iter()
            .filter_map(|doc| match doc.decode::<T>() {
                Ok(record) => Some((doc.id, record)),
                Err(e) => {
                    tracing::warn!(
                        collection = %self.collection,
                        document_id = %doc.id,
                        "skipping undecodable document: {e}"
                    );
                    None
                }
            })
            .collect()
    }
}
