//! Collection names and tenant-scoped storage paths.

use serde::{Deserialize, Serialize};

use crate::id::TenantId;

/// A logical collection in the document store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Entities,
    Customers,
    Invoices,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Entities, Collection::Customers, Collection::Invoices];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Entities => "entities",
            Collection::Customers => "customers",
            Collection::Invoices => "invoices",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully-qualified location of a tenant's collection:
/// `/artifacts/{app_id}/users/{tenant}/{collection}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    pub app_id: String,
    pub tenant_id: TenantId,
    pub collection: Collection,
}

impl CollectionPath {
    pub fn new(app_id: impl Into<String>, tenant_id: TenantId, collection: Collection) -> Self {
        Self {
            app_id: app_id.into(),
            tenant_id,
            collection,
        }
    }
}

impl core::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "/artifacts/{}/users/{}/{}",
            self.app_id, self.tenant_id, self.collection
        )
    }
}
