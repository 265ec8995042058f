use billbook_core::{Collection, TenantId};

use crate::CollectionSnapshot;

/// Messages that belong to a single tenant's collection.
///
/// Lets consumers subscribed to a shared feed discard messages meant for
/// other tenants or other collections.
pub trait TenantScoped {
    fn tenant_id(&self) -> TenantId;

    fn collection(&self) -> Collection;

    fn is_for(&self, tenant_id: TenantId, collection: Collection) -> bool {
        self.tenant_id() == tenant_id && self.collection() == collection
    }
}

impl TenantScoped for CollectionSnapshot {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn collection(&self) -> Collection {
        self.collection
    }
}
