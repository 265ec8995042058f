use crate::collection::{Collection, CollectionPath};
use crate::id::TenantId;

/// Explicit tenant context threaded into every persistence call.
///
/// Immutable; there is no process-wide "current user".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn path(&self, app_id: &str, collection: Collection) -> CollectionPath {
        CollectionPath::new(app_id, self.tenant_id, collection)
    }
}
