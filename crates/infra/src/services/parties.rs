use std::sync::Arc;

use tracing::info;

use billbook_core::{DocumentId, Record, TenantContext};
use billbook_parties::{CustomerId, CustomerRecord, EntityId, EntityRecord, Party, PartyKind, ensure_unique};

use crate::services::{ServiceError, ServiceResult};
use crate::store::{DocumentStore, StoreError};
use crate::views::LiveViews;

/// A party as listed to clients: id plus fields, flat.
pub type PartyRecord = Record<DocumentId, Party>;

/// Entity and customer master data.
#[derive(Debug, Clone)]
pub struct PartyService<S> {
    store: S,
    views: Arc<LiveViews>,
}

impl<S> PartyService<S>
where
    S: DocumentStore,
{
    pub fn new(store: S, views: Arc<LiveViews>) -> Self {
        Self { store, views }
    }

    /// All parties of `kind`, optionally narrowed by a name search term.
    pub fn list(&self, ctx: &TenantContext, kind: PartyKind, term: Option<&str>) -> ServiceResult<Vec<PartyRecord>> {
        let term = term.unwrap_or_default();
        Ok(self
            .all(ctx, kind)?
            .into_iter()
            .filter(|(_, party)| party.matches_name(term))
            .map(|(id, party)| Record::new(id, party))
            .collect())
    }

    pub fn get(&self, ctx: &TenantContext, kind: PartyKind, id: DocumentId) -> ServiceResult<Party> {
        let doc = self
            .store
            .get(ctx, kind.collection(), id)
            .map_err(|e| not_found(kind, id, e))?;
        Ok(doc.decode()?)
    }

    /// Normalize, validate and store a new party.
    pub fn create(&self, ctx: &TenantContext, kind: PartyKind, mut party: Party) -> ServiceResult<PartyRecord> {
        party.normalize();
        party.validate(kind)?;
        let existing = self.all(ctx, kind)?;
        ensure_unique(kind, &party, existing.iter().map(|(id, p)| (*id, p)), None)?;

        let id = self.store.create(ctx, kind.collection(), serde_json::to_value(&party)?)?;
        info!(tenant_id = %ctx.tenant_id(), party_id = %id, kind = kind.label(), "party created");
        Ok(Record::new(id, party))
    }

    /// Replace a party's fields. Existing invoices keep their reference and
    /// are not touched.
    pub fn update(
        &self,
        ctx: &TenantContext,
        kind: PartyKind,
        id: DocumentId,
        mut party: Party,
    ) -> ServiceResult<PartyRecord> {
        self.get(ctx, kind, id)?;
        party.normalize();
        party.validate(kind)?;
        let existing = self.all(ctx, kind)?;
        ensure_unique(kind, &party, existing.iter().map(|(id, p)| (*id, p)), Some(id))?;

        self.store
            .update(ctx, kind.collection(), id, serde_json::to_value(&party)?)
            .map_err(|e| not_found(kind, id, e))?;
        info!(tenant_id = %ctx.tenant_id(), party_id = %id, kind = kind.label(), "party updated");
        Ok(Record::new(id, party))
    }

    /// Delete a party. Invoices referencing it are left with a dangling id.
    pub fn delete(&self, ctx: &TenantContext, kind: PartyKind, id: DocumentId) -> ServiceResult<()> {
        self.store
            .delete(ctx, kind.collection(), id)
            .map_err(|e| not_found(kind, id, e))?;
        info!(tenant_id = %ctx.tenant_id(), party_id = %id, kind = kind.label(), "party deleted");
        Ok(())
    }

    pub fn entities(&self, ctx: &TenantContext) -> ServiceResult<Vec<EntityRecord>> {
        Ok(self
            .all(ctx, PartyKind::Entity)?
            .into_iter()
            .map(|(id, p)| Record::new(EntityId::new(id), p))
            .collect())
    }

    pub fn customers(&self, ctx: &TenantContext) -> ServiceResult<Vec<CustomerRecord>> {
        Ok(self
            .all(ctx, PartyKind::Customer)?
            .into_iter()
            .map(|(id, p)| Record::new(CustomerId::new(id), p))
            .collect())
    }

    fn all(&self, ctx: &TenantContext, kind: PartyKind) -> ServiceResult<Vec<(DocumentId, Party)>> {
        Ok(self.views.records(&self.store, ctx, kind.collection())?)
    }
}

fn not_found(kind: PartyKind, id: DocumentId, err: StoreError) -> ServiceError {
    match err {
        StoreError::NotFound { .. } => ServiceError::NotFound(format!("{} {id} not found", kind.label())),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;
    use billbook_core::TenantId;
    use billbook_parties::{GstRegistration, PlaceOfSupply};

    fn service() -> PartyService<Arc<InMemoryDocumentStore>> {
        let store = Arc::new(InMemoryDocumentStore::new("test"));
        let views = Arc::new(LiveViews::attach(&store));
        PartyService::new(store, views)
    }

    fn entity(name: &str) -> Party {
        let mut p = Party::new(name, GstRegistration::Yes);
        p.gstin = Some("27aapfu0939f1zv".to_string());
        p.email = "accounts@acme.in".to_string();
        p.phone = "022 5550 0000".to_string();
        p
    }

    #[test]
    fn create_normalizes_and_lists() {
        let svc = service();
        let ctx = TenantContext::new(TenantId::new());

        let created = svc.create(&ctx, PartyKind::Entity, entity(" Acme ")).unwrap();
        assert_eq!(created.data.name, "Acme");
        assert_eq!(created.data.pan.as_deref(), Some("AAPFU0939F"));
        assert_eq!(created.data.place_of_supply, Some(PlaceOfSupply::Maharashtra));

        let listed = svc.list(&ctx, PartyKind::Entity, Some("acm")).unwrap();
        assert_eq!(listed, vec![created.clone()]);
        assert!(svc.list(&ctx, PartyKind::Entity, Some("zzz")).unwrap().is_empty());
        assert_eq!(svc.entities(&ctx).unwrap()[0].id, EntityId::new(created.id));
    }

    #[test]
    fn duplicates_are_rejected_on_create_and_update() {
        let svc = service();
        let ctx = TenantContext::new(TenantId::new());
        let first = svc.create(&ctx, PartyKind::Entity, entity("Acme")).unwrap();
        let second = svc.create(&ctx, PartyKind::Entity, entity("Globex")).unwrap();

        assert!(matches!(
            svc.create(&ctx, PartyKind::Entity, entity("ACME")),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.update(&ctx, PartyKind::Entity, second.id, entity("acme")),
            Err(ServiceError::Validation(_))
        ));
        // Saving a record under its own name is fine.
        assert!(svc.update(&ctx, PartyKind::Entity, first.id, entity("Acme")).is_ok());
    }

    #[test]
    fn update_clears_removed_tax_ids() {
        let svc = service();
        let ctx = TenantContext::new(TenantId::new());
        let mut customer = entity("Walk-in");
        let created = svc.create(&ctx, PartyKind::Customer, customer.clone()).unwrap();

        customer.is_gst_registered = GstRegistration::No;
        customer.gstin = None;
        customer.pan = None;
        customer.place_of_supply = None;
        svc.update(&ctx, PartyKind::Customer, created.id, customer).unwrap();

        let stored = svc.get(&ctx, PartyKind::Customer, created.id).unwrap();
        assert_eq!(stored.gstin, None);
        assert_eq!(stored.pan, None);
    }

    #[test]
    fn missing_party_is_not_found() {
        let svc = service();
        let ctx = TenantContext::new(TenantId::new());
        let err = svc.delete(&ctx, PartyKind::Customer, DocumentId::new()).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg.starts_with("customer")));
    }
}
