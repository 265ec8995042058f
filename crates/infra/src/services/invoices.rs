use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tracing::{info, warn};

use billbook_core::{Collection, DocumentId, Record, TenantContext};
use billbook_invoicing::report::is_outstanding;
use billbook_invoicing::{
    AgingReport, Evaluation, GroupBy, Invoice, InvoiceDocument, InvoiceDraft, InvoiceFilter,
    InvoiceGroup, InvoiceId, InvoiceRecord, InvoiceStatus, aging_report, group_invoices,
};
use billbook_parties::{CustomerId, EntityId, Party};

use crate::services::{Clock, PartyService, ServiceError, ServiceResult, system_clock};
use crate::store::{DocumentStore, StoreError};
use crate::views::LiveViews;

/// Entities and customers of one tenant, indexed for lookups.
struct PartyIndex {
    entities: HashMap<EntityId, Party>,
    customers: HashMap<CustomerId, Party>,
}

impl PartyIndex {
    fn entity(&self, id: Option<EntityId>) -> Option<&Party> {
        id.and_then(|id| self.entities.get(&id))
    }

    fn customer(&self, id: Option<CustomerId>) -> Option<&Party> {
        id.and_then(|id| self.customers.get(&id))
    }
}

/// Invoice creation, editing, status changes and reporting.
#[derive(Debug, Clone)]
pub struct InvoiceService<S> {
    store: S,
    views: Arc<LiveViews>,
    parties: PartyService<S>,
    default_payment_terms: u32,
    clock: Clock,
}

impl<S> InvoiceService<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S, views: Arc<LiveViews>, default_payment_terms: u32) -> Self {
        Self {
            parties: PartyService::new(store.clone(), views.clone()),
            store,
            views,
            default_payment_terms,
            clock: system_clock,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)().date_naive()
    }

    pub fn list(&self, ctx: &TenantContext, filter: &InvoiceFilter) -> ServiceResult<Vec<InvoiceRecord>> {
        let invoices = self.all(ctx)?;
        let parties = self.party_index(ctx)?;
        Ok(filter
            .apply(&invoices, |id| parties.customers.get(&id).map(|c| c.name.as_str()))
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn get(&self, ctx: &TenantContext, id: InvoiceId) -> ServiceResult<InvoiceRecord> {
        let doc = self
            .store
            .get(ctx, Collection::Invoices, id.document_id())
            .map_err(|e| not_found(id, e))?;
        Ok(Record::new(id, doc.decode()?))
    }

    /// Evaluate an unsaved draft: coerced type, tax context, due date and
    /// totals. Nothing is written.
    pub fn preview(&self, ctx: &TenantContext, draft: &InvoiceDraft) -> ServiceResult<Evaluation> {
        let parties = self.party_index(ctx)?;
        Ok(draft.evaluate(
            parties.entity(draft.entity_id),
            parties.customer(draft.customer_id),
            self.today(),
            self.default_payment_terms,
        )?)
    }

    pub fn create(&self, ctx: &TenantContext, draft: &InvoiceDraft) -> ServiceResult<InvoiceRecord> {
        let parties = self.party_index(ctx)?;
        let (entity, customer) = resolve_selection(&parties, draft)?;

        let (invoice, eval) = Invoice::create(
            draft,
            Some(entity),
            Some(customer),
            self.today(),
            self.default_payment_terms,
            (self.clock)(),
        )?;
        log_coercion(ctx, None, draft, &eval);

        let id = self.store.create(ctx, Collection::Invoices, serde_json::to_value(&invoice)?)?;
        let id = InvoiceId::new(id);
        info!(
            tenant_id = %ctx.tenant_id(),
            invoice_id = %id,
            invoice_number = invoice.invoice_number(),
            status = %invoice.status(),
            total = %invoice.total(),
            "invoice created"
        );
        Ok(Record::new(id, invoice))
    }

    /// Full edit of an invoice in an editable status. Every derived field is
    /// recomputed before the record is written back.
    pub fn update(&self, ctx: &TenantContext, id: InvoiceId, draft: &InvoiceDraft) -> ServiceResult<InvoiceRecord> {
        let mut record = self.get(ctx, id)?;
        let parties = self.party_index(ctx)?;
        let (entity, customer) = resolve_selection(&parties, draft)?;

        let eval = record.data.revise(draft, Some(entity), Some(customer))?;
        log_coercion(ctx, Some(id), draft, &eval);

        self.store
            .update(ctx, Collection::Invoices, id.document_id(), serde_json::to_value(&record.data)?)
            .map_err(|e| not_found(id, e))?;
        info!(
            tenant_id = %ctx.tenant_id(),
            invoice_id = %id,
            status = %record.data.status(),
            total = %record.data.total(),
            "invoice updated"
        );
        Ok(record)
    }

    /// Move the invoice to `target`. Only the status field is written.
    pub fn transition(&self, ctx: &TenantContext, id: InvoiceId, target: InvoiceStatus) -> ServiceResult<InvoiceRecord> {
        let mut record = self.get(ctx, id)?;
        let from = record.data.status();
        let to = record.data.transition_to(target)?;

        self.store
            .update(ctx, Collection::Invoices, id.document_id(), json!({ "status": to }))
            .map_err(|e| not_found(id, e))?;
        info!(tenant_id = %ctx.tenant_id(), invoice_id = %id, %from, %to, "invoice status changed");
        Ok(record)
    }

    /// Delete an invoice in any status.
    pub fn delete(&self, ctx: &TenantContext, id: InvoiceId) -> ServiceResult<()> {
        let record = self.get(ctx, id)?;
        let status = record.data.status();
        if matches!(status, InvoiceStatus::Sent | InvoiceStatus::Paid) {
            warn!(
                tenant_id = %ctx.tenant_id(),
                invoice_id = %id,
                %status,
                invoice_number = record.data.invoice_number(),
                "deleting an invoice that has already been sent"
            );
        }

        self.store
            .delete(ctx, Collection::Invoices, id.document_id())
            .map_err(|e| not_found(id, e))?;
        info!(tenant_id = %ctx.tenant_id(), invoice_id = %id, "invoice deleted");
        Ok(())
    }

    /// Printable projection with the parties resolved as they are now.
    pub fn document(&self, ctx: &TenantContext, id: InvoiceId) -> ServiceResult<InvoiceDocument> {
        let record = self.get(ctx, id)?;
        let parties = self.party_index(ctx)?;
        Ok(InvoiceDocument::project(
            &record.data,
            parties.entity(Some(record.data.entity_id())),
            parties.customer(Some(record.data.customer_id())),
        ))
    }

    pub fn aging(&self, ctx: &TenantContext, today: Option<NaiveDate>) -> ServiceResult<AgingReport> {
        let today = today.unwrap_or_else(|| self.today());
        Ok(aging_report(&self.all(ctx)?, today))
    }

    pub fn grouped(&self, ctx: &TenantContext, by: GroupBy) -> ServiceResult<Vec<InvoiceGroup>> {
        let invoices = self.all(ctx)?;
        let parties = self.party_index(ctx)?;
        Ok(group_invoices(&invoices, by, |by, key| {
            let id = key.parse::<DocumentId>().ok()?;
            let party = match by {
                GroupBy::Customer => parties.customers.get(&CustomerId::new(id)),
                GroupBy::Entity => parties.entities.get(&EntityId::new(id)),
                GroupBy::Type | GroupBy::Status => None,
            };
            party.map(|p| p.name.clone())
        }))
    }

    /// Outstanding (Invoiced or Sent) invoices, oldest first by creation time.
    pub fn outstanding(&self, ctx: &TenantContext) -> ServiceResult<Vec<InvoiceRecord>> {
        let mut open: Vec<InvoiceRecord> = self
            .all(ctx)?
            .into_iter()
            .filter(|r| is_outstanding(r.data.status()))
            .collect();
        open.sort_by_key(|r| (r.data.created_at(), r.id.document_id()));
        Ok(open)
    }

    fn all(&self, ctx: &TenantContext) -> ServiceResult<Vec<InvoiceRecord>> {
        Ok(self
            .views
            .records::<Invoice, _>(&self.store, ctx, Collection::Invoices)?
            .into_iter()
            .map(|(id, invoice)| Record::new(InvoiceId::new(id), invoice))
            .collect())
    }

    fn party_index(&self, ctx: &TenantContext) -> ServiceResult<PartyIndex> {
        Ok(PartyIndex {
            entities: self.parties.entities(ctx)?.into_iter().map(|r| (r.id, r.data)).collect(),
            customers: self.parties.customers(ctx)?.into_iter().map(|r| (r.id, r.data)).collect(),
        })
    }
}

/// Both parties must be selected and must exist before anything is saved.
fn resolve_selection<'a>(parties: &'a PartyIndex, draft: &InvoiceDraft) -> ServiceResult<(&'a Party, &'a Party)> {
    let (Some(entity_id), Some(customer_id)) = (draft.entity_id, draft.customer_id) else {
        return Err(ServiceError::Validation(
            "an entity and a customer must be selected".to_string(),
        ));
    };
    let entity = parties
        .entity(Some(entity_id))
        .ok_or_else(|| ServiceError::Validation(format!("entity {entity_id} does not exist")))?;
    let customer = parties
        .customer(Some(customer_id))
        .ok_or_else(|| ServiceError::Validation(format!("customer {customer_id} does not exist")))?;
    Ok((entity, customer))
}

fn log_coercion(ctx: &TenantContext, id: Option<InvoiceId>, draft: &InvoiceDraft, eval: &Evaluation) {
    if eval.kind_coerced {
        warn!(
            tenant_id = %ctx.tenant_id(),
            invoice_id = ?id.map(|i| i.to_string()),
            requested = %draft.kind,
            saved_as = %eval.kind,
            "entity is not GST-registered; proforma saved as a plain invoice"
        );
    }
}

fn not_found(id: InvoiceId, err: StoreError) -> ServiceError {
    match err {
        StoreError::NotFound { .. } => ServiceError::NotFound(format!("invoice {id} not found")),
        other => other.into(),
    }
}
