use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use billbook_core::{DomainError, DomainResult, Record, document_ref, money};
use billbook_parties::{CustomerId, EntityId, Party};

use crate::calculator::{LineItem, TaxContext, Totals, compute_totals};
use crate::lifecycle::{InvoiceKind, InvoiceStatus, StatusAction};

document_ref!(
    /// Invoice identifier (tenant-scoped by the collection it lives in).
    InvoiceId
);

/// Stored invoice with its id.
pub type InvoiceRecord = Record<InvoiceId, Invoice>;

/// Payment terms used when a draft does not specify any.
pub const DEFAULT_PAYMENT_TERMS: u32 = 30;

/// `INV-{unix millis}`, fixed at creation.
pub fn generate_invoice_number(now: DateTime<Utc>) -> String {
    format!("INV-{}", now.timestamp_millis())
}

/// Invoice date plus payment terms.
pub fn due_date(invoice_date: NaiveDate, payment_terms: u32) -> DomainResult<NaiveDate> {
    invoice_date
        .checked_add_days(Days::new(u64::from(payment_terms)))
        .ok_or_else(|| DomainError::validation("due date is out of range"))
}

/// Invoice as submitted by a form, before evaluation.
///
/// Everything is optional or lenient so a half-filled form can still be
/// evaluated for a preview; [`InvoiceDraft::validate`] decides whether it may
/// be saved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    #[serde(rename = "type", default)]
    pub kind: InvoiceKind,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub entity_id: Option<EntityId>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub partner: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_terms")]
    pub payment_terms: Option<i64>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// Result of evaluating a draft against its parties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Kind after the proforma rule has been applied.
    #[serde(rename = "type")]
    pub kind: InvoiceKind,
    /// True when a requested proforma was forced back to a plain invoice.
    pub kind_coerced: bool,
    pub tax: TaxContext,
    pub invoice_date: NaiveDate,
    pub payment_terms: u32,
    pub due_date: NaiveDate,
    pub totals: Totals,
}

impl InvoiceDraft {
    /// Derive everything that depends on the draft's inputs.
    ///
    /// `fallback_date` and `fallback_terms` fill in a missing invoice date and
    /// payment terms.
    pub fn evaluate(
        &self,
        entity: Option<&Party>,
        customer: Option<&Party>,
        fallback_date: NaiveDate,
        fallback_terms: u32,
    ) -> DomainResult<Evaluation> {
        let tax = TaxContext::resolve(entity, customer);
        let kind = self.kind.permitted(tax.gst_applicable);
        let invoice_date = self.invoice_date.unwrap_or(fallback_date);
        let payment_terms = match self.payment_terms {
            Some(days) => u32::try_from(days)
                .map_err(|_| DomainError::validation("payment terms must be a non-negative number of days"))?,
            None => fallback_terms,
        };

        Ok(Evaluation {
            kind,
            kind_coerced: kind != self.kind,
            tax,
            invoice_date,
            payment_terms,
            due_date: due_date(invoice_date, payment_terms)?,
            totals: compute_totals(&self.items, tax),
        })
    }

    /// Checks that must pass before a draft is persisted.
    pub fn validate(&self) -> DomainResult<(EntityId, CustomerId)> {
        let (Some(entity_id), Some(customer_id)) = (self.entity_id, self.customer_id) else {
            return Err(DomainError::validation("an entity and a customer must be selected"));
        };

        if self.items.is_empty() {
            return Err(DomainError::validation("an invoice needs at least one line item"));
        }

        if matches!(self.payment_terms, Some(days) if days < 0) {
            return Err(DomainError::validation(
                "payment terms must be a non-negative number of days",
            ));
        }

        for (idx, item) in self.items.iter().enumerate() {
            let line = idx + 1;
            if item.quantity.is_sign_negative() {
                return Err(DomainError::validation(format!("line {line}: quantity cannot be negative")));
            }
            if item.rate.is_sign_negative() {
                return Err(DomainError::validation(format!("line {line}: rate cannot be negative")));
            }
            if item.discount.is_sign_negative() {
                return Err(DomainError::validation(format!("line {line}: discount cannot be negative")));
            }
            if item.discount > item.gross() {
                return Err(DomainError::validation(format!(
                    "line {line}: discount cannot exceed quantity × rate"
                )));
            }
            if !item.has_standard_gst_rate() {
                return Err(DomainError::validation(format!(
                    "line {line}: GST rate must be one of 0, 5, 12, 18 or 28"
                )));
            }
        }

        Ok((entity_id, customer_id))
    }
}

/// A saved invoice.
///
/// The totals are a snapshot of the calculator's output at the last save.
/// They are recomputed on every edit and never lazily on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(rename = "type")]
    kind: InvoiceKind,
    entity_id: EntityId,
    customer_id: CustomerId,
    #[serde(default)]
    partner: Option<String>,
    invoice_number: String,
    invoice_date: NaiveDate,
    #[serde(deserialize_with = "stored_terms")]
    payment_terms: u32,
    due_date: NaiveDate,
    items: Vec<LineItem>,
    status: InvoiceStatus,
    #[serde(flatten)]
    totals: Totals,
    created_at: DateTime<Utc>,
}

impl Invoice {
    /// Build a new invoice from a validated draft.
    ///
    /// The status comes from the (possibly coerced) kind: Proforma for a
    /// proforma, Draft otherwise.
    pub fn create(
        draft: &InvoiceDraft,
        entity: Option<&Party>,
        customer: Option<&Party>,
        today: NaiveDate,
        default_terms: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<(Self, Evaluation)> {
        let (entity_id, customer_id) = draft.validate()?;
        let eval = draft.evaluate(entity, customer, today, default_terms)?;

        let invoice = Self {
            kind: eval.kind,
            entity_id,
            customer_id,
            partner: normalize_partner(draft.partner.as_deref()),
            invoice_number: generate_invoice_number(now),
            invoice_date: eval.invoice_date,
            payment_terms: eval.payment_terms,
            due_date: eval.due_date,
            items: draft.items.clone(),
            status: InvoiceStatus::initial(eval.kind),
            totals: eval.totals,
            created_at: now,
        };
        Ok((invoice, eval))
    }

    /// Replace header and items from `draft`, recomputing every derived field.
    ///
    /// Only allowed while editable. The invoice number, creation time and
    /// status never change here: status only moves through its transitions.
    pub fn revise(
        &mut self,
        draft: &InvoiceDraft,
        entity: Option<&Party>,
        customer: Option<&Party>,
    ) -> DomainResult<Evaluation> {
        self.status.ensure_editable()?;
        let (entity_id, customer_id) = draft.validate()?;
        let eval = draft.evaluate(entity, customer, self.invoice_date, self.payment_terms)?;

        self.kind = eval.kind;
        self.entity_id = entity_id;
        self.customer_id = customer_id;
        self.partner = normalize_partner(draft.partner.as_deref());
        self.invoice_date = eval.invoice_date;
        self.payment_terms = eval.payment_terms;
        self.due_date = eval.due_date;
        self.items = draft.items.clone();
        self.totals = eval.totals;
        Ok(eval)
    }

    /// Advance the status. Nothing but the status changes.
    pub fn transition_to(&mut self, target: InvoiceStatus) -> DomainResult<InvoiceStatus> {
        self.status = self.status.transition_to(target)?;
        Ok(self.status)
    }

    pub fn apply_action(&mut self, action: StatusAction) -> DomainResult<InvoiceStatus> {
        self.status = self.status.apply(action)?;
        Ok(self.status)
    }

    /// Draft for editing this invoice in a form.
    pub fn to_draft(&self) -> InvoiceDraft {
        InvoiceDraft {
            kind: self.kind,
            entity_id: Some(self.entity_id),
            customer_id: Some(self.customer_id),
            partner: self.partner.clone(),
            invoice_date: Some(self.invoice_date),
            payment_terms: Some(i64::from(self.payment_terms)),
            items: self.items.clone(),
        }
    }

    pub fn kind(&self) -> InvoiceKind {
        self.kind
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn partner(&self) -> Option<&str> {
        self.partner.as_deref()
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_date
    }

    pub fn payment_terms(&self) -> u32 {
        self.payment_terms
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn total(&self) -> Decimal {
        self.totals.total
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn normalize_partner(partner: Option<&str>) -> Option<String> {
    partner
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

fn lenient_terms<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(money::coerce_days(&v)),
    })
}

fn stored_terms<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(u32::try_from(money::coerce_days(&value).max(0)).unwrap_or(u32::MAX))
}
