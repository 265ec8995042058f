//! Read-only projection of an invoice for a rendering service.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use billbook_parties::{Address, Party};

use crate::calculator::Totals;
use crate::invoice::Invoice;
use crate::lifecycle::InvoiceKind;
use crate::report::UNRESOLVED_NAME;

/// Shown in the header when the billing entity cannot be resolved.
pub const FALLBACK_ENTITY_NAME: &str = "Entity";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    pub entity_name: String,
    #[serde(rename = "type")]
    pub kind: InvoiceKind,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// One address block ("billed from" / "billed to").
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyBlock {
    pub name: String,
    pub address: Address,
    /// `"{city}, {state} - {pincode}"`, printed under the street lines.
    pub locality: String,
    pub gstin: String,
}

impl PartyBlock {
    fn from_party(party: Option<&Party>) -> Self {
        match party {
            Some(p) => Self {
                name: p.name.clone(),
                address: p.address.clone(),
                locality: p.address.locality(),
                gstin: p.gstin.clone().unwrap_or_else(|| UNRESOLVED_NAME.to_string()),
            },
            None => Self {
                gstin: UNRESOLVED_NAME.to_string(),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLine {
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub gst_rate: Decimal,
    /// quantity × rate, before discount and tax.
    pub amount: Decimal,
}

/// Everything needed to print an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    pub header: DocumentHeader,
    pub billed_from: PartyBlock,
    pub billed_to: PartyBlock,
    pub lines: Vec<DocumentLine>,
    pub totals: Totals,
}

impl InvoiceDocument {
    /// Project a stored invoice. Parties that no longer resolve render as
    /// blank blocks; the stored totals are used as-is.
    pub fn project(invoice: &Invoice, entity: Option<&Party>, customer: Option<&Party>) -> Self {
        let header = DocumentHeader {
            entity_name: entity
                .map(|e| e.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| FALLBACK_ENTITY_NAME.to_string()),
            kind: invoice.kind(),
            invoice_number: invoice.invoice_number().to_string(),
            invoice_date: invoice.invoice_date(),
            due_date: invoice.due_date(),
        };

        let lines = invoice
            .items()
            .iter()
            .map(|item| DocumentLine {
                description: item.description.clone(),
                quantity: item.quantity,
                rate: item.rate,
                gst_rate: item.gst_rate,
                amount: item.gross(),
            })
            .collect();

        Self {
            header,
            billed_from: PartyBlock::from_party(entity),
            billed_to: PartyBlock::from_party(customer),
            lines,
            totals: *invoice.totals(),
        }
    }
}
