//! Invoicing domain.
//!
//! The tax & totals calculator, the invoice lifecycle, draft evaluation and
//! the read-side reports and projections built on saved invoices. Pure
//! deterministic logic: no IO, no HTTP, no storage.

pub mod calculator;
pub mod document;
pub mod invoice;
pub mod lifecycle;
pub mod query;
pub mod report;

pub use calculator::{
    DEFAULT_GST_RATE, GST_RATES, GstSplit, LineItem, TaxContext, Totals, compute_totals,
};
pub use document::InvoiceDocument;
pub use invoice::{
    DEFAULT_PAYMENT_TERMS, Evaluation, Invoice, InvoiceDraft, InvoiceId, InvoiceRecord, due_date,
    generate_invoice_number,
};
pub use lifecycle::{InvoiceKind, InvoiceStatus, StatusAction};
pub use query::InvoiceFilter;
pub use report::{AgingBucket, AgingReport, GroupBy, InvoiceGroup, aging_report, group_invoices};
