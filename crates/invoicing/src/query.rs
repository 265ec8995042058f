use serde::Deserialize;

use billbook_parties::CustomerId;

use crate::invoice::InvoiceRecord;
use crate::lifecycle::InvoiceStatus;

/// Narrow an invoice list by status, customer and free-text term.
///
/// The term is matched case-insensitively against the invoice number and the
/// resolved customer name. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InvoiceFilter {
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub q: Option<String>,
}

impl InvoiceFilter {
    pub fn matches(&self, record: &InvoiceRecord, customer_name: Option<&str>) -> bool {
        let invoice = &record.data;

        if self.status.is_some_and(|s| s != invoice.status()) {
            return false;
        }
        if self.customer_id.is_some_and(|c| c != invoice.customer_id()) {
            return false;
        }

        match self.term() {
            None => true,
            Some(term) => {
                invoice.invoice_number().to_lowercase().contains(&term)
                    || customer_name.is_some_and(|n| n.to_lowercase().contains(&term))
            }
        }
    }

    /// Keep matching records, resolving customer names through `customer_name`.
    pub fn apply<'a, F>(&self, records: &'a [InvoiceRecord], customer_name: F) -> Vec<&'a InvoiceRecord>
    where
        F: Fn(CustomerId) -> Option<&'a str>,
    {
        records
            .iter()
            .filter(|r| self.matches(r, customer_name(r.data.customer_id())))
            .collect()
    }

    fn term(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::LineItem;
    use crate::invoice::{Invoice, InvoiceDraft, InvoiceId};
    use crate::lifecycle::InvoiceKind;
    use billbook_core::{DocumentId, Record};
    use billbook_parties::EntityId;
    use chrono::{DateTime, NaiveDate};
    use rust_decimal_macros::dec;

    fn record(customer: CustomerId, millis: i64) -> InvoiceRecord {
        let draft = InvoiceDraft {
            kind: InvoiceKind::Invoice,
            entity_id: Some(EntityId::new(DocumentId::new())),
            customer_id: Some(customer),
            items: vec![LineItem::new("x", dec!(1), dec!(10))],
            ..InvoiceDraft::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let now = DateTime::from_timestamp_millis(millis).unwrap();
        let (invoice, _) = Invoice::create(&draft, None, None, today, 30, now).unwrap();
        Record::new(InvoiceId::new(DocumentId::new()), invoice)
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let c = CustomerId::new(DocumentId::new());
        let records = vec![record(c, 1), record(c, 2)];
        assert_eq!(InvoiceFilter::default().apply(&records, |_| None).len(), 2);
    }

    #[test]
    fn filters_by_status_and_customer() {
        let a = CustomerId::new(DocumentId::new());
        let b = CustomerId::new(DocumentId::new());
        let mut records = vec![record(a, 1), record(b, 2)];
        records[1].data.transition_to(InvoiceStatus::Sent).unwrap();

        let sent = InvoiceFilter {
            status: Some(InvoiceStatus::Sent),
            ..InvoiceFilter::default()
        };
        let hits = sent.apply(&records, |_| None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].data.customer_id(), b);

        let for_a = InvoiceFilter {
            customer_id: Some(a),
            ..InvoiceFilter::default()
        };
        assert_eq!(for_a.apply(&records, |_| None)[0].data.customer_id(), a);
    }

    #[test]
    fn term_matches_number_or_customer_name() {
        let globex = CustomerId::new(DocumentId::new());
        let other = CustomerId::new(DocumentId::new());
        let records = vec![record(globex, 1_700_000_000_001), record(other, 1_700_000_000_002)];
        let names = |id: CustomerId| if id == globex { Some("Globex Corp") } else { Some("Initech") };

        let by_name = InvoiceFilter {
            q: Some("  GLOBEX ".to_string()),
            ..InvoiceFilter::default()
        };
        let hits = by_name.apply(&records, names);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].data.customer_id(), globex);

        let by_number = InvoiceFilter {
            q: Some("inv-1700000000002".to_string()),
            ..InvoiceFilter::default()
        };
        let hits = by_number.apply(&records, names);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].data.customer_id(), other);
    }
}
