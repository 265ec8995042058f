//! Aggregate reports over a tenant's invoices.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billbook_core::{DomainError, DomainResult};

use crate::invoice::InvoiceRecord;
use crate::lifecycle::InvoiceStatus;

/// Overdue window an outstanding invoice falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgingBucket {
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "1-30")]
    Days1To30,
    #[serde(rename = "31-60")]
    Days31To60,
    #[serde(rename = "61-90")]
    Days61To90,
    #[serde(rename = "90+")]
    Over90,
}

impl AgingBucket {
    pub const ALL: [AgingBucket; 5] = [
        AgingBucket::Current,
        AgingBucket::Days1To30,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ];

    pub fn for_days_overdue(days: i64) -> Self {
        match days {
            i64::MIN..=0 => AgingBucket::Current,
            1..=30 => AgingBucket::Days1To30,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgingBucket::Current => "current",
            AgingBucket::Days1To30 => "1-30",
            AgingBucket::Days31To60 => "31-60",
            AgingBucket::Days61To90 => "61-90",
            AgingBucket::Over90 => "90+",
        }
    }
}

/// Statuses that count as money still owed.
pub fn is_outstanding(status: InvoiceStatus) -> bool {
    matches!(status, InvoiceStatus::Sent | InvoiceStatus::Invoiced)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgingRow {
    pub bucket: AgingBucket,
    pub count: usize,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingReport {
    pub as_of: NaiveDate,
    /// Always all five buckets, in order.
    pub buckets: Vec<AgingRow>,
    pub outstanding_total: Decimal,
}

/// Bucket outstanding invoices by how far past due they are on `today`.
pub fn aging_report(invoices: &[InvoiceRecord], today: NaiveDate) -> AgingReport {
    let mut rows: Vec<AgingRow> = AgingBucket::ALL
        .into_iter()
        .map(|bucket| AgingRow {
            bucket,
            count: 0,
            total: Decimal::ZERO,
        })
        .collect();

    for record in invoices.iter().filter(|r| is_outstanding(r.data.status())) {
        let overdue = (today - record.data.due_date()).num_days();
        let bucket = AgingBucket::for_days_overdue(overdue);
        // `rows` mirrors AgingBucket::ALL, so the discriminant is the index.
        let row = &mut rows[bucket as usize];
        row.count += 1;
        row.total = row.total.saturating_add(record.data.total());
    }

    let outstanding_total = rows
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.total));

    AgingReport {
        as_of: today,
        buckets: rows,
        outstanding_total,
    }
}

/// Dimension to group invoices by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Customer,
    Entity,
    Type,
    Status,
}

impl core::str::FromStr for GroupBy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(GroupBy::Customer),
            "entity" => Ok(GroupBy::Entity),
            "type" => Ok(GroupBy::Type),
            "status" => Ok(GroupBy::Status),
            other => Err(DomainError::validation(format!("cannot group invoices by {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceGroup {
    pub key: String,
    pub name: String,
    pub count: usize,
    pub total: Decimal,
}

/// Placeholder for a party reference that no longer resolves.
pub const UNRESOLVED_NAME: &str = "N/A";

/// Group invoices along `by`, ordered by group key.
///
/// `party_name` resolves the display name of a customer or entity group from
/// its id; unresolved ids are shown as [`UNRESOLVED_NAME`].
pub fn group_invoices<F>(invoices: &[InvoiceRecord], by: GroupBy, party_name: F) -> Vec<InvoiceGroup>
where
    F: Fn(GroupBy, &str) -> Option<String>,
{
    let mut groups: BTreeMap<String, (usize, Decimal)> = BTreeMap::new();

    for record in invoices {
        let invoice = &record.data;
        let key = match by {
            GroupBy::Customer => invoice.customer_id().to_string(),
            GroupBy::Entity => invoice.entity_id().to_string(),
            GroupBy::Type => invoice.kind().to_string(),
            GroupBy::Status => invoice.status().to_string(),
        };
        let slot = groups.entry(key).or_insert((0, Decimal::ZERO));
        slot.0 += 1;
        slot.1 = slot.1.saturating_add(invoice.total());
    }

    groups
        .into_iter()
        .map(|(key, (count, total))| {
            let name = match by {
                GroupBy::Customer | GroupBy::Entity => {
                    party_name(by, &key).unwrap_or_else(|| UNRESOLVED_NAME.to_string())
                }
                GroupBy::Type | GroupBy::Status => key.clone(),
            };
            InvoiceGroup {
                key,
                name,
                count,
                total,
            }
        })
        .collect()
}

/// Parse the `today` parameter of the aging report.
pub fn parse_report_date(raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| DomainError::validation(format!("invalid date {raw:?}: {e}")))
}
