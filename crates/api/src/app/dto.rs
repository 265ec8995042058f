//! Request/response DTOs and JSON mapping helpers.
//!
//! Parties and invoice drafts are accepted in their stored camelCase shape,
//! so only the envelopes that differ from the domain types live here.

use serde::{Deserialize, Serialize};

use billbook_invoicing::{InvoiceRecord, StatusAction};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// Requested status change. Either a target status or an action name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub action: Option<StatusAction>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AgingQuery {
    #[serde(default)]
    pub today: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroupedQuery {
    pub by: String,
}

/// Stored invoice plus what a client may do with it next.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    #[serde(flatten)]
    pub record: InvoiceRecord,
    pub editable: bool,
    pub available_actions: Vec<ActionView>,
}

#[derive(Debug, Serialize)]
pub struct ActionView {
    pub action: StatusAction,
    pub label: &'static str,
}

impl From<InvoiceRecord> for InvoiceView {
    fn from(record: InvoiceRecord) -> Self {
        let status = record.data.status();
        Self {
            editable: status.is_editable(),
            available_actions: status
                .available_actions()
                .iter()
                .map(|a| ActionView {
                    action: *a,
                    label: a.label(),
                })
                .collect(),
            record,
        }
    }
}
