//! Invoice lifecycle: document kinds, statuses and the legal transitions.
//!
//! ```text
//! Proforma ──mark invoiced──▶ Invoiced ──mark sent──▶ Sent ──mark paid──▶ Paid
//!                                           ▲
//! Draft ─────────────mark sent──────────────┘
//! ```
//!
//! Draft and Proforma are the only editable states. Paid is terminal.

use serde::{Deserialize, Serialize};

use billbook_core::{DomainError, DomainResult};

/// Document kind chosen when the invoice is drafted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InvoiceKind {
    #[default]
    Invoice,
    Proforma,
}

impl InvoiceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceKind::Invoice => "Invoice",
            InvoiceKind::Proforma => "Proforma",
        }
    }

    /// A proforma only makes sense when GST applies; otherwise it falls back
    /// to a plain invoice.
    pub fn permitted(self, gst_applicable: bool) -> Self {
        match self {
            InvoiceKind::Proforma if !gst_applicable => InvoiceKind::Invoice,
            other => other,
        }
    }
}

impl core::fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Draft,
    Proforma,
    Invoiced,
    Sent,
    Paid,
}

/// A user-triggered status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    MarkInvoiced,
    MarkSent,
    MarkPaid,
}

impl StatusAction {
    pub const ALL: [StatusAction; 3] = [
        StatusAction::MarkInvoiced,
        StatusAction::MarkSent,
        StatusAction::MarkPaid,
    ];

    pub fn target(self) -> InvoiceStatus {
        match self {
            StatusAction::MarkInvoiced => InvoiceStatus::Invoiced,
            StatusAction::MarkSent => InvoiceStatus::Sent,
            StatusAction::MarkPaid => InvoiceStatus::Paid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusAction::MarkInvoiced => "mark invoiced",
            StatusAction::MarkSent => "mark sent",
            StatusAction::MarkPaid => "mark paid",
        }
    }
}

impl core::fmt::Display for StatusAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Proforma,
        InvoiceStatus::Invoiced,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
    ];

    /// The only way into the state machine.
    pub fn initial(kind: InvoiceKind) -> Self {
        match kind {
            InvoiceKind::Proforma => InvoiceStatus::Proforma,
            InvoiceKind::Invoice => InvoiceStatus::Draft,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Proforma => "Proforma",
            InvoiceStatus::Invoiced => "Invoiced",
            InvoiceStatus::Sent => "Sent",
            InvoiceStatus::Paid => "Paid",
        }
    }

    /// Whether header and line items may still be changed.
    pub fn is_editable(self) -> bool {
        matches!(self, InvoiceStatus::Draft | InvoiceStatus::Proforma)
    }

    pub fn available_actions(self) -> &'static [StatusAction] {
        match self {
            InvoiceStatus::Proforma => &[StatusAction::MarkInvoiced],
            InvoiceStatus::Invoiced | InvoiceStatus::Draft => &[StatusAction::MarkSent],
            InvoiceStatus::Sent => &[StatusAction::MarkPaid],
            InvoiceStatus::Paid => &[],
        }
    }

    /// Perform `action`, returning the new status.
    pub fn apply(self, action: StatusAction) -> DomainResult<InvoiceStatus> {
        if self.available_actions().contains(&action) {
            Ok(action.target())
        } else {
            Err(DomainError::invalid_transition(self, action))
        }
    }

    /// Move directly to `target`, if one legal step gets there.
    pub fn transition_to(self, target: InvoiceStatus) -> DomainResult<InvoiceStatus> {
        match StatusAction::ALL.into_iter().find(|a| a.target() == target) {
            Some(action) => self.apply(action),
            None => Err(DomainError::invalid_transition(
                self,
                format!("move to {target}"),
            )),
        }
    }

    pub fn ensure_editable(self) -> DomainResult<()> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(DomainError::invalid_transition(self, "edit"))
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("unknown invoice status: {s}")))
    }
}
