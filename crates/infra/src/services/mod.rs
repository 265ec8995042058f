//! Application services: the operations a client performs, expressed over
//! the domain crates and a [`DocumentStore`](crate::store::DocumentStore).

pub mod invoices;
pub mod parties;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use billbook_core::DomainError;

use crate::store::{DocumentStore, StoreError};
use crate::views::LiveViews;

pub use invoices::InvoiceService;
pub use parties::PartyService;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a single user action. None of these are fatal to the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Missing or malformed input; nothing was written.
    #[error("{0}")]
    Validation(String),

    /// The record's status does not allow the action; nothing was written.
    #[error("cannot {action} from {from}")]
    InvalidTransition { from: String, action: String },

    #[error("{0}")]
    NotFound(String),

    /// The store rejected or failed the read/write. Not retried.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl From<DomainError> for ServiceError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::InvalidTransition { from, action } => {
                ServiceError::InvalidTransition { from, action }
            }
            DomainError::NotFound => ServiceError::NotFound("record not found".to_string()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => ServiceError::NotFound(e.to_string()),
            other => ServiceError::Persistence(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Persistence(StoreError::from(e).to_string())
    }
}

/// Both services wired to one store and one set of live views.
#[derive(Debug, Clone)]
pub struct Services<S> {
    pub parties: PartyService<S>,
    pub invoices: InvoiceService<S>,
}

impl<S> Services<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S, default_payment_terms: u32) -> Self {
        let views = Arc::new(LiveViews::attach(&store));
        Self {
            parties: PartyService::new(store.clone(), views.clone()),
            invoices: InvoiceService::new(store, views, default_payment_terms),
        }
    }
}

/// Source of "now" for invoice numbers, default dates and reports.
pub type Clock = fn() -> DateTime<Utc>;

pub(crate) fn system_clock() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use billbook_core::{Collection, DocumentId};

    #[test]
    fn domain_errors_map_to_the_service_taxonomy() {
        assert_eq!(
            ServiceError::from(DomainError::invalid_transition("Draft", "mark paid")),
            ServiceError::InvalidTransition {
                from: "Draft".into(),
                action: "mark paid".into()
            }
        );
        assert!(matches!(
            ServiceError::from(DomainError::invalid_id("bad")),
            ServiceError::Validation(_)
        ));
    }

    #[test]
    fn store_errors_map_to_not_found_or_persistence() {
        let missing = StoreError::NotFound {
            collection: Collection::Invoices,
            id: DocumentId::new(),
        };
        assert!(matches!(ServiceError::from(missing), ServiceError::NotFound(_)));
        assert!(matches!(
            ServiceError::from(StoreError::Poisoned),
            ServiceError::Persistence(_)
        ));
    }
}
