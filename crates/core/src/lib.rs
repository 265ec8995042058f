//! `billbook-core`: shared domain building blocks.
//!
//! Pure types only: identifiers, collection names, the tenant context, the
//! domain error model and decimal coercion helpers. No IO.

pub mod collection;
pub mod context;
pub mod error;
pub mod id;
pub mod money;
pub mod record;

pub use collection::{Collection, CollectionPath};
pub use context::TenantContext;
pub use error::{DomainError, DomainResult};
pub use id::{DocumentId, TenantId};
pub use record::Record;
pub use rust_decimal::Decimal;
