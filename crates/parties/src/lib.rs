//! Party master data: billing entities and customers.
//!
//! Pure domain logic (no IO): record shape, GSTIN/PAN derivation,
//! place-of-supply lookup, validation and duplicate detection.

pub mod party;
pub mod place_of_supply;
pub mod tax_id;

pub use party::{
    Address, CustomerId, CustomerRecord, EntityId, EntityRecord, GstRegistration, Party,
    PartyKind, ensure_unique,
};
pub use place_of_supply::PlaceOfSupply;
