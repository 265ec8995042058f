//! Change-feed mechanics: subscriptions, fan-out feeds, collection snapshots.

pub mod bus;
pub mod in_memory_bus;
pub mod snapshot;
pub mod tenant;

pub use bus::{ChangeFeed, Subscription};
pub use in_memory_bus::{InMemoryChangeFeed, InMemoryFeedError};
pub use snapshot::{CollectionSnapshot, Document};
pub use tenant::TenantScoped;
