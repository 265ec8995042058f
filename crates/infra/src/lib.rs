//! Infrastructure layer: document store, live views, application services
//! and configuration.

pub mod config;
pub mod services;
pub mod store;
pub mod views;


pub use config::{AppConfig, ConfigError};
pub use services::{InvoiceService, PartyService, ServiceError, ServiceResult, Services};
pub use store::{DocumentStore, InMemoryDocumentStore, StoreError, StoreResult};
pub use views::LiveViews;
