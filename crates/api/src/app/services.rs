use std::sync::Arc;

use billbook_infra::{AppConfig, InMemoryDocumentStore, Services};

pub type AppStore = Arc<InMemoryDocumentStore>;

pub type AppServices = Services<AppStore>;

pub fn build_services(config: &AppConfig) -> AppServices {
    let store: AppStore = Arc::new(InMemoryDocumentStore::new(config.app_id.clone()));
    tracing::info!(app_id = %config.app_id, "document store ready");
    Services::new(store, config.default_payment_terms)
}
