use axum::Router;

pub mod customers;
pub mod entities;
pub mod invoices;
pub mod parties;
pub mod reports;
pub mod system;

/// Router for all tenant-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/entities", entities::router())
        .nest("/customers", customers::router())
        .nest("/invoices", invoices::router())
        .nest("/reports", reports::router())
}
