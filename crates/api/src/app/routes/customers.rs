use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    routing::get,
    Json, Router,
};

use billbook_core::TenantContext;
use billbook_parties::PartyKind;

use crate::app::dto;
use crate::app::routes::parties;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:id", get(get_customer).put(update_customer).delete(delete_customer))
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    parties::list(&services, &tenant, PartyKind::Customer, query)
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    parties::get(&services, &tenant, PartyKind::Customer, id)
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    parties::create(&services, &tenant, PartyKind::Customer, body)
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    parties::update(&services, &tenant, PartyKind::Customer, id, body)
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    parties::delete(&services, &tenant, PartyKind::Customer, id)
}
