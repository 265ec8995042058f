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
        .route("/", get(list_entities).post(create_entity))
        .route("/:id", get(get_entity).put(update_entity).delete(delete_entity))
}

pub async fn list_entities(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    parties::list(&services, &tenant, PartyKind::Entity, query)
}

pub async fn get_entity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    parties::get(&services, &tenant, PartyKind::Entity, id)
}

pub async fn create_entity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    parties::create(&services, &tenant, PartyKind::Entity, body)
}

pub async fn update_entity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    parties::update(&services, &tenant, PartyKind::Entity, id, body)
}

pub async fn delete_entity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    parties::delete(&services, &tenant, PartyKind::Entity, id)
}
