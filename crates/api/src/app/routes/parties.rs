//! Handlers shared by the entity and customer routes.

use axum::{http::StatusCode, response::IntoResponse, Json};

use billbook_core::TenantContext;
use billbook_parties::{Party, PartyKind};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn list(
    services: &AppServices,
    tenant: &TenantContext,
    kind: PartyKind,
    query: dto::SearchQuery,
) -> axum::response::Response {
    match services.parties.list(tenant, kind, query.q.as_deref()) {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub fn get(
    services: &AppServices,
    tenant: &TenantContext,
    kind: PartyKind,
    id: String,
) -> axum::response::Response {
    let id = match errors::parse_document_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.parties.get(tenant, kind, id) {
        Ok(party) => (StatusCode::OK, Json(billbook_core::Record::new(id, party))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub fn create(
    services: &AppServices,
    tenant: &TenantContext,
    kind: PartyKind,
    body: serde_json::Value,
) -> axum::response::Response {
    let party = match Party::from_form(body) {
        Ok(party) => party,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.parties.create(tenant, kind, party) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub fn update(
    services: &AppServices,
    tenant: &TenantContext,
    kind: PartyKind,
    id: String,
    body: serde_json::Value,
) -> axum::response::Response {
    let id = match errors::parse_document_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let party = match Party::from_form(body) {
        Ok(party) => party,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.parties.update(tenant, kind, id, party) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub fn delete(
    services: &AppServices,
    tenant: &TenantContext,
    kind: PartyKind,
    id: String,
) -> axum::response::Response {
    let id = match errors::parse_document_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.parties.delete(tenant, kind, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
