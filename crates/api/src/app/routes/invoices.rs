use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use billbook_core::TenantContext;
use billbook_invoicing::{InvoiceDraft, InvoiceFilter, InvoiceId, InvoiceStatus};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/preview", post(preview_invoice))
        .route("/outstanding", get(list_outstanding))
        .route("/:id", get(get_invoice).put(update_invoice).delete(delete_invoice))
        .route("/:id/status", post(change_status))
        .route("/:id/document", get(get_document))
}

fn parse_invoice_id(raw: &str) -> Result<InvoiceId, axum::response::Response> {
    raw.parse::<InvoiceId>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Query(filter): Query<InvoiceFilter>,
) -> axum::response::Response {
    match services.invoices.list(&tenant, &filter) {
        Ok(items) => {
            let items: Vec<dto::InvoiceView> = items.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_outstanding(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    match services.invoices.outstanding(&tenant) {
        Ok(items) => {
            let items: Vec<dto::InvoiceView> = items.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.invoices.get(&tenant, id) {
        Ok(record) => (StatusCode::OK, Json(dto::InvoiceView::from(record))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Evaluate a draft without saving it: kind, dates and live totals.
pub async fn preview_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<InvoiceDraft>,
) -> axum::response::Response {
    match services.invoices.preview(&tenant, &body) {
        Ok(evaluation) => (StatusCode::OK, Json(evaluation)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<InvoiceDraft>,
) -> axum::response::Response {
    match services.invoices.create(&tenant, &body) {
        Ok(record) => (StatusCode::CREATED, Json(dto::InvoiceView::from(record))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<InvoiceDraft>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.invoices.update(&tenant, id, &body) {
        Ok(record) => (StatusCode::OK, Json(dto::InvoiceView::from(record))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::StatusChangeRequest>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let target = match (body.status.as_deref(), body.action) {
        (Some(status), _) => match status.parse::<InvoiceStatus>() {
            Ok(s) => s,
            Err(e) => return errors::domain_error_to_response(e),
        },
        (None, Some(action)) => action.target(),
        (None, None) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "either status or action is required",
            );
        }
    };

    match services.invoices.transition(&tenant, id, target) {
        Ok(record) => (StatusCode::OK, Json(dto::InvoiceView::from(record))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.invoices.delete(&tenant, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_document(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.invoices.document(&tenant, id) {
        Ok(doc) => (StatusCode::OK, Json(doc)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
