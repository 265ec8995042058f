use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use billbook_core::TenantContext;
use billbook_invoicing::{report::parse_report_date, GroupBy};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/aging", get(aging))
        .route("/grouped", get(grouped))
}

/// Outstanding balances by days overdue, as of `?today=` or the current date.
pub async fn aging(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Query(query): Query<dto::AgingQuery>,
) -> axum::response::Response {
    let today = match query.today.as_deref().map(parse_report_date).transpose() {
        Ok(today) => today,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.invoices.aging(&tenant, today) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn grouped(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Query(query): Query<dto::GroupedQuery>,
) -> axum::response::Response {
    let by = match query.by.parse::<GroupBy>() {
        Ok(by) => by,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.invoices.grouped(&tenant, by) {
        Ok(groups) => (StatusCode::OK, Json(groups)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
