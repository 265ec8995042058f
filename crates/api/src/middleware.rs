use axum::{http::StatusCode, middleware::Next, response::Response};

use crate::app::errors;
use crate::context::tenant_from_headers;

/// Attach the request's [`TenantContext`](billbook_core::TenantContext) as an extension.
pub async fn tenant_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let tenant = tenant_from_headers(req.headers())
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "missing_tenant", e.message()))?;

    req.extensions_mut().insert(tenant);
    Ok(next.run(req).await)
}
