use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use billbook_core::{DocumentId, DomainError};
use billbook_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        e @ ServiceError::InvalidTransition { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_transition", e.to_string())
        }
        ServiceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        e @ ServiceError::Persistence(_) => {
            tracing::error!(error = %e, "persistence failure");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "persistence_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    service_error_to_response(err.into())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_document_id(raw: &str) -> Result<DocumentId, axum::response::Response> {
    raw.parse::<DocumentId>()
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}
