//! Tenant context for a request.
//!
//! The tenant is named explicitly by every domain request in the
//! [`TENANT_HEADER`] header. There is no authentication.

use axum::http::HeaderMap;

use billbook_core::{TenantContext, TenantId};

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Why a request carries no usable tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantHeaderError {
    Missing,
    Invalid(String),
}

impl TenantHeaderError {
    pub fn message(&self) -> String {
        match self {
            TenantHeaderError::Missing => format!("{TENANT_HEADER} header is required"),
            TenantHeaderError::Invalid(reason) => format!("{TENANT_HEADER} header is invalid: {reason}"),
        }
    }
}

pub fn tenant_from_headers(headers: &HeaderMap) -> Result<TenantContext, TenantHeaderError> {
    let raw = headers
        .get(TENANT_HEADER)
        .ok_or(TenantHeaderError::Missing)?
        .to_str()
        .map_err(|e| TenantHeaderError::Invalid(e.to_string()))?;

    if raw.trim().is_empty() {
        return Err(TenantHeaderError::Missing);
    }

    raw.parse::<TenantId>()
        .map(TenantContext::new)
        .map_err(|e| TenantHeaderError::Invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn tenant_is_parsed_from_header() {
        let tenant = TenantId::new();
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_str(&tenant.to_string()).unwrap());

        assert_eq!(tenant_from_headers(&headers).unwrap().tenant_id(), tenant);
    }

    #[test]
    fn missing_or_garbage_header_is_rejected() {
        let mut headers = HeaderMap::new();
        assert_eq!(tenant_from_headers(&headers), Err(TenantHeaderError::Missing));

        headers.insert(TENANT_HEADER, HeaderValue::from_static("tenant-1"));
        assert!(matches!(tenant_from_headers(&headers), Err(TenantHeaderError::Invalid(_))));
    }
}
