//! Configuration loading and representation.

use std::net::SocketAddr;

use thiserror::Error;

use billbook_invoicing::DEFAULT_PAYMENT_TERMS;
use billbook_observability::LogFormat;

pub const ENV_BIND_ADDR: &str = "BILLBOOK_BIND_ADDR";
pub const ENV_APP_ID: &str = "BILLBOOK_APP_ID";
pub const ENV_DEFAULT_PAYMENT_TERMS: &str = "BILLBOOK_DEFAULT_PAYMENT_TERMS";
pub const ENV_LOG_FORMAT: &str = "BILLBOOK_LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_APP_ID: &str = "billbook";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Namespace of every collection path.
    pub app_id: String,
    /// Payment terms (days) for drafts that do not set their own.
    pub default_payment_terms: u32,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            app_id: DEFAULT_APP_ID.to_string(),
            default_payment_terms: DEFAULT_PAYMENT_TERMS,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank variables
    /// take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_addr = get(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid(ENV_BIND_ADDR, &raw_addr, e))?;

        let app_id = get(ENV_APP_ID)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_APP_ID.to_string());
        if app_id.contains('/') {
            return Err(ConfigError::invalid(ENV_APP_ID, &app_id, "must not contain '/'"));
        }

        let default_payment_terms = match get(ENV_DEFAULT_PAYMENT_TERMS) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::invalid(ENV_DEFAULT_PAYMENT_TERMS, &raw, e))?,
            None => DEFAULT_PAYMENT_TERMS,
        };

        let log_format = match get(ENV_LOG_FORMAT) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid(ENV_LOG_FORMAT, &raw, e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            app_id,
            default_payment_terms,
            log_format,
        })
    }
}
