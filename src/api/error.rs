//! API error types for the recipe platform collaborators

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level rejection returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field name as the server knows it (e.g. "title", "ingredients")
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

/// Errors that can occur when talking to the recipe API or the image host
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 401 Unauthorized - session missing or expired
    #[error("{service}: Unauthorized (401) - please sign in again")]
    Unauthorized { service: String },

    /// 403 Forbidden - the user may not touch this resource
    #[error("{service}: Forbidden (403) - insufficient permissions")]
    Forbidden { service: String },

    /// 404 Not Found
    #[error("{service}: Not found - {resource}")]
    NotFound { service: String, resource: String },

    /// 400/422 with field-level validation errors
    #[error("{service}: Rejected - {}", summarize(.violations))]
    Validation {
        service: String,
        violations: Vec<FieldViolation>,
    },

    /// 429 Rate Limited
    #[error("{service}: Rate limited{}", retry_suffix(.retry_after_secs))]
    RateLimited {
        service: String,
        retry_after_secs: Option<u64>,
    },

    /// Network or timeout error
    #[error("{service}: Network error - {message}")]
    Network { service: String, message: String },

    /// Other HTTP errors
    #[error("{service}: HTTP {status} - {message}")]
    Http {
        service: String,
        status: u16,
        message: String,
    },

    /// Response body could not be decoded
    #[error("{service}: Unexpected response - {message}")]
    Decode { service: String, message: String },

    /// Local I/O failure before the request was sent (e.g. unreadable image file)
    #[error("{service}: {message}")]
    Io { service: String, message: String },
}

fn summarize(violations: &[FieldViolation]) -> String {
    if violations.is_empty() {
        return "validation failed".to_string();
    }
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn retry_suffix(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" - retry after {}s", secs),
        None => String::new(),
    }
}

impl ApiError {
    /// Check if this is an authentication error (401 or 403)
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. }
        )
    }

    /// Check if the server rejected the payload field by field
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation { .. })
    }

    /// Check if this is a 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Get retry-after seconds if rate limited
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ApiError::RateLimited {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }

    /// Field-level violations, empty for every other variant
    pub fn field_errors(&self) -> &[FieldViolation] {
        match self {
            ApiError::Validation { violations, .. } => violations,
            _ => &[],
        }
    }

    /// Get the service name for this error
    pub fn service_name(&self) -> &str {
        match self {
            ApiError::Unauthorized { service }
            | ApiError::Forbidden { service }
            | ApiError::NotFound { service, .. }
            | ApiError::Validation { service, .. }
            | ApiError::RateLimited { service, .. }
            | ApiError::Network { service, .. }
            | ApiError::Http { service, .. }
            | ApiError::Decode { service, .. }
            | ApiError::Io { service, .. } => service,
        }
    }

    pub fn unauthorized(service: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            service: service.into(),
        }
    }

    pub fn forbidden(service: impl Into<String>) -> Self {
        ApiError::Forbidden {
            service: service.into(),
        }
    }

    pub fn not_found(service: impl Into<String>, resource: impl Into<String>) -> Self {
        ApiError::NotFound {
            service: service.into(),
            resource: resource.into(),
        }
    }

    pub fn validation(service: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        ApiError::Validation {
            service: service.into(),
            violations,
        }
    }

    pub fn rate_limited(service: impl Into<String>, retry_after: Option<u64>) -> Self {
        ApiError::RateLimited {
            service: service.into(),
            retry_after_secs: retry_after,
        }
    }

    pub fn network(service: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Network {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn http(service: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    pub fn decode(service: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Decode {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn io(service: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Io {
            service: service.into(),
            message: message.into(),
        }
    }
}
