//! API error handling

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::{ValidationErrors, ValidationErrorsKind};

use core_kernel::{IdParseError, PortError};
use domain_quote::QuoteError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request expired: {0}")]
    RequestExpired(String),

    /// The selected coverage has no price; never reported as a zero premium
    #[error("Rate not found: {0}")]
    RateNotFound(String),

    #[error("Validation error: {message}")]
    Validation { message: String, details: Vec<String> },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) | ApiError::RequestExpired(_) => StatusCode::CONFLICT,
            ApiError::RateNotFound(_) | ApiError::Validation { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::RequestExpired(_) => "request_expired",
            ApiError::RateNotFound(_) => "rate_not_found",
            ApiError::Validation { .. } => "validation_error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_type = self.error_type();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let (message, details) = match self {
            ApiError::Validation { message, details } if !details.is_empty() => {
                (message, Some(details))
            }
            ApiError::Validation { message, .. } => (message, None),
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::RequestExpired(msg)
            | ApiError::RateNotFound(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => (msg, None),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<QuoteError> for ApiError {
    fn from(err: QuoteError) -> Self {
        let message = err.to_string();
        match err {
            QuoteError::RateNotFound(_) => ApiError::RateNotFound(message),
            QuoteError::ProductNotFound(_) => ApiError::NotFound(message),
            // Another tenant's product is reported exactly like a missing one
            QuoteError::TenantMismatch { .. } => ApiError::NotFound("Product not found".to_string()),
            QuoteError::ProductInactive(_)
            | QuoteError::MissingReviewDetail(_)
            | QuoteError::Validation(_) => ApiError::validation(message),
            QuoteError::CustomerContactRequired { reasons } => ApiError::Validation {
                message,
                details: reasons,
            },
            QuoteError::InvalidStateTransition { .. } => ApiError::Conflict(message),
            QuoteError::RequestExpired(_) => ApiError::RequestExpired(message),
            QuoteError::NumberGenerationExhausted(_) => ApiError::ServiceUnavailable(message),
            QuoteError::Port(port) => ApiError::from(port),
            QuoteError::NoEligibilityFailures
            | QuoteError::InvalidConfiguration(_)
            | QuoteError::Money(_)
            | QuoteError::Temporal(_) => ApiError::Internal(message),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        let message = err.to_string();
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(message),
            PortError::Conflict { .. } => ApiError::Conflict(message),
            PortError::Validation { .. } => ApiError::validation(message),
            PortError::Connection { .. } | PortError::Timeout { .. } => {
                ApiError::ServiceUnavailable(message)
            }
            PortError::Internal { .. } => ApiError::Internal(message),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details = Vec::new();
        collect_field_errors("", &errors, &mut details);
        details.sort();
        ApiError::Validation {
            message: "Request failed validation".to_string(),
            details,
        }
    }
}

impl From<IdParseError> for ApiError {
    fn from(e: IdParseError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Flattens nested validator output into `path: code` lines
fn collect_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for e in field_errors {
                    let reason = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    out.push(format!("{path}: {reason}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_quote::{RateNotFoundError, VehicleClass};

    #[test]
    fn test_rate_not_found_is_unprocessable() {
        let err = ApiError::from(QuoteError::from(RateNotFoundError {
            tier: "Gold".to_string(),
            term_months: 60,
            vehicle_class: VehicleClass::C,
        }));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_type(), "rate_not_found");
    }

    #[test]
    fn test_transition_and_expiry_conflict() {
        let transition = ApiError::from(QuoteError::invalid_transition("quoted", "declined"));
        assert_eq!(transition.status(), StatusCode::CONFLICT);
        assert_eq!(transition.error_type(), "conflict");

        let expired = ApiError::from(QuoteError::RequestExpired("SQR-1-000001".to_string()));
        assert_eq!(expired.status(), StatusCode::CONFLICT);
        assert_eq!(expired.error_type(), "request_expired");
    }

    #[test]
    fn test_customer_contact_reasons_become_details() {
        let err = ApiError::from(QuoteError::CustomerContactRequired {
            reasons: vec!["vehicle exceeds maximum mileage of 150000".to_string()],
        });
        match err {
            ApiError::Validation { details, .. } => assert_eq!(details.len(), 1),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_port_errors_by_kind() {
        assert_eq!(
            ApiError::from(PortError::not_found("Quote", "QTE-1")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(PortError::connection("down")).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
