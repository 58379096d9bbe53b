//! Unified error handling with Sentry integration.
//!
//! Nothing in this service is fatal from the shopper's point of view: remote
//! failures degrade to local-only or empty-result behavior inside the stores
//! and never reach this type. What does reach it is the typed taxonomy the
//! JSON surface exposes - validation, not-found, invalid-transition,
//! unauthorized - plus genuine server errors, which are captured to Sentry
//! before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use renewly_core::quote::{QuoteError, QuoteStatus};

use crate::models::forms::FieldError;
use crate::services::IdentityError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more form fields failed validation.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A quote status change that is not the immediate successor.
    #[error("cannot move a {from} quote to {to}")]
    InvalidTransition { from: QuoteStatus, to: QuoteStatus },

    /// Identity provider operation failed.
    #[error("Auth error: {0}")]
    Identity(#[from] IdentityError),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A hosted service this operation needs is not configured for this
    /// deployment.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side errors to Sentry
        if matches!(self, Self::Internal(_) | Self::Identity(IdentityError::Http(_))) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::Identity(err) => match err {
                IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Identity(err) => match err {
                IdentityError::InvalidCredentials => "Invalid email or password".to_string(),
                _ => "Identity service error".to_string(),
            },
            Self::Validation(_) => "validation failed".to_string(),
            _ => self.to_string(),
        };

        let fields = match self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        };

        (status, Json(ErrorBody { error: message, fields })).into_response()
    }
}

impl From<QuoteError> for AppError {
    fn from(error: QuoteError) -> Self {
        match error {
            QuoteError::NotFound(_) | QuoteError::LineNotFound { .. } => {
                Self::NotFound(error.to_string())
            }
            QuoteError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            QuoteError::EmptyLineItems
            | QuoteError::ZeroQuantity(_)
            | QuoteError::NegativePrice { .. } => Self::BadRequest(error.to_string()),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use renewly_core::QuoteId;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product p-123".to_string());
        assert_eq!(err.to_string(), "Not found: product p-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Validation(vec![])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::InvalidTransition {
                from: QuoteStatus::Review,
                to: QuoteStatus::Approved,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::NotConfigured("identity provider")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_quote_errors_map_to_typed_responses() {
        let not_found: AppError = QuoteError::NotFound(QuoteId::new("Q-MISSING")).into();
        assert!(matches!(not_found, AppError::NotFound(_)));

        let invalid: AppError = QuoteError::InvalidTransition {
            from: QuoteStatus::Requested,
            to: QuoteStatus::Quoted,
        }
        .into();
        assert!(matches!(invalid, AppError::InvalidTransition { .. }));

        let empty: AppError = QuoteError::EmptyLineItems.into();
        assert!(matches!(empty, AppError::BadRequest(_)));
    }
}
