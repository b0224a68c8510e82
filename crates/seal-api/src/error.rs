//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps registry errors to HTTP status codes and JSON bodies carrying a
//! machine-readable code, the message, and for domain errors the error
//! kind. Store failures other than timeouts are never described to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use seal_registry::{GuardError, PlanError, RegistryError, SequenceError, StoreError};
use seal_state::TransitionError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// `{"kind", "retryable"}` for registry errors; absent for 500s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body or query could not be parsed (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Rejected by the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn classify(err: &RegistryError) -> (StatusCode, &'static str) {
    const UNPROCESSABLE: (StatusCode, &str) = (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
    const NOT_FOUND: (StatusCode, &str) = (StatusCode::NOT_FOUND, "NOT_FOUND");
    const CONFLICT: (StatusCode, &str) = (StatusCode::CONFLICT, "CONFLICT");
    const RETRYABLE: (StatusCode, &str) = (StatusCode::SERVICE_UNAVAILABLE, "RETRYABLE");

    match err {
        RegistryError::Validation(_) | RegistryError::DuplicateSector { .. } => UNPROCESSABLE,
        RegistryError::Sequence(e) => match e {
            SequenceError::InvalidRange { .. } | SequenceError::RangeTooLarge { .. } => UNPROCESSABLE,
            SequenceError::NonContiguous { .. } | SequenceError::CodeCollision { .. } => CONFLICT,
        },
        RegistryError::Transition(e) => match e {
            TransitionError::MissingReason { .. }
            | TransitionError::MissingSector { .. }
            | TransitionError::MissingShipment => UNPROCESSABLE,
            TransitionError::IllegalTransition { .. } | TransitionError::TerminalStateUsed { .. } => {
                CONFLICT
            }
        },
        RegistryError::Plan(e) => match e {
            PlanError::InvalidQuantity { .. } | PlanError::InsufficientSectors { .. } => UNPROCESSABLE,
            PlanError::InsufficientStock { .. } => CONFLICT,
        },
        RegistryError::Guard(e) => match e {
            GuardError::LotNotFound { .. } => NOT_FOUND,
            GuardError::LotHasDistributedSeals { .. } => CONFLICT,
        },
        RegistryError::SealNotFound { .. } | RegistryError::UnknownSector { .. } => NOT_FOUND,
        RegistryError::ConcurrentModification { .. } | RegistryError::Store(StoreError::Timeout { .. }) => {
            RETRYABLE
        }
        RegistryError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Registry(e) => classify(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let internal = status == StatusCode::INTERNAL_SERVER_ERROR;

        if internal {
            tracing::error!(error = %self, "internal server error");
        } else if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::warn!(error = %self, "transient failure");
        }

        let (message, details) = match &self {
            _ if internal => ("An internal error occurred".to_string(), None),
            Self::Registry(e) => (
                e.to_string(),
                Some(serde_json::json!({ "kind": e.kind(), "retryable": e.is_retryable() })),
            ),
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Malformed identifiers in paths, queries, or bodies.
impl From<seal_core::ValidationError> for AppError {
    fn from(err: seal_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<seal_state::ParseStatusError> for AppError {
    fn from(err: seal_state::ParseStatusError) -> Self {
        Self::Validation(err.to_string())
    }
}
