use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::{settlement_gateway::GatewayError, storage::StorageError},
    services::validator::ValidationError,
    state::{form::UnknownRow, submission::AlreadyInFlight},
};

/// Errors that can end a settlement attempt.
///
/// Everything except [`SettlementError::AlreadyInFlight`] is recovered by the
/// submitter and shown to the user as an error notification.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Another attempt holds the submitter.
    #[error(transparent)]
    AlreadyInFlight(#[from] AlreadyInFlight),
    /// Configuration or input did not pass validation; no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The endpoint answered with a non-success HTTP status.
    #[error("request failed: {status}")]
    Transport { status: u16 },
    /// The endpoint processed the request but reported a failure.
    #[error("{message}")]
    Remote { message: String },
    /// The endpoint could not be reached.
    #[error("{0}")]
    Network(#[source] GatewayError),
    /// The endpoint answered with a body that is not a settlement reply.
    #[error("{0}")]
    Decode(#[source] GatewayError),
    /// Settings could not be read back from storage.
    #[error("could not read settings: {0}")]
    Storage(#[from] StorageError),
    /// The attempt exceeded its time limit.
    #[error("settlement request timed out")]
    Timeout,
}

impl From<GatewayError> for SettlementError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::RequestStatus { status, .. } => SettlementError::Transport {
                status: status.as_u16(),
            },
            err @ GatewayError::DecodeResponse { .. } => SettlementError::Decode(err),
            other => SettlementError::Network(other),
        }
    }
}

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<UnknownRow> for ServiceError {
    fn from(err: UnknownRow) -> Self {
        ServiceError::NotFound(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
