use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    state::{match_lifecycle::InvalidTransition, ranking::IncompleteMatch, scoring::InvalidSetScore},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Set scores that do not form a valid best-of-3 sequence.
    #[error(transparent)]
    InvalidSetScore(#[from] InvalidSetScore),
    /// Finalization requested without a decided winner.
    #[error(transparent)]
    IncompleteMatch(#[from] IncompleteMatch),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("team `{0}` not found")]
    TeamNotFound(Uuid),
    #[error("match `{0}` not found")]
    MatchNotFound(Uuid),
    #[error("match `{0}` is already finished")]
    AlreadyFinished(Uuid),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TeamNotFound { id } => ServiceError::TeamNotFound(id),
            StorageError::MatchNotFound { id } => ServiceError::MatchNotFound(id),
            StorageError::MatchAlreadyFinished { id } => ServiceError::AlreadyFinished(id),
            StorageError::Conflict { message } => ServiceError::InvalidState(message),
            other @ StorageError::Unavailable { .. } => ServiceError::Unavailable(other),
        }
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
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidSetScore(err) => AppError::BadRequest(err.to_string()),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            err @ (ServiceError::IncompleteMatch(_)
            | ServiceError::InvalidTransition(_)
            | ServiceError::AlreadyFinished(_)) => AppError::Conflict(err.to_string()),
            err @ (ServiceError::TeamNotFound(_) | ServiceError::MatchNotFound(_)) => {
                AppError::NotFound(err.to_string())
            }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn domain_errors_map_to_documented_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(
            status_of(ServiceError::InvalidSetScore(InvalidSetScore::MalformedSet {
                set: 2,
                team_a: 5,
                team_b: 5,
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::IncompleteMatch(IncompleteMatch {
                match_id: id,
                team_a: 1,
                team_b: 1,
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ServiceError::TeamNotFound(id)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ServiceError::MatchNotFound(id)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ServiceError::AlreadyFinished(id)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ServiceError::Degraded),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn storage_lookups_become_not_found() {
        let id = Uuid::new_v4();
        let err: ServiceError = StorageError::TeamNotFound { id }.into();
        assert!(matches!(err, ServiceError::TeamNotFound(found) if found == id));

        let err: ServiceError = StorageError::unavailable(
            "down".into(),
            std::io::Error::other("connection refused"),
        )
        .into();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }
}
