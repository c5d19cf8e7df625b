use std::error::Error;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    #[error("team `{id}` not found")]
    TeamNotFound { id: Uuid },
    #[error("match `{id}` not found")]
    MatchNotFound { id: Uuid },
    /// The guarded write found the match already finished.
    #[error("match `{id}` is already finished")]
    MatchAlreadyFinished { id: Uuid },
    /// Concurrent writers kept invalidating the document revision.
    #[error("write conflict: {message}")]
    Conflict { message: String },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
