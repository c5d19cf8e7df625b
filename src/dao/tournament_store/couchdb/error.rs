//! Failures of the CouchDB tournament store.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use super::models::{MATCH_PREFIX, TEAM_PREFIX};

/// Result alias for CouchDB store internals.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Which tournament document a request was about, derived from its id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `team::<uuid>`
    Team,
    /// `match::<uuid>`
    Match,
    /// Database-level paths such as `_all_docs`.
    Database,
}

impl DocumentKind {
    /// Classify `doc_id` by its prefix.
    pub fn of(doc_id: &str) -> Self {
        if doc_id.starts_with(TEAM_PREFIX) {
            Self::Team
        } else if doc_id.starts_with(MATCH_PREFIX) {
            Self::Match
        } else {
            Self::Database
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Team => "team",
            Self::Match => "match",
            Self::Database => "database",
        })
    }
}

/// Failures that can occur while reading or writing tournament documents in CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// A required `COUCH_*` variable is not set.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The TLS backend of the HTTP client failed to initialise.
    #[error("failed to build the CouchDB HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The tournament database neither exists nor could be created.
    #[error("tournament database `{database}` unavailable (status {status})")]
    DatabaseUnavailable {
        database: String,
        status: StatusCode,
    },
    /// The request for `doc_id` never got an answer, or its body could not be read.
    #[error("CouchDB unreachable while accessing {kind} `{doc_id}`")]
    Unreachable {
        kind: DocumentKind,
        doc_id: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered with a status the store has no handling for.
    #[error("CouchDB answered {status} for {kind} `{doc_id}`")]
    UnexpectedStatus {
        kind: DocumentKind,
        doc_id: String,
        status: StatusCode,
    },
    /// A stored team or match does not have the expected fields.
    #[error("stored {kind} `{doc_id}` is malformed")]
    MalformedDocument {
        kind: DocumentKind,
        doc_id: String,
        #[source]
        source: serde_json::Error,
    },
    /// A document id without the `<kind>::<uuid>` shape.
    #[error("document id `{doc_id}` is invalid: {reason}")]
    InvalidDocId {
        doc_id: String,
        reason: &'static str,
    },
}

impl CouchDaoError {
    pub fn unreachable(doc_id: &str, source: reqwest::Error) -> Self {
        Self::Unreachable {
            kind: DocumentKind::of(doc_id),
            doc_id: doc_id.to_owned(),
            source,
        }
    }

    pub fn unexpected_status(doc_id: &str, status: StatusCode) -> Self {
        Self::UnexpectedStatus {
            kind: DocumentKind::of(doc_id),
            doc_id: doc_id.to_owned(),
            status,
        }
    }

    pub fn malformed(doc_id: &str, source: serde_json::Error) -> Self {
        Self::MalformedDocument {
            kind: DocumentKind::of(doc_id),
            doc_id: doc_id.to_owned(),
            source,
        }
    }
}
