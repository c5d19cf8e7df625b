use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB store internals.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures of the MongoDB tournament store, each naming the team or match involved.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// `MONGO_URI` is not set.
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The connection string could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    /// The driver rejected the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    /// The tournament database never answered a ping.
    #[error("MongoDB database `{database}` unreachable after {attempts} attempt(s)")]
    InitialPing {
        database: String,
        attempts: u32,
        #[source]
        source: MongoError,
    },
    /// Periodic ping used by the storage supervisor.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    /// Index creation on connect or reconnect.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    /// Team registration.
    #[error("failed to insert team `{id}`")]
    InsertTeam {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    /// Team lookup by id.
    #[error("failed to load team `{id}`")]
    LoadTeam {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    /// Team listing for rankings and standings.
    #[error("failed to list teams")]
    ListTeams {
        #[source]
        source: MongoError,
    },
    /// Match scheduling.
    #[error("failed to insert match `{id}`")]
    InsertMatch {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    /// Match lookup by id.
    #[error("failed to load match `{id}`")]
    LoadMatch {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    /// Active match listing.
    #[error("failed to list active matches")]
    ListMatches {
        #[source]
        source: MongoError,
    },
    /// Guarded score update.
    #[error("failed to update match `{id}`")]
    UpdateMatch {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    /// Any step of the finalize transaction, including commit.
    #[error("finalization transaction for match `{id}` failed")]
    Transaction {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    /// A stored `_id` that is not a UUID string.
    #[error("stored document has an invalid id `{id}`")]
    InvalidDocumentId { id: String },
}
