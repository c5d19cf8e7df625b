#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{FinalizeCommit, MatchEntity, MatchScoreUpdate, TeamEntity};
use crate::dao::storage::{StorageError, StorageResult};
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for teams and matches.
///
/// Listing order is part of the contract: teams come back by registration time,
/// active matches by scheduled start time.
pub trait TournamentStore: Send + Sync {
    /// Every team in registration order.
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    /// `Ok(None)` when no team has this id.
    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// Insert a new team; an existing id is a [`StorageError::Conflict`].
    fn create_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Scheduled and in-progress matches only.
    fn list_active_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    /// Any match by id, finished ones included.
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    /// Insert a newly scheduled match.
    fn create_match(&self, game: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Overwrite status and sets of a match that is not finished yet.
    ///
    /// Fails with [`StorageError::MatchAlreadyFinished`] once the match is finished.
    fn update_match_score(
        &self,
        id: Uuid,
        update: MatchScoreUpdate,
    ) -> BoxFuture<'static, StorageResult<MatchEntity>>;
    /// Finish the match and apply both team increments as one unit.
    ///
    /// Refuses a match that is already finished, and leaves team stats untouched
    /// when either team is missing.
    fn finalize_match(&self, commit: FinalizeCommit)
    -> BoxFuture<'static, StorageResult<MatchEntity>>;
    /// Cheap round trip polled by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
