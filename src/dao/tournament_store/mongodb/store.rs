use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, ClientSession, Collection, Database, IndexModel,
    bson::{DateTime, doc},
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::open_tournament_database,
    error::{MongoDaoError, MongoResult},
    models::{MongoMatchDocument, MongoTeamDocument, doc_id, sets_as_bson, stats_increment},
};
use crate::dao::{
    models::{FinalizeCommit, MatchEntity, MatchScoreUpdate, MatchStatusEntity, TeamEntity},
    storage::{StorageError, StorageResult},
    tournament_store::TournamentStore,
};

const TEAM_COLLECTION_NAME: &str = "teams";
const MATCH_COLLECTION_NAME: &str = "matches";

/// MongoDB-backed [`TournamentStore`].
///
/// Finalization runs in a multi-document transaction and therefore needs a replica set
/// (a single-node replica set is enough).
#[derive(Clone)]
pub struct MongoTournamentStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            open_tournament_database(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoTournamentStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            open_tournament_database(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let matches = self.matches().await;
        let active_index = IndexModel::builder()
            .keys(doc! {"status": 1, "starts_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("match_status_start_idx".to_owned()))
                    .build(),
            )
            .build();
        matches
            .create_index(active_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MATCH_COLLECTION_NAME,
                index: "status,starts_at",
                source,
            })?;

        let teams = self.teams().await;
        let standings_index = IndexModel::builder()
            .keys(doc! {"category": 1, "zone": 1, "stats.points": -1, "stats.games_for": -1})
            .options(
                IndexOptions::builder()
                    .name(Some("team_standings_idx".to_owned()))
                    .build(),
            )
            .build();
        teams
            .create_index(standings_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: TEAM_COLLECTION_NAME,
                index: "category,zone,points,games_for",
                source,
            })?;

        Ok(())
    }

    async fn client(&self) -> Client {
        let guard = self.inner.state.read().await;
        guard.client.clone()
    }

    async fn teams(&self) -> Collection<MongoTeamDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoTeamDocument>(TEAM_COLLECTION_NAME)
    }

    async fn matches(&self) -> Collection<MongoMatchDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
    }

    async fn list_teams(&self) -> MongoResult<Vec<TeamEntity>> {
        let documents: Vec<MongoTeamDocument> = self
            .teams()
            .await
            .find(doc! {})
            .sort(doc! {"created_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListTeams { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListTeams { source })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_team(&self, id: Uuid) -> MongoResult<Option<TeamEntity>> {
        self.teams()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadTeam { id, source })?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn create_team(&self, team: TeamEntity) -> MongoResult<()> {
        let id = team.id;
        let document: MongoTeamDocument = team.into();
        self.teams()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::InsertTeam { id, source })?;
        Ok(())
    }

    async fn list_active_matches(&self) -> MongoResult<Vec<MatchEntity>> {
        let active = [
            MatchStatusEntity::Scheduled.as_str(),
            MatchStatusEntity::InProgress.as_str(),
        ];
        let documents: Vec<MongoMatchDocument> = self
            .matches()
            .await
            .find(doc! {"status": {"$in": active.to_vec()}})
            .sort(doc! {"starts_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_match(&self, id: Uuid) -> MongoResult<Option<MatchEntity>> {
        self.matches()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadMatch { id, source })?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn create_match(&self, game: MatchEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoMatchDocument = game.into();
        self.matches()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::InsertMatch { id, source })?;
        Ok(())
    }

    /// Explain why a guarded match update matched nothing.
    async fn guard_failure(&self, id: Uuid) -> StorageError {
        match self.find_match(id).await {
            Ok(Some(_)) => StorageError::MatchAlreadyFinished { id },
            Ok(None) => StorageError::MatchNotFound { id },
            Err(err) => err.into(),
        }
    }

    async fn update_match_score(
        &self,
        id: Uuid,
        update: MatchScoreUpdate,
    ) -> StorageResult<MatchEntity> {
        let filter = not_finished(id);
        let changes = doc! {
            "$set": {
                "status": update.status.as_str(),
                "sets": sets_as_bson(&update.sets),
                "updated_at": DateTime::from_system_time(update.updated_at),
            }
        };

        let updated = self
            .matches()
            .await
            .find_one_and_update(filter, changes)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdateMatch { id, source })?;

        match updated {
            Some(document) => Ok(document.try_into()?),
            None => Err(self.guard_failure(id).await),
        }
    }

    async fn finalize_match(&self, commit: FinalizeCommit) -> StorageResult<MatchEntity> {
        let id = commit.match_id;
        let client = self.client().await;
        let mut session = client
            .start_session()
            .await
            .map_err(|source| MongoDaoError::Transaction { id, source })?;
        session
            .start_transaction()
            .await
            .map_err(|source| MongoDaoError::Transaction { id, source })?;

        match self.finalize_in_session(&mut session, &commit).await {
            Ok(document) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(|source| MongoDaoError::Transaction { id, source })?;
                Ok(document.try_into()?)
            }
            Err(err) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    warn!(match_id = %id, error = %abort_err, "failed to abort finalization");
                }
                match err {
                    FinalizeFailure::Guard => Err(self.guard_failure(id).await),
                    FinalizeFailure::Storage(err) => Err(err),
                }
            }
        }
    }

    async fn finalize_in_session(
        &self,
        session: &mut ClientSession,
        commit: &FinalizeCommit,
    ) -> Result<MongoMatchDocument, FinalizeFailure> {
        let id = commit.match_id;
        let finished_at = DateTime::from_system_time(commit.finished_at);
        let changes = doc! {
            "$set": {
                "status": MatchStatusEntity::Finished.as_str(),
                "sets": sets_as_bson(&commit.sets),
                "winner_id": commit.winner_id.to_string(),
                "finished_at": finished_at,
                "updated_at": finished_at,
            }
        };

        let finished = self
            .matches()
            .await
            .find_one_and_update(not_finished(id), changes)
            .return_document(ReturnDocument::After)
            .session(&mut *session)
            .await
            .map_err(|source| MongoDaoError::Transaction { id, source })?
            .ok_or(FinalizeFailure::Guard)?;

        let teams = self.teams().await;
        for update in &commit.teams {
            let result = teams
                .update_one(
                    doc_id(update.team_id),
                    doc! {
                        "$inc": stats_increment(&update.delta),
                        "$set": {"updated_at": finished_at},
                    },
                )
                .session(&mut *session)
                .await
                .map_err(|source| MongoDaoError::Transaction { id, source })?;

            if result.matched_count == 0 {
                return Err(StorageError::TeamNotFound { id: update.team_id }.into());
            }
        }

        Ok(finished)
    }
}

enum FinalizeFailure {
    /// The match was missing or already finished.
    Guard,
    Storage(StorageError),
}

impl From<StorageError> for FinalizeFailure {
    fn from(err: StorageError) -> Self {
        FinalizeFailure::Storage(err)
    }
}

impl From<MongoDaoError> for FinalizeFailure {
    fn from(err: MongoDaoError) -> Self {
        FinalizeFailure::Storage(err.into())
    }
}

fn not_finished(id: Uuid) -> mongodb::bson::Document {
    doc! {
        "_id": id.to_string(),
        "status": {"$ne": MatchStatusEntity::Finished.as_str()},
    }
}

impl TournamentStore for MongoTournamentStore {
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_teams().await.map_err(Into::into) })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_team(id).await.map_err(Into::into) })
    }

    fn create_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.create_team(team).await.map_err(Into::into) })
    }

    fn list_active_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_active_matches().await.map_err(Into::into) })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_match(id).await.map_err(Into::into) })
    }

    fn create_match(&self, game: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.create_match(game).await.map_err(Into::into) })
    }

    fn update_match_score(
        &self,
        id: Uuid,
        update: MatchScoreUpdate,
    ) -> BoxFuture<'static, StorageResult<MatchEntity>> {
        let store = self.clone();
        Box::pin(async move { store.update_match_score(id, update).await })
    }

    fn finalize_match(
        &self,
        commit: FinalizeCommit,
    ) -> BoxFuture<'static, StorageResult<MatchEntity>> {
        let store = self.clone();
        Box::pin(async move { store.finalize_match(commit).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.reconnect().await?;
            store.ensure_indexes().await.map_err(Into::into)
        })
    }
}
