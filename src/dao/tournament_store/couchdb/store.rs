use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dao::{
    models::{FinalizeCommit, MatchEntity, MatchScoreUpdate, MatchStatusEntity, TeamEntity},
    storage::{StorageError, StorageResult},
    tournament_store::TournamentStore,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, CouchMatchDocument, CouchStatsUpdate, CouchTeamDocument, END_SUFFIX,
        MATCH_PREFIX, TEAM_PREFIX, extract_uuid, match_doc_id, team_doc_id,
    },
};

/// Attempts at a read-modify-write cycle before giving up on a contended document.
const MAX_CAS_ATTEMPTS: usize = 5;

/// CouchDB-backed [`TournamentStore`].
///
/// CouchDB has no multi-document transactions: a finalized match records its standings
/// increments as pending, each team document remembers which matches it already counted,
/// and pending increments are replayed on (re)connection.
#[derive(Clone)]
pub struct CouchTournamentStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

enum PutOutcome {
    Stored,
    Conflict,
}

enum Edit {
    Write,
    Skip,
}

impl CouchTournamentStore {
    /// Establish a connection to CouchDB, ensure the database exists and settle any
    /// finalization left half-applied.
    pub async fn connect(config: CouchConfig) -> StorageResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        store.recover_pending().await?;
        Ok(store)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, self.database, path);
        self.with_auth(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = format!("{}/{}", self.base_url, self.database);

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::unreachable(&database, source))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .with_auth(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::unreachable(&database, source))?;
                if create.status().is_success() {
                    info!(%database, "created CouchDB database");
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseUnavailable {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseUnavailable {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::unreachable(doc_id, source))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|source| CouchDaoError::unreachable(doc_id, source))?;
                serde_json::from_slice(&body)
                    .map(Some)
                    .map_err(|source| CouchDaoError::malformed(doc_id, source))
            }
            other => Err(CouchDaoError::unexpected_status(doc_id, other)),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<PutOutcome>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::unreachable(doc_id, source))?;

        match response.status() {
            StatusCode::CONFLICT => Ok(PutOutcome::Conflict),
            status if status.is_success() => Ok(PutOutcome::Stored),
            other => Err(CouchDaoError::unexpected_status(doc_id, other)),
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        const ALL_DOCS: &str = "_all_docs";
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{}\"", prefix)),
            ("endkey", format!("\"{}{}\"", prefix, END_SUFFIX)),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::unreachable(ALL_DOCS, source))?;

        if !response.status().is_success() {
            return Err(CouchDaoError::unexpected_status(ALL_DOCS, response.status()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| CouchDaoError::unreachable(ALL_DOCS, source))?;
        let payload: AllDocsResponse = serde_json::from_slice(&body)
            .map_err(|source| CouchDaoError::malformed(ALL_DOCS, source))?;

        let mut documents = Vec::new();
        for row in payload.rows {
            if let Some(doc) = row.doc {
                let parsed =
                    from_value(doc).map_err(|source| CouchDaoError::malformed(&row.id, source))?;
                documents.push(parsed);
            }
        }

        Ok(documents)
    }

    /// Read-modify-write `doc_id` under `_rev` control, retrying on conflicts.
    ///
    /// Returns `None` when the document does not exist.
    async fn modify<T, F>(&self, doc_id: &str, mut edit: F) -> StorageResult<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut(&mut T) -> StorageResult<Edit>,
    {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let Some(mut doc) = self.get_document::<T>(doc_id).await? else {
                return Ok(None);
            };

            match edit(&mut doc)? {
                Edit::Skip => return Ok(Some(doc)),
                Edit::Write => match self.put_document(doc_id, &doc).await? {
                    PutOutcome::Stored => return Ok(Some(doc)),
                    PutOutcome::Conflict => continue,
                },
            }
        }

        Err(StorageError::Conflict {
            message: format!("document `{doc_id}` kept changing during update"),
        })
    }

    async fn list_teams(&self) -> StorageResult<Vec<TeamEntity>> {
        let docs = self
            .list_documents::<CouchTeamDocument>(TEAM_PREFIX)
            .await?;
        let mut teams = docs
            .into_iter()
            .map(TeamEntity::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        teams.sort_by_key(|team| team.created_at);
        Ok(teams)
    }

    async fn list_active_matches(&self) -> StorageResult<Vec<MatchEntity>> {
        let docs = self
            .list_documents::<CouchMatchDocument>(MATCH_PREFIX)
            .await?;
        let mut matches = docs
            .into_iter()
            .filter(|doc| doc.game.status.is_active())
            .map(MatchEntity::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        matches.sort_by_key(|game| game.starts_at);
        Ok(matches)
    }

    async fn update_match_score(
        &self,
        id: Uuid,
        update: MatchScoreUpdate,
    ) -> StorageResult<MatchEntity> {
        let doc = self
            .modify::<CouchMatchDocument, _>(&match_doc_id(id), |doc| {
                if doc.game.status == MatchStatusEntity::Finished {
                    return Err(StorageError::MatchAlreadyFinished { id });
                }
                doc.game.status = update.status;
                doc.game.sets = update.sets.clone();
                doc.game.updated_at = update.updated_at;
                Ok(Edit::Write)
            })
            .await?
            .ok_or(StorageError::MatchNotFound { id })?;

        Ok(doc.try_into()?)
    }

    async fn finalize_match(&self, commit: FinalizeCommit) -> StorageResult<MatchEntity> {
        let id = commit.match_id;

        for update in &commit.teams {
            let doc_id = team_doc_id(update.team_id);
            if self
                .get_document::<CouchTeamDocument>(&doc_id)
                .await?
                .is_none()
            {
                return Err(StorageError::TeamNotFound { id: update.team_id });
            }
        }

        let pending: Vec<CouchStatsUpdate> = commit.teams.iter().copied().map(Into::into).collect();
        let finished = self
            .modify::<CouchMatchDocument, _>(&match_doc_id(id), |doc| {
                if doc.game.status == MatchStatusEntity::Finished {
                    return Err(StorageError::MatchAlreadyFinished { id });
                }
                doc.game.status = MatchStatusEntity::Finished;
                doc.game.sets = commit.sets.clone();
                doc.game.winner_id = Some(commit.winner_id);
                doc.game.finished_at = Some(commit.finished_at);
                doc.game.updated_at = commit.finished_at;
                doc.game.pending_stats = pending.clone();
                Ok(Edit::Write)
            })
            .await?
            .ok_or(StorageError::MatchNotFound { id })?;

        self.apply_pending(id, &pending).await?;

        Ok(finished.try_into()?)
    }

    /// Apply pending increments to team documents, then clear them from the match.
    /// Safe to run more than once for the same match.
    ///
    /// A missing team fails with [`StorageError::TeamNotFound`] and leaves the match
    /// pending, so a later replay can still complete it.
    async fn apply_pending(&self, match_id: Uuid, pending: &[CouchStatsUpdate]) -> StorageResult<()> {
        for update in pending {
            self.modify::<CouchTeamDocument, _>(&team_doc_id(update.team_id), |doc| {
                if doc.team.applied_matches.contains(&match_id) {
                    return Ok(Edit::Skip);
                }
                doc.team.stats.accumulate(&update.delta);
                doc.team.applied_matches.push(match_id);
                doc.team.updated_at = SystemTime::now();
                Ok(Edit::Write)
            })
            .await?
            .ok_or(StorageError::TeamNotFound { id: update.team_id })?;
        }

        self.modify::<CouchMatchDocument, _>(&match_doc_id(match_id), |doc| {
            if doc.game.pending_stats.is_empty() {
                return Ok(Edit::Skip);
            }
            doc.game.pending_stats.clear();
            Ok(Edit::Write)
        })
        .await?;

        Ok(())
    }

    async fn recover_pending(&self) -> StorageResult<()> {
        let docs = self
            .list_documents::<CouchMatchDocument>(MATCH_PREFIX)
            .await?;

        for doc in docs.into_iter().filter(|doc| !doc.game.pending_stats.is_empty()) {
            let match_id = extract_uuid(&doc.id)?;
            warn!(%match_id, "replaying standings update left pending");
            match self.apply_pending(match_id, &doc.game.pending_stats).await {
                Ok(()) => {}
                Err(StorageError::TeamNotFound { id }) => {
                    warn!(%match_id, team_id = %id, "team document missing, standings update stays pending");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

impl TournamentStore for CouchTournamentStore {
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_teams().await })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let maybe_doc = store
                .get_document::<CouchTeamDocument>(&team_doc_id(id))
                .await?;
            Ok(maybe_doc.map(TeamEntity::try_from).transpose()?)
        })
    }

    fn create_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc = CouchTeamDocument::from(team);
            match store.put_document(&doc.id, &doc).await? {
                PutOutcome::Stored => Ok(()),
                PutOutcome::Conflict => Err(StorageError::Conflict {
                    message: format!("document `{}` already exists", doc.id),
                }),
            }
        })
    }

    fn list_active_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_active_matches().await })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let maybe_doc = store
                .get_document::<CouchMatchDocument>(&match_doc_id(id))
                .await?;
            Ok(maybe_doc.map(MatchEntity::try_from).transpose()?)
        })
    }

    fn create_match(&self, game: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc = CouchMatchDocument::from(game);
            match store.put_document(&doc.id, &doc).await? {
                PutOutcome::Stored => Ok(()),
                PutOutcome::Conflict => Err(StorageError::Conflict {
                    message: format!("document `{}` already exists", doc.id),
                }),
            }
        })
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
        Box::pin(async move {
            let url = format!("{}/{}", store.base_url, store.database);
            let response = store
                .with_auth(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::unreachable(&store.database, source))?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::DatabaseUnavailable {
                    database: store.database.to_string(),
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_database().await?;
            store.recover_pending().await
        })
    }
}
