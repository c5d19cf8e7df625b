//! Process-local store used when no database is configured and by the test suites.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dao::{
    models::{FinalizeCommit, MatchEntity, MatchScoreUpdate, MatchStatusEntity, TeamEntity},
    storage::{StorageError, StorageResult},
    tournament_store::TournamentStore,
};

/// In-memory [`TournamentStore`]. Every write runs under a single lock, which makes
/// finalization trivially atomic.
#[derive(Clone, Default)]
pub struct MemoryTournamentStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    teams: IndexMap<Uuid, TeamEntity>,
    matches: IndexMap<Uuid, MatchEntity>,
}

impl MemoryTournamentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryState {
    fn finalize(&mut self, commit: FinalizeCommit) -> StorageResult<MatchEntity> {
        let id = commit.match_id;
        let game = self
            .matches
            .get(&id)
            .ok_or(StorageError::MatchNotFound { id })?;
        if game.status == MatchStatusEntity::Finished {
            return Err(StorageError::MatchAlreadyFinished { id });
        }

        // Check both teams before writing anything.
        for update in &commit.teams {
            if !self.teams.contains_key(&update.team_id) {
                return Err(StorageError::TeamNotFound { id: update.team_id });
            }
        }

        for update in &commit.teams {
            if let Some(team) = self.teams.get_mut(&update.team_id) {
                team.stats.accumulate(&update.delta);
                team.updated_at = commit.finished_at;
            }
        }

        let game = self
            .matches
            .get_mut(&id)
            .ok_or(StorageError::MatchNotFound { id })?;
        game.status = MatchStatusEntity::Finished;
        game.sets = commit.sets;
        game.winner_id = Some(commit.winner_id);
        game.finished_at = Some(commit.finished_at);
        game.updated_at = commit.finished_at;
        Ok(game.clone())
    }
}

impl TournamentStore for MemoryTournamentStore {
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let state = store.inner.lock().await;
            let mut teams: Vec<TeamEntity> = state.teams.values().cloned().collect();
            teams.sort_by_key(|team| team.created_at);
            Ok(teams)
        })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.lock().await.teams.get(&id).cloned()) })
    }

    fn create_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.lock().await.teams.insert(team.id, team);
            Ok(())
        })
    }

    fn list_active_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let state = store.inner.lock().await;
            let mut matches: Vec<MatchEntity> = state
                .matches
                .values()
                .filter(|game| game.status.is_active())
                .cloned()
                .collect();
            matches.sort_by_key(|game| game.starts_at);
            Ok(matches)
        })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.lock().await.matches.get(&id).cloned()) })
    }

    fn create_match(&self, game: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.lock().await.matches.insert(game.id, game);
            Ok(())
        })
    }

    fn update_match_score(
        &self,
        id: Uuid,
        update: MatchScoreUpdate,
    ) -> BoxFuture<'static, StorageResult<MatchEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let mut state = store.inner.lock().await;
            let game = state
                .matches
                .get_mut(&id)
                .ok_or(StorageError::MatchNotFound { id })?;
            if game.status == MatchStatusEntity::Finished {
                return Err(StorageError::MatchAlreadyFinished { id });
            }
            game.status = update.status;
            game.sets = update.sets;
            game.updated_at = update.updated_at;
            Ok(game.clone())
        })
    }

    fn finalize_match(
        &self,
        commit: FinalizeCommit,
    ) -> BoxFuture<'static, StorageResult<MatchEntity>> {
        let store = self.clone();
        Box::pin(async move { store.inner.lock().await.finalize(commit) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::dao::models::{MatchTeamEntity, SetScoreEntity, TeamStatsEntity, TeamStatsUpdate};

    fn team(name: &str, created_at: SystemTime) -> TeamEntity {
        TeamEntity {
            id: Uuid::new_v4(),
            name: name.into(),
            player_one: "Uno".into(),
            player_two: "Dos".into(),
            category: "5ta Caballeros".into(),
            zone: "Zona A".into(),
            stats: TeamStatsEntity::default(),
            created_at,
            updated_at: created_at,
        }
    }

    fn scheduled(a: &TeamEntity, b: &TeamEntity, starts_at: SystemTime) -> MatchEntity {
        MatchEntity {
            id: Uuid::new_v4(),
            team_a: MatchTeamEntity {
                id: a.id,
                name: a.name.clone(),
            },
            team_b: MatchTeamEntity {
                id: b.id,
                name: b.name.clone(),
            },
            court: "Cancha 1".into(),
            starts_at,
            round: "Jornada 1".into(),
            zone: "Zona A".into(),
            status: MatchStatusEntity::Scheduled,
            sets: Vec::new(),
            winner_id: None,
            finished_at: None,
            created_at: starts_at,
            updated_at: starts_at,
        }
    }

    fn commit_for(game: &MatchEntity) -> FinalizeCommit {
        FinalizeCommit {
            match_id: game.id,
            sets: vec![
                SetScoreEntity {
                    team_a: 6,
                    team_b: 1,
                },
                SetScoreEntity {
                    team_a: 6,
                    team_b: 2,
                },
            ],
            winner_id: game.team_a.id,
            finished_at: SystemTime::now(),
            teams: [
                TeamStatsUpdate {
                    team_id: game.team_a.id,
                    delta: TeamStatsEntity {
                        matches_played: 1,
                        matches_won: 1,
                        matches_lost: 0,
                        games_for: 12,
                        games_against: 3,
                        points: 2,
                    },
                },
                TeamStatsUpdate {
                    team_id: game.team_b.id,
                    delta: TeamStatsEntity {
                        matches_played: 1,
                        matches_won: 0,
                        matches_lost: 1,
                        games_for: 3,
                        games_against: 12,
                        points: 0,
                    },
                },
            ],
        }
    }

    #[tokio::test]
    async fn teams_are_listed_by_registration_time() {
        let store = MemoryTournamentStore::new();
        let base = SystemTime::UNIX_EPOCH;
        let late = team("Late", base + Duration::from_secs(10));
        let early = team("Early", base);
        store.create_team(late.clone()).await.unwrap();
        store.create_team(early.clone()).await.unwrap();

        let names: Vec<_> = store
            .list_teams()
            .await
            .unwrap()
            .into_iter()
            .map(|team| team.name)
            .collect();
        assert_eq!(names, vec!["Early", "Late"]);
    }

    #[tokio::test]
    async fn active_matches_exclude_finished_and_sort_by_start() {
        let store = MemoryTournamentStore::new();
        let base = SystemTime::UNIX_EPOCH;
        let a = team("A", base);
        let b = team("B", base);
        store.create_team(a.clone()).await.unwrap();
        store.create_team(b.clone()).await.unwrap();

        let later = scheduled(&a, &b, base + Duration::from_secs(3600));
        let sooner = scheduled(&a, &b, base + Duration::from_secs(60));
        let done = scheduled(&a, &b, base);
        for game in [&later, &sooner, &done] {
            store.create_match(game.clone()).await.unwrap();
        }
        store.finalize_match(commit_for(&done)).await.unwrap();

        let ids: Vec<_> = store
            .list_active_matches()
            .await
            .unwrap()
            .into_iter()
            .map(|game| game.id)
            .collect();
        assert_eq!(ids, vec![sooner.id, later.id]);
    }

    #[tokio::test]
    async fn finalize_applies_both_increments_once() {
        let store = MemoryTournamentStore::new();
        let a = team("A", SystemTime::UNIX_EPOCH);
        let b = team("B", SystemTime::UNIX_EPOCH);
        store.create_team(a.clone()).await.unwrap();
        store.create_team(b.clone()).await.unwrap();
        let game = scheduled(&a, &b, SystemTime::UNIX_EPOCH);
        store.create_match(game.clone()).await.unwrap();

        let finished = store.finalize_match(commit_for(&game)).await.unwrap();
        assert_eq!(finished.status, MatchStatusEntity::Finished);
        assert_eq!(finished.winner_id, Some(a.id));

        let again = store.finalize_match(commit_for(&game)).await;
        assert!(matches!(
            again,
            Err(StorageError::MatchAlreadyFinished { .. })
        ));

        let winner = store.find_team(a.id).await.unwrap().unwrap();
        let loser = store.find_team(b.id).await.unwrap().unwrap();
        assert_eq!(winner.stats.points, 2);
        assert_eq!(winner.stats.matches_played, 1);
        assert_eq!(loser.stats.matches_lost, 1);
        assert_eq!(loser.stats.games_against, 12);
    }

    #[tokio::test]
    async fn finalize_with_missing_team_writes_nothing() {
        let store = MemoryTournamentStore::new();
        let a = team("A", SystemTime::UNIX_EPOCH);
        let ghost = team("Ghost", SystemTime::UNIX_EPOCH);
        store.create_team(a.clone()).await.unwrap();
        let game = scheduled(&a, &ghost, SystemTime::UNIX_EPOCH);
        store.create_match(game.clone()).await.unwrap();

        let result = store.finalize_match(commit_for(&game)).await;
        assert!(matches!(result, Err(StorageError::TeamNotFound { id }) if id == ghost.id));

        let unchanged = store.find_match(game.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, MatchStatusEntity::Scheduled);
        let team_a = store.find_team(a.id).await.unwrap().unwrap();
        assert_eq!(team_a.stats, TeamStatsEntity::default());
    }

    #[tokio::test]
    async fn score_updates_are_refused_once_finished() {
        let store = MemoryTournamentStore::new();
        let a = team("A", SystemTime::UNIX_EPOCH);
        let b = team("B", SystemTime::UNIX_EPOCH);
        store.create_team(a.clone()).await.unwrap();
        store.create_team(b.clone()).await.unwrap();
        let game = scheduled(&a, &b, SystemTime::UNIX_EPOCH);
        store.create_match(game.clone()).await.unwrap();
        store.finalize_match(commit_for(&game)).await.unwrap();

        let update = MatchScoreUpdate {
            status: MatchStatusEntity::InProgress,
            sets: Vec::new(),
            updated_at: SystemTime::now(),
        };
        let result = store.update_match_score(game.id, update).await;
        assert!(matches!(
            result,
            Err(StorageError::MatchAlreadyFinished { .. })
        ));
    }
}
