use tracing::{info, warn};

use crate::{
    config::Catalog,
    dto::{
        public::{StandingEntry, StandingsGroup},
        team::{CreateTeamRequest, TeamResponse},
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        ranking::rank_teams,
        tournament::Team,
    },
};

/// Every registered team in registration order.
pub async fn list_teams(state: &SharedState) -> Result<Vec<TeamResponse>, ServiceError> {
    Ok(load_teams(state)
        .await?
        .into_iter()
        .map(TeamResponse::from)
        .collect())
}

/// Register a team with zeroed standings.
pub async fn create_team(
    state: &SharedState,
    payload: CreateTeamRequest,
) -> Result<TeamResponse, ServiceError> {
    let catalog = state.config().catalog();
    if !Catalog::allows(&catalog.categories, &payload.category) {
        return Err(ServiceError::InvalidInput(format!(
            "unknown category `{}`",
            payload.category
        )));
    }
    if !Catalog::allows(&catalog.zones, &payload.zone) {
        return Err(ServiceError::InvalidInput(format!(
            "unknown zone `{}`",
            payload.zone
        )));
    }

    let store = state.require_store().await?;
    let team = Team::new(
        payload.name.trim().to_owned(),
        payload.player_one.trim().to_owned(),
        payload.player_two.trim().to_owned(),
        payload.category,
        payload.zone,
    );

    store.create_team(team.clone().into()).await?;
    info!(team_id = %team.id, name = %team.name, "team registered");

    publish_standings(state).await;
    Ok(team.into())
}

/// Teams in ranking order: category, zone, points, games for.
pub async fn ranked_teams(state: &SharedState) -> Result<Vec<TeamResponse>, ServiceError> {
    Ok(rank_teams(load_teams(state).await?)
        .into_iter()
        .map(TeamResponse::from)
        .collect())
}

/// Ranked teams split per (category, zone), each with its position.
pub async fn standings(state: &SharedState) -> Result<Vec<StandingsGroup>, ServiceError> {
    Ok(group_standings(rank_teams(load_teams(state).await?)))
}

/// Broadcast fresh standings, logging when they cannot be loaded.
pub(crate) async fn publish_standings(state: &SharedState) {
    match standings(state).await {
        Ok(groups) => sse_events::broadcast_standings(state, groups),
        Err(err) => warn!(error = %err, "standings not broadcast"),
    }
}

async fn load_teams(state: &SharedState) -> Result<Vec<Team>, ServiceError> {
    let store = state.require_store().await?;
    let teams = store.list_teams().await?;
    Ok(teams.into_iter().map(Team::from).collect())
}

/// Expects `teams` already in ranking order.
fn group_standings(teams: Vec<Team>) -> Vec<StandingsGroup> {
    let mut groups: Vec<StandingsGroup> = Vec::new();

    for team in teams {
        let same_group = groups
            .last()
            .is_some_and(|group| group.category == team.category && group.zone == team.zone);

        if !same_group {
            groups.push(StandingsGroup {
                category: team.category.clone(),
                zone: team.zone.clone(),
                teams: Vec::new(),
            });
        }

        if let Some(group) = groups.last_mut() {
            let position = group.teams.len() as u32 + 1;
            group.teams.push(StandingEntry {
                position,
                team: team.into(),
            });
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::tournament_store::memory::MemoryTournamentStore,
        state::AppState,
    };

    fn request(name: &str, category: &str, zone: &str) -> CreateTeamRequest {
        CreateTeamRequest {
            name: name.into(),
            player_one: "Juan".into(),
            player_two: "Pedro".into(),
            category: category.into(),
            zone: zone.into(),
        }
    }

    async fn connected_state() -> SharedState {
        let state = AppState::new(AppConfig::default());
        state
            .install_store(Arc::new(MemoryTournamentStore::new()))
            .await;
        state
    }

    #[tokio::test]
    async fn registered_team_starts_at_zero() {
        let state = connected_state().await;
        let team = create_team(&state, request("Los Pumas", "5ta Caballeros", "Zona A"))
            .await
            .unwrap();

        assert_eq!(team.stats.matches_played, 0);
        assert_eq!(team.stats.points, 0);
        assert_eq!(list_teams(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let state = connected_state().await;
        let err = create_team(&state, request("Los Pumas", "Primera", "Zona A"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(list_teams(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_catalog_accepts_any_label() {
        let state = AppState::new(AppConfig::with_catalog(Catalog {
            categories: Vec::new(),
            zones: Vec::new(),
            courts: Vec::new(),
            rounds: Vec::new(),
        }));
        state
            .install_store(Arc::new(MemoryTournamentStore::new()))
            .await;

        let team = create_team(&state, request("Los Pumas", "Primera", "Grupo 7"))
            .await
            .unwrap();
        assert_eq!(team.category, "Primera");
    }

    #[tokio::test]
    async fn registration_fails_without_storage() {
        let state = AppState::new(AppConfig::default());
        let err = create_team(&state, request("Los Pumas", "5ta Caballeros", "Zona A"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }

    #[tokio::test]
    async fn registration_broadcasts_standings() {
        let state = connected_state().await;
        let mut receiver = state.public_sse().subscribe();

        create_team(&state, request("Los Pumas", "5ta Caballeros", "Zona A"))
            .await
            .unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("standings.updated"));
    }

    #[tokio::test]
    async fn standings_are_grouped_with_positions() {
        let state = connected_state().await;
        for (name, zone) in [("A1", "Zona A"), ("B1", "Zona B"), ("A2", "Zona A")] {
            create_team(&state, request(name, "5ta Caballeros", zone))
                .await
                .unwrap();
        }

        let groups = standings(&state).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].zone, "Zona A");
        let zone_a: Vec<_> = groups[0]
            .teams
            .iter()
            .map(|entry| (entry.position, entry.team.name.as_str()))
            .collect();
        assert_eq!(zone_a, vec![(1, "A1"), (2, "A2")]);
        assert_eq!(groups[1].teams[0].position, 1);
    }
}
