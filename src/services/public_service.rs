use crate::{
    config::Catalog,
    dto::public::{ScoreboardResponse, StandingsResponse},
    error::ServiceError,
    services::{match_service, team_service},
    state::SharedState,
};

/// Active matches for the public board.
pub async fn scoreboard(state: &SharedState) -> Result<ScoreboardResponse, ServiceError> {
    let matches = match_service::list_active_matches(state).await?;
    Ok(ScoreboardResponse {
        matches,
        degraded: state.is_degraded(),
    })
}

/// Standings grouped per category and zone.
pub async fn standings(state: &SharedState) -> Result<StandingsResponse, ServiceError> {
    let groups = team_service::standings(state).await?;
    Ok(StandingsResponse { groups })
}

/// Configured labels; available even without storage.
pub fn catalog(state: &SharedState) -> Catalog {
    state.config().catalog().clone()
}
