use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{matches::MatchResponse, team::TeamResponse};

/// Live scoreboard: every scheduled or in-progress match, earliest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreboardResponse {
    pub matches: Vec<MatchResponse>,
    pub degraded: bool,
}

/// Standings table of one zone inside a category.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct StandingsGroup {
    pub category: String,
    pub zone: String,
    pub teams: Vec<StandingEntry>,
}

/// Team with its 1-based position inside its group.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct StandingEntry {
    pub position: u32,
    #[serde(flatten)]
    pub team: TeamResponse,
}

/// Full standings, groups ordered by category then zone.
#[derive(Debug, Serialize, ToSchema)]
pub struct StandingsResponse {
    pub groups: Vec<StandingsGroup>,
}
