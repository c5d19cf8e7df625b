use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{format_system_time, validation::validate_not_blank},
    state::tournament::{Team, TeamStats},
};

/// Payload used to register a team.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    /// Display name of the team.
    pub name: String,
    pub player_one: String,
    pub player_two: String,
    /// Must be one of the configured categories when the catalog lists any.
    pub category: String,
    /// Must be one of the configured zones when the catalog lists any.
    pub zone: String,
}

impl Validate for CreateTeamRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (field, value) in [
            ("name", &self.name),
            ("player_one", &self.player_one),
            ("player_two", &self.player_two),
            ("category", &self.category),
            ("zone", &self.zone),
        ] {
            if let Err(e) = validate_not_blank(value) {
                errors.add(field, e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Cumulative standings of a team.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TeamStatsDto {
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_lost: u32,
    pub games_for: u32,
    pub games_against: u32,
    /// Game difference (`games_for - games_against`).
    pub games_diff: i64,
    pub points: u32,
}

/// Team as exposed to REST and SSE clients.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub player_one: String,
    pub player_two: String,
    pub category: String,
    pub zone: String,
    pub stats: TeamStatsDto,
    pub created_at: String,
}

impl From<TeamStats> for TeamStatsDto {
    fn from(stats: TeamStats) -> Self {
        Self {
            matches_played: stats.matches_played,
            matches_won: stats.matches_won,
            matches_lost: stats.matches_lost,
            games_for: stats.games_for,
            games_against: stats.games_against,
            games_diff: i64::from(stats.games_for) - i64::from(stats.games_against),
            points: stats.points,
        }
    }
}

impl From<Team> for TeamResponse {
    fn from(team: Team) -> Self {
        Self {
            id: team.id,
            name: team.name,
            player_one: team.player_one,
            player_two: team.player_two,
            category: team.category,
            zone: team.zone,
            stats: team.stats.into(),
            created_at: format_system_time(team.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateTeamRequest {
        CreateTeamRequest {
            name: "Los Pumas".into(),
            player_one: "Juan".into(),
            player_two: "Pedro".into(),
            category: "5ta Caballeros".into(),
            zone: "Zona A".into(),
        }
    }

    #[test]
    fn complete_request_is_valid() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn every_blank_field_is_reported() {
        let mut input = request();
        input.name = " ".into();
        input.player_two = String::new();

        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("player_two"));
        assert!(!fields.contains_key("player_one"));
    }

    #[test]
    fn games_diff_can_be_negative() {
        let stats = TeamStats {
            games_for: 7,
            games_against: 12,
            ..TeamStats::default()
        };
        assert_eq!(TeamStatsDto::from(stats).games_diff, -5);
    }
}
