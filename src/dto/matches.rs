use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dto::{
        format_system_time,
        validation::{validate_not_blank, validate_rfc3339},
    },
    state::{
        match_lifecycle::MatchStatus,
        scoring::{MAX_SETS, MatchProgress},
        tournament::{Match, MatchTeam, SetScore, Side},
    },
};

/// Upper bound on the games one team may be credited with in a single set.
const MAX_GAMES_PER_SET: u32 = 99;

/// Lifecycle state of a match as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatusDto {
    Scheduled,
    InProgress,
    Finished,
}

/// Payload used to schedule a match between two registered teams.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMatchRequest {
    pub team_a_id: Uuid,
    pub team_b_id: Uuid,
    pub court: String,
    /// Scheduled start, RFC 3339 (`2025-03-14T18:30:00-03:00`).
    pub starts_at: String,
    pub round: String,
    /// Zone or stage label, free text.
    pub zone: String,
}

impl Validate for CreateMatchRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.team_a_id == self.team_b_id {
            let mut err = ValidationError::new("same_team");
            err.message = Some("a match needs two different teams".into());
            errors.add("team_b_id", err);
        }

        for (field, value) in [
            ("court", &self.court),
            ("round", &self.round),
            ("zone", &self.zone),
        ] {
            if let Err(e) = validate_not_blank(value) {
                errors.add(field, e);
            }
        }

        if let Err(e) = validate_rfc3339(&self.starts_at) {
            errors.add("starts_at", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial score entered while a match is being played.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSetsRequest {
    /// Requested state: `scheduled` or `in_progress`. Use the finalize route to finish.
    pub status: MatchStatusDto,
    /// Up to three `[team_a_games, team_b_games]` pairs; `[0, 0]` marks an unplayed set.
    #[schema(value_type = Vec<Vec<u32>>, example = json!([[6, 4], [3, 6], [0, 0]]))]
    pub sets: Vec<[u32; 2]>,
}

impl Validate for UpdateSetsRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) =
            validate_set_count(&self.sets).and_then(|()| validate_game_counts(&self.sets))
        {
            errors.add("sets", e);
        }
        if self.status == MatchStatusDto::Finished {
            let mut err = ValidationError::new("finished");
            err.message = Some("matches are finished through the finalize route".into());
            errors.add("status", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Sets to check or commit. When omitted, the sets stored on the match are used.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SetsRequest {
    #[serde(default)]
    #[schema(value_type = Option<Vec<Vec<u32>>>, example = json!([[7, 6], [4, 6], [6, 3]]))]
    pub sets: Option<Vec<[u32; 2]>>,
}

impl Validate for SetsRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(sets) = &self.sets {
            if let Err(e) = validate_set_count(sets).and_then(|()| validate_game_counts(sets)) {
                errors.add("sets", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_set_count(sets: &[[u32; 2]]) -> Result<(), ValidationError> {
    if sets.len() > MAX_SETS {
        let mut err = ValidationError::new("too_many_sets");
        err.message = Some(
            format!(
                "a best-of-3 match has at most {MAX_SETS} sets, got {}",
                sets.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

fn validate_game_counts(sets: &[[u32; 2]]) -> Result<(), ValidationError> {
    if let Some(position) = sets
        .iter()
        .position(|pair| pair.iter().any(|games| *games > MAX_GAMES_PER_SET))
    {
        let mut err = ValidationError::new("games_out_of_range");
        err.message = Some(
            format!(
                "set {} has more than {MAX_GAMES_PER_SET} games for one team",
                position + 1
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Team reference embedded in a match.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct MatchTeamDto {
    pub id: Uuid,
    pub name: String,
}

/// Match as exposed to REST and SSE clients.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct MatchResponse {
    pub id: Uuid,
    pub team_a: MatchTeamDto,
    pub team_b: MatchTeamDto,
    pub court: String,
    pub starts_at: String,
    pub round: String,
    pub zone: String,
    pub status: MatchStatusDto,
    /// Played sets only, as `[team_a_games, team_b_games]`.
    #[schema(value_type = Vec<Vec<u32>>)]
    pub sets: Vec<[u32; 2]>,
    pub winner_id: Option<Uuid>,
    pub finished_at: Option<String>,
}

/// Outcome of a dry-run validation of set scores.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetsValidationResponse {
    /// `not_started`, `in_progress` or `ready_to_finalize`.
    pub outcome: SetsOutcomeDto,
    /// Sets that count for the match.
    #[schema(value_type = Vec<Vec<u32>>)]
    pub sets: Vec<[u32; 2]>,
    pub sets_won_a: u8,
    pub sets_won_b: u8,
    /// Present when the match is ready to finalize.
    pub winner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SetsOutcomeDto {
    NotStarted,
    InProgress,
    ReadyToFinalize,
}

/// Result of a committed finalization.
#[derive(Debug, Serialize, ToSchema)]
pub struct FinalizeMatchResponse {
    pub winner_id: Uuid,
    #[serde(rename = "match")]
    pub finished: MatchResponse,
}

impl From<MatchStatus> for MatchStatusDto {
    fn from(status: MatchStatus) -> Self {
        match status {
            MatchStatus::Scheduled => MatchStatusDto::Scheduled,
            MatchStatus::InProgress => MatchStatusDto::InProgress,
            MatchStatus::Finished => MatchStatusDto::Finished,
        }
    }
}

impl From<MatchStatusDto> for MatchStatus {
    fn from(status: MatchStatusDto) -> Self {
        match status {
            MatchStatusDto::Scheduled => MatchStatus::Scheduled,
            MatchStatusDto::InProgress => MatchStatus::InProgress,
            MatchStatusDto::Finished => MatchStatus::Finished,
        }
    }
}

impl From<MatchTeam> for MatchTeamDto {
    fn from(team: MatchTeam) -> Self {
        Self {
            id: team.id,
            name: team.name,
        }
    }
}

impl From<Match> for MatchResponse {
    fn from(game: Match) -> Self {
        Self {
            id: game.id,
            team_a: game.team_a.into(),
            team_b: game.team_b.into(),
            court: game.court,
            starts_at: format_system_time(game.starts_at),
            round: game.round,
            zone: game.zone,
            status: game.status.into(),
            sets: sets_to_pairs(&game.sets),
            winner_id: game.winner_id,
            finished_at: game.finished_at.map(format_system_time),
        }
    }
}

impl SetsValidationResponse {
    /// Render a classification for `game`.
    pub fn from_progress(game: &Match, progress: &MatchProgress) -> Self {
        let sets_won = progress.sets_won();
        let (outcome, winner) = match progress {
            MatchProgress::NotStarted => (SetsOutcomeDto::NotStarted, None),
            MatchProgress::InProgress { .. } => (SetsOutcomeDto::InProgress, None),
            MatchProgress::ReadyToFinalize { winner, .. } => {
                (SetsOutcomeDto::ReadyToFinalize, Some(*winner))
            }
        };

        Self {
            outcome,
            sets: sets_to_pairs(progress.sets()),
            sets_won_a: sets_won.team_a,
            sets_won_b: sets_won.team_b,
            winner_id: winner.map(|side: Side| game.team(side).id),
        }
    }
}

pub fn pairs_to_sets(pairs: &[[u32; 2]]) -> Vec<SetScore> {
    pairs
        .iter()
        .map(|[team_a, team_b]| SetScore::new(*team_a, *team_b))
        .collect()
}

pub fn sets_to_pairs(sets: &[SetScore]) -> Vec<[u32; 2]> {
    sets.iter().map(|set| [set.team_a, set.team_b]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateMatchRequest {
        CreateMatchRequest {
            team_a_id: Uuid::new_v4(),
            team_b_id: Uuid::new_v4(),
            court: "Cancha 1".into(),
            starts_at: "2025-03-14T18:30:00-03:00".into(),
            round: "Jornada 1".into(),
            zone: "Zona A".into(),
        }
    }

    #[test]
    fn match_against_itself_is_rejected() {
        let mut input = create_request();
        input.team_b_id = input.team_a_id;
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("team_b_id"));
    }

    #[test]
    fn start_time_must_be_rfc3339() {
        let mut input = create_request();
        assert!(input.validate().is_ok());
        input.starts_at = "14/03/2025 18:30".into();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("starts_at"));
    }

    #[test]
    fn score_updates_cannot_finish_a_match() {
        let input = UpdateSetsRequest {
            status: MatchStatusDto::Finished,
            sets: vec![[6, 1], [6, 2]],
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("status"));
    }

    #[test]
    fn at_most_three_pairs_are_accepted() {
        let input = SetsRequest {
            sets: Some(vec![[6, 1], [1, 6], [0, 0], [6, 0]]),
        };
        assert!(input.validate().is_err());
        assert!(SetsRequest::default().validate().is_ok());
    }

    #[test]
    fn absurd_game_counts_are_rejected() {
        let input = UpdateSetsRequest {
            status: MatchStatusDto::InProgress,
            sets: vec![[6, 2], [6, u32::MAX]],
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("sets"));

        let input = SetsRequest {
            sets: Some(vec![[100, 98]]),
        };
        assert!(input.validate().is_err());

        let input = SetsRequest {
            sets: Some(vec![[10, 8], [6, 4]]),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        let status: MatchStatusDto = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, MatchStatusDto::InProgress);
        assert_eq!(
            serde_json::to_string(&MatchStatusDto::Finished).unwrap(),
            "\"finished\""
        );
    }
}
