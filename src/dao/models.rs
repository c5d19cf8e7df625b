use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Representation of a registered team stored in persistence and shared across layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team.
    pub name: String,
    /// First player of the pair.
    pub player_one: String,
    /// Second player of the pair.
    pub player_two: String,
    /// Tournament category the team plays in (e.g. "5ta Caballeros").
    pub category: String,
    /// Group/zone inside the category (e.g. "Zona A").
    pub zone: String,
    /// Cumulative standings counters, only mutated by match finalization.
    pub stats: TeamStatsEntity,
    /// Registration timestamp, also used as the stable tie-break order.
    pub created_at: SystemTime,
    /// Last time the team record was updated.
    pub updated_at: SystemTime,
}

/// Cumulative standings counters of a team.
///
/// The same shape is used for the per-match increments applied on finalization.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamStatsEntity {
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_lost: u32,
    pub games_for: u32,
    pub games_against: u32,
    pub points: u32,
}

impl TeamStatsEntity {
    /// Add every counter of `delta` to the current totals, saturating at `u32::MAX`.
    pub fn accumulate(&mut self, delta: &TeamStatsEntity) {
        self.matches_played = self.matches_played.saturating_add(delta.matches_played);
        self.matches_won = self.matches_won.saturating_add(delta.matches_won);
        self.matches_lost = self.matches_lost.saturating_add(delta.matches_lost);
        self.games_for = self.games_for.saturating_add(delta.games_for);
        self.games_against = self.games_against.saturating_add(delta.games_against);
        self.points = self.points.saturating_add(delta.points);
    }
}

/// Team reference embedded in a match, with the display name captured at scheduling time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchTeamEntity {
    pub id: Uuid,
    pub name: String,
}

/// Lifecycle state persisted with a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatusEntity {
    Scheduled,
    InProgress,
    Finished,
}

impl MatchStatusEntity {
    /// Value stored in the `status` field of match documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatusEntity::Scheduled => "scheduled",
            MatchStatusEntity::InProgress => "in_progress",
            MatchStatusEntity::Finished => "finished",
        }
    }

    /// Scheduled and in-progress matches are shown on the live scoreboard.
    pub fn is_active(&self) -> bool {
        !matches!(self, MatchStatusEntity::Finished)
    }
}

/// Games won by each side in a single set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetScoreEntity {
    pub team_a: u32,
    pub team_b: u32,
}

/// Aggregate match entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Primary key of the match.
    pub id: Uuid,
    /// First team ("A" side of every set score).
    pub team_a: MatchTeamEntity,
    /// Second team ("B" side of every set score).
    pub team_b: MatchTeamEntity,
    /// Court the match is played on.
    pub court: String,
    /// Scheduled start time.
    pub starts_at: SystemTime,
    /// Round label (e.g. "Jornada 1", "Semifinal").
    pub round: String,
    /// Zone or stage label.
    pub zone: String,
    /// Current lifecycle state.
    pub status: MatchStatusEntity,
    /// Played sets only, in order.
    pub sets: Vec<SetScoreEntity>,
    /// Winning team, present once the match is finished.
    pub winner_id: Option<Uuid>,
    /// Finalization timestamp, present once the match is finished.
    pub finished_at: Option<SystemTime>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the match entity was updated.
    pub updated_at: SystemTime,
}

/// Partial update written while a match is being played. Never touches team standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchScoreUpdate {
    pub status: MatchStatusEntity,
    pub sets: Vec<SetScoreEntity>,
    pub updated_at: SystemTime,
}

/// Increment applied to one team's standings when a match is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamStatsUpdate {
    pub team_id: Uuid,
    pub delta: TeamStatsEntity,
}

/// Everything a store must write, as one unit, to finalize a match.
///
/// The match must move to `Finished` only if it is not finished yet, and both team
/// increments must be applied together with that transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeCommit {
    pub match_id: Uuid,
    pub sets: Vec<SetScoreEntity>,
    pub winner_id: Uuid,
    pub finished_at: SystemTime,
    /// Team A's update first, then team B's.
    pub teams: [TeamStatsUpdate; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_adds_every_counter() {
        let mut stats = TeamStatsEntity {
            matches_played: 1,
            matches_won: 1,
            games_for: 12,
            games_against: 4,
            points: 2,
            ..TeamStatsEntity::default()
        };
        stats.accumulate(&TeamStatsEntity {
            matches_played: 1,
            matches_lost: 1,
            games_for: 5,
            games_against: 12,
            ..TeamStatsEntity::default()
        });

        assert_eq!(stats.matches_played, 2);
        assert_eq!(stats.matches_played, stats.matches_won + stats.matches_lost);
        assert_eq!((stats.games_for, stats.games_against), (17, 16));
        assert_eq!(stats.points, 2);
    }

    #[test]
    fn accumulate_saturates_at_the_counter_limit() {
        let mut stats = TeamStatsEntity {
            games_for: u32::MAX - 3,
            ..TeamStatsEntity::default()
        };
        stats.accumulate(&TeamStatsEntity {
            games_for: 10,
            ..TeamStatsEntity::default()
        });
        assert_eq!(stats.games_for, u32::MAX);
    }
}
