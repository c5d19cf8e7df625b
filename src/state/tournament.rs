use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    dao::models::{MatchEntity, MatchTeamEntity, SetScoreEntity, TeamEntity, TeamStatsEntity},
    state::match_lifecycle::MatchStatus,
};

/// Games a side needs to take a set outright (with a two-game margin).
pub const GAMES_TO_WIN_SET: u32 = 6;
/// Game count reached by the winner of a tie-break set (7-6).
pub const TIE_BREAK_GAMES: u32 = 7;

/// One of the two sides of a match. Side A is always the first team of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The first team named when the match was scheduled.
    TeamA,
    /// The second team.
    TeamB,
}

/// Games won by each side in one set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetScore {
    /// Games won by side A.
    pub team_a: u32,
    /// Games won by side B.
    pub team_b: u32,
}

impl SetScore {
    /// Score with `team_a` games for side A and `team_b` games for side B.
    pub const fn new(team_a: u32, team_b: u32) -> Self {
        Self { team_a, team_b }
    }

    /// A 0-0 pair is padding for a set that has not been played yet.
    pub fn is_played(&self) -> bool {
        self.team_a != 0 || self.team_b != 0
    }

    /// Games won by `side` in this set.
    pub fn games(&self, side: Side) -> u32 {
        match side {
            Side::TeamA => self.team_a,
            Side::TeamB => self.team_b,
        }
    }

    /// Winner of the set under padel rules, `None` when the score is not a finished set.
    pub fn winner(&self) -> Option<Side> {
        if wins_set(self.team_a, self.team_b) {
            Some(Side::TeamA)
        } else if wins_set(self.team_b, self.team_a) {
            Some(Side::TeamB)
        } else {
            None
        }
    }
}

/// Six games with a two-game margin, or 7-6 after a tie-break.
fn wins_set(own: u32, other: u32) -> bool {
    (own >= GAMES_TO_WIN_SET && own.checked_sub(other).is_some_and(|margin| margin >= 2))
        || (own == TIE_BREAK_GAMES && other == TIE_BREAK_GAMES - 1)
}

/// Standings counters of a team.
pub type TeamStats = TeamStatsEntity;

/// Registered team with its cumulative standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub player_one: String,
    pub player_two: String,
    pub category: String,
    pub zone: String,
    pub stats: TeamStats,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl Team {
    /// Register a new team with every counter at zero.
    pub fn new(
        name: String,
        player_one: String,
        player_two: String,
        category: String,
        zone: String,
    ) -> Self {
        let now = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            name,
            player_one,
            player_two,
            category,
            zone,
            stats: TeamStats::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Team reference held by a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTeam {
    pub id: Uuid,
    pub name: String,
}

/// Scheduled, live or finished match between two teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: Uuid,
    pub team_a: MatchTeam,
    pub team_b: MatchTeam,
    pub court: String,
    pub starts_at: SystemTime,
    pub round: String,
    pub zone: String,
    pub status: MatchStatus,
    /// Played sets only.
    pub sets: Vec<SetScore>,
    pub winner_id: Option<Uuid>,
    pub finished_at: Option<SystemTime>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl Match {
    /// Schedule a new match. Callers guarantee the two teams are distinct.
    pub fn schedule(
        team_a: MatchTeam,
        team_b: MatchTeam,
        court: String,
        starts_at: SystemTime,
        round: String,
        zone: String,
    ) -> Self {
        let now = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            team_a,
            team_b,
            court,
            starts_at,
            round,
            zone,
            status: MatchStatus::Scheduled,
            sets: Vec::new(),
            winner_id: None,
            finished_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Team playing on `side`.
    pub fn team(&self, side: Side) -> &MatchTeam {
        match side {
            Side::TeamA => &self.team_a,
            Side::TeamB => &self.team_b,
        }
    }
}

impl From<SetScoreEntity> for SetScore {
    fn from(value: SetScoreEntity) -> Self {
        Self {
            team_a: value.team_a,
            team_b: value.team_b,
        }
    }
}

impl From<SetScore> for SetScoreEntity {
    fn from(value: SetScore) -> Self {
        Self {
            team_a: value.team_a,
            team_b: value.team_b,
        }
    }
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            player_one: value.player_one,
            player_two: value.player_two,
            category: value.category,
            zone: value.zone,
            stats: value.stats,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<Team> for TeamEntity {
    fn from(value: Team) -> Self {
        Self {
            id: value.id,
            name: value.name,
            player_one: value.player_one,
            player_two: value.player_two,
            category: value.category,
            zone: value.zone,
            stats: value.stats,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<MatchTeamEntity> for MatchTeam {
    fn from(value: MatchTeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<MatchTeam> for MatchTeamEntity {
    fn from(value: MatchTeam) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<MatchEntity> for Match {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id,
            team_a: value.team_a.into(),
            team_b: value.team_b.into(),
            court: value.court,
            starts_at: value.starts_at,
            round: value.round,
            zone: value.zone,
            status: value.status.into(),
            sets: value.sets.into_iter().map(Into::into).collect(),
            winner_id: value.winner_id,
            finished_at: value.finished_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<Match> for MatchEntity {
    fn from(value: Match) -> Self {
        Self {
            id: value.id,
            team_a: value.team_a.into(),
            team_b: value.team_b.into(),
            court: value.court,
            starts_at: value.starts_at,
            round: value.round,
            zone: value.zone,
            status: value.status.into(),
            sets: value.sets.into_iter().map(Into::into).collect(),
            winner_id: value.winner_id,
            finished_at: value.finished_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
