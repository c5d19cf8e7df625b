//! Standings: per-match outcome computation and ranking order.

use std::{cmp::Ordering, time::SystemTime};

use thiserror::Error;
use uuid::Uuid;

use crate::{
    dao::models::{FinalizeCommit, TeamStatsUpdate},
    state::{
        scoring::SetsWon,
        tournament::{Match, SetScore, Side, Team, TeamStats},
    },
};

/// Points awarded for a match win. Losses award nothing.
pub const POINTS_PER_WIN: u32 = 2;

/// The match cannot be finalized because its played sets do not name a winner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("match {match_id} has no winner yet ({team_a}-{team_b} in sets)")]
pub struct IncompleteMatch {
    pub match_id: Uuid,
    pub team_a: u8,
    pub team_b: u8,
}

/// Result of a decided match and the standings increments it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub match_id: Uuid,
    pub winner: Side,
    pub winner_id: Uuid,
    /// Played sets only.
    pub sets: Vec<SetScore>,
    pub sets_won: SetsWon,
    pub team_a: TeamStatsUpdate,
    pub team_b: TeamStatsUpdate,
}

/// Compute the outcome of `game` from its entered `sets`.
///
/// Unplayed 0-0 pairs are dropped. The winner is the side with more sets; a tie is
/// refused. Every played set counts towards games for and against.
pub fn compute_outcome(game: &Match, sets: &[SetScore]) -> Result<MatchOutcome, IncompleteMatch> {
    let played: Vec<SetScore> = sets.iter().copied().filter(SetScore::is_played).collect();

    let mut sets_won = SetsWon::default();
    for set in &played {
        match set.team_a.cmp(&set.team_b) {
            Ordering::Greater => sets_won.team_a += 1,
            Ordering::Less => sets_won.team_b += 1,
            Ordering::Equal => {}
        }
    }

    let winner = sets_won.leader().ok_or(IncompleteMatch {
        match_id: game.id,
        team_a: sets_won.team_a,
        team_b: sets_won.team_b,
    })?;

    let games = |side: Side| {
        played
            .iter()
            .fold(0u32, |total, set| total.saturating_add(set.games(side)))
    };
    let games_a = games(Side::TeamA);
    let games_b = games(Side::TeamB);

    let delta = |side: Side, games_for: u32, games_against: u32| {
        let won = side == winner;
        TeamStats {
            matches_played: 1,
            matches_won: u32::from(won),
            matches_lost: u32::from(!won),
            games_for,
            games_against,
            points: if won { POINTS_PER_WIN } else { 0 },
        }
    };

    Ok(MatchOutcome {
        match_id: game.id,
        winner,
        winner_id: game.team(winner).id,
        sets: played,
        sets_won,
        team_a: TeamStatsUpdate {
            team_id: game.team_a.id,
            delta: delta(Side::TeamA, games_a, games_b),
        },
        team_b: TeamStatsUpdate {
            team_id: game.team_b.id,
            delta: delta(Side::TeamB, games_b, games_a),
        },
    })
}

impl MatchOutcome {
    /// Turn the outcome into the unit of writes a store commits on finalization.
    pub fn into_commit(self, finished_at: SystemTime) -> FinalizeCommit {
        FinalizeCommit {
            match_id: self.match_id,
            sets: self.sets.into_iter().map(Into::into).collect(),
            winner_id: self.winner_id,
            finished_at,
            teams: [self.team_a, self.team_b],
        }
    }
}

/// Ranking order: category, zone, points (desc), games for (desc).
pub fn compare_standings(a: &Team, b: &Team) -> Ordering {
    a.category
        .cmp(&b.category)
        .then_with(|| a.zone.cmp(&b.zone))
        .then_with(|| b.stats.points.cmp(&a.stats.points))
        .then_with(|| b.stats.games_for.cmp(&a.stats.games_for))
}

/// Sort teams into ranking order. Ties keep their incoming order.
pub fn rank_teams(mut teams: Vec<Team>) -> Vec<Team> {
    teams.sort_by(compare_standings);
    teams
}
