//! Best-of-3 set validation: classifies the set scores entered for a match.

use thiserror::Error;

use crate::state::{
    match_lifecycle::MatchStatus,
    tournament::{SetScore, Side},
};

/// Maximum number of sets in a best-of-3 match.
pub const MAX_SETS: usize = 3;
/// Sets a team must win to take the match.
pub const SETS_TO_WIN_MATCH: u8 = 2;

/// Sets won so far by each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetsWon {
    /// Sets taken by side A.
    pub team_a: u8,
    /// Sets taken by side B.
    pub team_b: u8,
}

impl SetsWon {
    fn record(&mut self, side: Side) {
        match side {
            Side::TeamA => self.team_a += 1,
            Side::TeamB => self.team_b += 1,
        }
    }

    /// Side holding more sets, `None` on a tie.
    pub fn leader(&self) -> Option<Side> {
        match self.team_a.cmp(&self.team_b) {
            std::cmp::Ordering::Greater => Some(Side::TeamA),
            std::cmp::Ordering::Less => Some(Side::TeamB),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Side that reached the sets needed to take the match, if any.
    pub fn match_winner(&self) -> Option<Side> {
        if self.team_a >= SETS_TO_WIN_MATCH {
            Some(Side::TeamA)
        } else if self.team_b >= SETS_TO_WIN_MATCH {
            Some(Side::TeamB)
        } else {
            None
        }
    }
}

/// Classification of a valid set sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchProgress {
    /// No games entered on a scheduled match.
    NotStarted,
    /// Sets recorded so far, no team has won the match yet.
    InProgress { sets: Vec<SetScore>, sets_won: SetsWon },
    /// A team won two sets; `sets` holds exactly the sets that were played.
    ReadyToFinalize {
        sets: Vec<SetScore>,
        sets_won: SetsWon,
        winner: Side,
    },
}

impl MatchProgress {
    /// Played sets carried by the classification (empty when not started).
    pub fn sets(&self) -> &[SetScore] {
        match self {
            MatchProgress::NotStarted => &[],
            MatchProgress::InProgress { sets, .. } | MatchProgress::ReadyToFinalize { sets, .. } => {
                sets
            }
        }
    }

    /// Set counts carried by the classification.
    pub fn sets_won(&self) -> SetsWon {
        match self {
            MatchProgress::NotStarted => SetsWon::default(),
            MatchProgress::InProgress { sets_won, .. }
            | MatchProgress::ReadyToFinalize { sets_won, .. } => *sets_won,
        }
    }
}

/// Reasons a set sequence is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSetScore {
    /// More pairs than a best-of-3 match can hold.
    #[error("a best-of-3 match has at most {max} sets, got {count}")]
    TooManySets { count: usize, max: usize },
    /// A played set without a winner. `set` is 1-based.
    #[error(
        "set {set} score {team_a}-{team_b} is invalid: a set is won with 6+ games and a 2-game margin, or 7-6"
    )]
    MalformedSet { set: usize, team_a: u32, team_b: u32 },
    /// Three played sets with no side on two wins; only reachable with corrupted input.
    #[error("{played} played sets leave the match tied at {team_a}-{team_b} sets")]
    TiedSetCount { played: usize, team_a: u8, team_b: u8 },
}

/// Classify the sets entered for a match in `status`.
///
/// 0-0 pairs are skipped as unplayed. Every played set must have a winner; the first one
/// that does not makes the whole sequence invalid. Once a side has won two sets the match
/// is decided and anything entered afterwards is ignored.
pub fn classify(sets: &[SetScore], status: MatchStatus) -> Result<MatchProgress, InvalidSetScore> {
    if sets.len() > MAX_SETS {
        return Err(InvalidSetScore::TooManySets {
            count: sets.len(),
            max: MAX_SETS,
        });
    }

    let mut played = Vec::with_capacity(MAX_SETS);
    let mut sets_won = SetsWon::default();

    for (index, set) in sets.iter().enumerate() {
        if !set.is_played() {
            continue;
        }

        let winner = set.winner().ok_or(InvalidSetScore::MalformedSet {
            set: index + 1,
            team_a: set.team_a,
            team_b: set.team_b,
        })?;

        played.push(*set);
        sets_won.record(winner);

        if sets_won.match_winner().is_some() {
            break;
        }
    }

    if let Some(winner) = sets_won.match_winner() {
        return Ok(MatchProgress::ReadyToFinalize {
            sets: played,
            sets_won,
            winner,
        });
    }

    if played.len() >= MAX_SETS {
        return Err(InvalidSetScore::TiedSetCount {
            played: played.len(),
            team_a: sets_won.team_a,
            team_b: sets_won.team_b,
        });
    }

    if played.is_empty() && status == MatchStatus::Scheduled {
        return Ok(MatchProgress::NotStarted);
    }

    Ok(MatchProgress::InProgress {
        sets: played,
        sets_won,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(pairs: &[(u32, u32)]) -> Vec<SetScore> {
        pairs.iter().map(|&(a, b)| SetScore::new(a, b)).collect()
    }

    #[test]
    fn single_set_is_in_progress() {
        let progress = classify(&sets(&[(6, 2)]), MatchStatus::InProgress).unwrap();
        assert_eq!(
            progress,
            MatchProgress::InProgress {
                sets: sets(&[(6, 2)]),
                sets_won: SetsWon {
                    team_a: 1,
                    team_b: 0
                },
            }
        );
    }

    #[test]
    fn straight_sets_are_ready_to_finalize() {
        let progress = classify(&sets(&[(6, 2), (6, 3)]), MatchStatus::InProgress).unwrap();
        assert_eq!(
            progress,
            MatchProgress::ReadyToFinalize {
                sets: sets(&[(6, 2), (6, 3)]),
                sets_won: SetsWon {
                    team_a: 2,
                    team_b: 0
                },
                winner: Side::TeamA,
            }
        );
    }

    #[test]
    fn three_set_match_returns_every_set() {
        let input = sets(&[(7, 6), (4, 6), (6, 3)]);
        let progress = classify(&input, MatchStatus::InProgress).unwrap();
        match progress {
            MatchProgress::ReadyToFinalize {
                sets: played,
                sets_won,
                winner,
            } => {
                assert_eq!(played, input);
                assert_eq!(
                    sets_won,
                    SetsWon {
                        team_a: 2,
                        team_b: 1
                    }
                );
                assert_eq!(winner, Side::TeamA);
            }
            other => panic!("expected ready to finalize, got {other:?}"),
        }
    }

    #[test]
    fn team_b_can_win_the_match() {
        let progress = classify(&sets(&[(2, 6), (6, 7)]), MatchStatus::InProgress).unwrap();
        assert!(matches!(
            progress,
            MatchProgress::ReadyToFinalize {
                winner: Side::TeamB,
                ..
            }
        ));
    }

    #[test]
    fn undecided_set_is_invalid() {
        let err = classify(&sets(&[(6, 2), (5, 5)]), MatchStatus::InProgress).unwrap_err();
        assert_eq!(
            err,
            InvalidSetScore::MalformedSet {
                set: 2,
                team_a: 5,
                team_b: 5
            }
        );
    }

    #[test]
    fn validation_stops_at_first_invalid_set() {
        let err = classify(&sets(&[(4, 4), (6, 5)]), MatchStatus::InProgress).unwrap_err();
        assert!(matches!(err, InvalidSetScore::MalformedSet { set: 1, .. }));
    }

    #[test]
    fn split_sets_with_padding_stay_in_progress() {
        let progress = classify(&sets(&[(6, 2), (2, 6), (0, 0)]), MatchStatus::InProgress).unwrap();
        assert_eq!(
            progress,
            MatchProgress::InProgress {
                sets: sets(&[(6, 2), (2, 6)]),
                sets_won: SetsWon {
                    team_a: 1,
                    team_b: 1
                },
            }
        );
    }

    #[test]
    fn split_sets_are_never_finalizable() {
        let progress = classify(&sets(&[(6, 2), (2, 6)]), MatchStatus::InProgress).unwrap();
        assert!(matches!(progress, MatchProgress::InProgress { .. }));
    }

    #[test]
    fn empty_scheduled_match_is_not_started() {
        assert_eq!(
            classify(&[], MatchStatus::Scheduled).unwrap(),
            MatchProgress::NotStarted
        );
        assert_eq!(
            classify(&sets(&[(0, 0), (0, 0), (0, 0)]), MatchStatus::Scheduled).unwrap(),
            MatchProgress::NotStarted
        );
    }

    #[test]
    fn empty_live_match_stays_in_progress() {
        let progress = classify(&sets(&[(0, 0)]), MatchStatus::InProgress).unwrap();
        assert_eq!(
            progress,
            MatchProgress::InProgress {
                sets: Vec::new(),
                sets_won: SetsWon::default(),
            }
        );
    }

    #[test]
    fn unplayed_sets_in_the_middle_are_skipped() {
        let progress = classify(&sets(&[(6, 1), (0, 0), (6, 4)]), MatchStatus::InProgress).unwrap();
        assert_eq!(progress.sets(), sets(&[(6, 1), (6, 4)]).as_slice());
    }

    #[test]
    fn sets_after_the_decision_are_ignored() {
        let progress = classify(&sets(&[(6, 2), (6, 3), (5, 5)]), MatchStatus::InProgress).unwrap();
        assert_eq!(progress.sets(), sets(&[(6, 2), (6, 3)]).as_slice());
        assert_eq!(
            progress.sets_won(),
            SetsWon {
                team_a: 2,
                team_b: 0
            }
        );
    }

    #[test]
    fn more_than_three_sets_are_rejected() {
        let err = classify(
            &sets(&[(6, 2), (2, 6), (0, 0), (6, 1)]),
            MatchStatus::InProgress,
        )
        .unwrap_err();
        assert_eq!(err, InvalidSetScore::TooManySets { count: 4, max: 3 });
    }

    #[test]
    fn extreme_game_counts_are_classified_without_overflow() {
        let progress = classify(&sets(&[(6, u32::MAX)]), MatchStatus::InProgress).unwrap();
        assert_eq!(
            progress.sets_won(),
            SetsWon {
                team_a: 0,
                team_b: 1
            }
        );

        let err = classify(&sets(&[(u32::MAX - 1, u32::MAX)]), MatchStatus::InProgress)
            .unwrap_err();
        assert!(matches!(err, InvalidSetScore::MalformedSet { set: 1, .. }));
    }

    #[test]
    fn classification_is_repeatable() {
        let input = sets(&[(7, 5), (3, 6)]);
        let first = classify(&input, MatchStatus::InProgress);
        let second = classify(&input, MatchStatus::InProgress);
        assert_eq!(first, second);
        assert_eq!(input, sets(&[(7, 5), (3, 6)]));
    }

    #[test]
    fn every_best_of_three_sequence_gets_exactly_one_outcome() {
        let scores = [(0, 0), (6, 2), (2, 6), (7, 6), (6, 7), (5, 5)];
        for first in scores {
            for second in scores {
                for third in scores {
                    let input = sets(&[first, second, third]);
                    let outcome = classify(&input, MatchStatus::Scheduled);
                    match outcome {
                        Ok(MatchProgress::NotStarted) => {
                            assert!(input.iter().all(|set| !set.is_played()))
                        }
                        Ok(MatchProgress::InProgress { sets_won, .. }) => {
                            assert!(sets_won.match_winner().is_none())
                        }
                        Ok(MatchProgress::ReadyToFinalize {
                            sets_won, winner, ..
                        }) => assert_eq!(sets_won.match_winner(), Some(winner)),
                        Err(InvalidSetScore::MalformedSet { .. }) => {}
                        Err(other) => panic!("unexpected error for {input:?}: {other:?}"),
                    }
                }
            }
        }
    }
}
