use thiserror::Error;
use uuid::Uuid;

use crate::dao::models::MatchStatusEntity;

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Registered with a court and start time, no games recorded yet.
    Scheduled,
    /// Under way; the scoreboard shows the sets recorded so far.
    InProgress,
    /// Result committed and standings updated. Terminal.
    Finished,
}

/// Events that move a match through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    /// The match is marked as under way without any games recorded.
    Start,
    /// A partial score was entered.
    RecordScore,
    /// The result was validated with a decided winner and committed.
    Finalize {
        /// Team that won the match.
        winner_id: Uuid,
    },
}

/// Error returned when an event cannot be applied from the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid match transition: {event:?} cannot be applied while {from:?}")]
pub struct InvalidTransition {
    /// State the match was in.
    pub from: MatchStatus,
    /// Rejected event.
    pub event: MatchEvent,
}

impl MatchStatus {
    /// Whether the match still belongs on the live scoreboard.
    pub fn is_active(self) -> bool {
        !matches!(self, MatchStatus::Finished)
    }

    /// Compute the state reached by applying `event`, following the transition table:
    ///
    /// | from        | event       | to          |
    /// |-------------|-------------|-------------|
    /// | Scheduled   | Start       | InProgress  |
    /// | Scheduled   | RecordScore | InProgress  |
    /// | InProgress  | RecordScore | InProgress  |
    /// | Scheduled   | Finalize    | Finished    |
    /// | InProgress  | Finalize    | Finished    |
    pub fn transition(self, event: MatchEvent) -> Result<MatchStatus, InvalidTransition> {
        let next = match (self, event) {
            (MatchStatus::Scheduled, MatchEvent::Start)
            | (MatchStatus::Scheduled, MatchEvent::RecordScore)
            | (MatchStatus::InProgress, MatchEvent::RecordScore) => MatchStatus::InProgress,
            (MatchStatus::Scheduled, MatchEvent::Finalize { .. })
            | (MatchStatus::InProgress, MatchEvent::Finalize { .. }) => MatchStatus::Finished,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

impl From<MatchStatusEntity> for MatchStatus {
    fn from(value: MatchStatusEntity) -> Self {
        match value {
            MatchStatusEntity::Scheduled => MatchStatus::Scheduled,
            MatchStatusEntity::InProgress => MatchStatus::InProgress,
            MatchStatusEntity::Finished => MatchStatus::Finished,
        }
    }
}

impl From<MatchStatus> for MatchStatusEntity {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Scheduled => MatchStatusEntity::Scheduled,
            MatchStatus::InProgress => MatchStatusEntity::InProgress,
            MatchStatus::Finished => MatchStatusEntity::Finished,
        }
    }
}
