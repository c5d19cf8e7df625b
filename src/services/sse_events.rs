use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        matches::{MatchResponse, sets_to_pairs},
        public::StandingsGroup,
        sse::{
            ActiveMatchesEvent, Handshake, MatchFinishedEvent, ServerEvent, StandingsUpdatedEvent,
            SystemStatus,
        },
    },
    state::{
        SharedState,
        ranking::MatchOutcome,
        tournament::Match,
    },
};

pub(crate) const EVENT_HANDSHAKE: &str = "handshake";
pub(crate) const EVENT_MATCHES_ACTIVE: &str = "matches.active";
const EVENT_MATCH_FINISHED: &str = "match.finished";
const EVENT_STANDINGS_UPDATED: &str = "standings.updated";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the full list of active matches.
pub fn broadcast_active_matches(state: &SharedState, matches: Vec<MatchResponse>) {
    send_public_event(state, EVENT_MATCHES_ACTIVE, &ActiveMatchesEvent(matches));
}

/// Broadcast the committed result of a finalized match.
pub fn broadcast_match_finished(state: &SharedState, game: &Match, outcome: &MatchOutcome) {
    let payload = MatchFinishedEvent {
        match_id: outcome.match_id,
        winner_id: outcome.winner_id,
        winner_name: game.team(outcome.winner).name.clone(),
        sets: sets_to_pairs(&outcome.sets),
    };
    send_public_event(state, EVENT_MATCH_FINISHED, &payload);
}

/// Broadcast the grouped standings table.
pub fn broadcast_standings(state: &SharedState, groups: Vec<StandingsGroup>) {
    send_public_event(state, EVENT_STANDINGS_UPDATED, &StandingsUpdatedEvent(groups));
}

/// Broadcast a degraded mode change.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_public_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// Handshake event delivered to a freshly connected public subscriber.
pub fn handshake_event(state: &SharedState) -> Option<ServerEvent> {
    let payload = Handshake {
        stream: "public".into(),
        message: "subscribed to live scores".into(),
        degraded: state.is_degraded(),
    };
    build_event(EVENT_HANDSHAKE, &payload)
}

/// Active matches snapshot addressed to a single subscriber.
pub fn active_matches_event(matches: Vec<MatchResponse>) -> Option<ServerEvent> {
    build_event(EVENT_MATCHES_ACTIVE, &ActiveMatchesEvent(matches))
}

fn build_event(event: &str, payload: &impl Serialize) -> Option<ServerEvent> {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(event, error = %err, "failed to serialize public SSE payload");
            None
        }
    }
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    if let Some(event) = build_event(event, payload) {
        state.public_sse().broadcast(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::state::AppState;

    #[tokio::test]
    async fn system_status_reaches_subscribers() {
        let state = AppState::new(AppConfig::default());
        let mut receiver = state.public_sse().subscribe();

        broadcast_system_status(&state, true);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_SYSTEM_STATUS));
        assert_eq!(event.data, r#"{"degraded":true}"#);
    }

    #[test]
    fn handshake_reports_degraded_mode() {
        let state = AppState::new(AppConfig::default());
        let event = handshake_event(&state).unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_HANDSHAKE));
        assert!(event.data.contains(r#""degraded":true"#));
    }

    #[test]
    fn empty_active_list_is_a_json_array() {
        let event = active_matches_event(Vec::new()).unwrap();
        assert_eq!(event.data, "[]");
    }
}
