use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{matches::MatchResponse, public::StandingsGroup};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Full list of active matches, pushed after every match change.
pub struct ActiveMatchesEvent(pub Vec<MatchResponse>);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast once a match result has been committed.
pub struct MatchFinishedEvent {
    pub match_id: Uuid,
    pub winner_id: Uuid,
    pub winner_name: String,
    #[schema(value_type = Vec<Vec<u32>>)]
    pub sets: Vec<[u32; 2]>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Grouped standings, pushed after team registration and finalization.
pub struct StandingsUpdatedEvent(pub Vec<StandingsGroup>);
