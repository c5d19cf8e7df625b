use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::sse::ServerEvent,
    services::{match_service, sse_events},
    state::SharedState,
};

/// Subscribe to the public feed and collect the events owed to the new client:
/// the handshake, then the current active matches when storage is reachable.
pub async fn subscribe_public(
    state: &SharedState,
) -> (broadcast::Receiver<ServerEvent>, Vec<ServerEvent>) {
    // Subscribe first so nothing broadcast while the snapshot loads is missed.
    let receiver = state.public_sse().subscribe();

    let mut initial = Vec::with_capacity(2);
    initial.extend(sse_events::handshake_event(state));

    match match_service::list_active_matches(state).await {
        Ok(matches) => initial.extend(sse_events::active_matches_event(matches)),
        Err(err) => warn!(error = %err, "active matches unavailable for new subscriber"),
    }

    (receiver, initial)
}

/// Convert a broadcast receiver into an SSE response. `initial` events are sent
/// before anything from the shared channel.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    initial: Vec<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        for payload in initial {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                info!("Public SSE stream disconnected");
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "public SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!("Public SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::tournament_store::memory::MemoryTournamentStore,
        state::AppState,
    };

    #[tokio::test]
    async fn degraded_subscriber_only_gets_handshake() {
        let state = AppState::new(AppConfig::default());
        let (_receiver, initial) = subscribe_public(&state).await;

        assert_eq!(initial.len(), 1);
        assert_eq!(initial[0].event.as_deref(), Some(sse_events::EVENT_HANDSHAKE));
    }

    #[tokio::test]
    async fn subscriber_gets_active_matches_on_connect() {
        let state = AppState::new(AppConfig::default());
        state
            .install_store(Arc::new(MemoryTournamentStore::new()))
            .await;

        let (_receiver, initial) = subscribe_public(&state).await;

        let names: Vec<_> = initial.iter().map(|e| e.event.as_deref()).collect();
        assert_eq!(
            names,
            vec![
                Some(sse_events::EVENT_HANDSHAKE),
                Some(sse_events::EVENT_MATCHES_ACTIVE)
            ]
        );
        assert_eq!(state.public_sse().subscriber_count(), 1);
    }
}
