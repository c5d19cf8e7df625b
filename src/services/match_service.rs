use std::time::SystemTime;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::Catalog,
    dao::{models::MatchScoreUpdate, tournament_store::TournamentStore},
    dto::{
        matches::{
            CreateMatchRequest, FinalizeMatchResponse, MatchResponse, SetsRequest,
            SetsValidationResponse, UpdateSetsRequest, pairs_to_sets,
        },
        parse_timestamp,
    },
    error::ServiceError,
    services::{sse_events, team_service},
    state::{
        SharedState,
        match_lifecycle::{MatchEvent, MatchStatus},
        ranking::{IncompleteMatch, compute_outcome},
        scoring::{MatchProgress, classify},
        tournament::{Match, MatchTeam, SetScore},
    },
};

/// Schedule a match between two registered teams.
pub async fn create_match(
    state: &SharedState,
    payload: CreateMatchRequest,
) -> Result<MatchResponse, ServiceError> {
    let catalog = state.config().catalog();
    if !Catalog::allows(&catalog.courts, &payload.court) {
        return Err(ServiceError::InvalidInput(format!(
            "unknown court `{}`",
            payload.court
        )));
    }
    if !Catalog::allows(&catalog.rounds, &payload.round) {
        return Err(ServiceError::InvalidInput(format!(
            "unknown round `{}`",
            payload.round
        )));
    }
    if payload.team_a_id == payload.team_b_id {
        return Err(ServiceError::InvalidInput(
            "a match needs two different teams".into(),
        ));
    }
    let starts_at = parse_timestamp(&payload.starts_at).ok_or_else(|| {
        ServiceError::InvalidInput(format!("invalid start time `{}`", payload.starts_at))
    })?;

    let store = state.require_store().await?;
    let team_a = resolve_team(store.as_ref(), payload.team_a_id).await?;
    let team_b = resolve_team(store.as_ref(), payload.team_b_id).await?;

    let game = Match::schedule(
        team_a,
        team_b,
        payload.court,
        starts_at,
        payload.round,
        payload.zone.trim().to_owned(),
    );
    store.create_match(game.clone().into()).await?;
    info!(
        match_id = %game.id,
        team_a = %game.team_a.name,
        team_b = %game.team_b.name,
        "match scheduled"
    );

    publish_active_matches(state).await;
    Ok(game.into())
}

/// Scheduled and in-progress matches, earliest start first.
pub async fn list_active_matches(state: &SharedState) -> Result<Vec<MatchResponse>, ServiceError> {
    let store = state.require_store().await?;
    let matches = store.list_active_matches().await?;
    Ok(matches
        .into_iter()
        .map(|entity| MatchResponse::from(Match::from(entity)))
        .collect())
}

/// Fetch a single match in any state.
pub async fn get_match(state: &SharedState, id: Uuid) -> Result<MatchResponse, ServiceError> {
    let store = state.require_store().await?;
    Ok(load_match(store.as_ref(), id).await?.into())
}

/// Record a partial score. Never finishes the match and never touches standings.
pub async fn update_sets(
    state: &SharedState,
    id: Uuid,
    payload: UpdateSetsRequest,
) -> Result<MatchResponse, ServiceError> {
    let store = state.require_store().await?;
    let game = load_match(store.as_ref(), id).await?;
    if game.status == MatchStatus::Finished {
        return Err(ServiceError::AlreadyFinished(id));
    }

    let progress = classify(&pairs_to_sets(&payload.sets), game.status)?;
    let next = match (MatchStatus::from(payload.status), &progress) {
        (MatchStatus::Finished, _) => {
            return Err(ServiceError::InvalidInput(
                "matches are finished through the finalize route".into(),
            ));
        }
        (MatchStatus::Scheduled, MatchProgress::NotStarted) => MatchStatus::Scheduled,
        (MatchStatus::Scheduled, _) => {
            return Err(ServiceError::InvalidState(format!(
                "match {id} has already started and cannot go back to scheduled"
            )));
        }
        (MatchStatus::InProgress, MatchProgress::NotStarted) => {
            game.status.transition(MatchEvent::Start)?
        }
        (MatchStatus::InProgress, _) => game.status.transition(MatchEvent::RecordScore)?,
    };

    let update = MatchScoreUpdate {
        status: next.into(),
        sets: progress.sets().iter().copied().map(Into::into).collect(),
        updated_at: SystemTime::now(),
    };
    let updated = Match::from(store.update_match_score(id, update).await?);
    info!(
        match_id = %id,
        status = ?updated.status,
        sets = updated.sets.len(),
        "match score updated"
    );

    publish_active_matches(state).await;
    Ok(updated.into())
}

/// Classify sets without persisting anything.
///
/// Uses the sets in `payload` when present, otherwise the ones stored on the match.
pub async fn validate_sets(
    state: &SharedState,
    id: Uuid,
    payload: SetsRequest,
) -> Result<SetsValidationResponse, ServiceError> {
    let store = state.require_store().await?;
    let game = load_match(store.as_ref(), id).await?;
    let sets = requested_sets(&game, payload);

    let progress = classify(&sets, game.status)?;
    Ok(SetsValidationResponse::from_progress(&game, &progress))
}

/// Commit the result of a decided match and roll it into both teams' standings.
pub async fn finalize_match(
    state: &SharedState,
    id: Uuid,
    payload: SetsRequest,
) -> Result<FinalizeMatchResponse, ServiceError> {
    let (game, outcome, finished) = state
        .run_exclusive(move || async move {
            let store = state.require_store().await?;
            let game = load_match(store.as_ref(), id).await?;
            if game.status == MatchStatus::Finished {
                return Err(ServiceError::AlreadyFinished(id));
            }

            let sets = match classify(&requested_sets(&game, payload), game.status)? {
                MatchProgress::ReadyToFinalize { sets, .. } => sets,
                progress => {
                    let won = progress.sets_won();
                    return Err(IncompleteMatch {
                        match_id: id,
                        team_a: won.team_a,
                        team_b: won.team_b,
                    }
                    .into());
                }
            };

            let outcome = compute_outcome(&game, &sets)?;
            game.status.transition(MatchEvent::Finalize {
                winner_id: outcome.winner_id,
            })?;

            let stored = store
                .finalize_match(outcome.clone().into_commit(SystemTime::now()))
                .await?;
            Ok::<_, ServiceError>((game, outcome, Match::from(stored)))
        })
        .await?;

    info!(
        match_id = %id,
        winner_id = %outcome.winner_id,
        sets_a = outcome.sets_won.team_a,
        sets_b = outcome.sets_won.team_b,
        "match finalized"
    );

    publish_active_matches(state).await;
    sse_events::broadcast_match_finished(state, &game, &outcome);
    team_service::publish_standings(state).await;

    Ok(FinalizeMatchResponse {
        winner_id: outcome.winner_id,
        finished: finished.into(),
    })
}

/// Broadcast the active match list, logging when it cannot be loaded.
async fn publish_active_matches(state: &SharedState) {
    match list_active_matches(state).await {
        Ok(matches) => sse_events::broadcast_active_matches(state, matches),
        Err(err) => warn!(error = %err, "active matches not broadcast"),
    }
}

fn requested_sets(game: &Match, payload: SetsRequest) -> Vec<SetScore> {
    payload
        .sets
        .map(|pairs| pairs_to_sets(&pairs))
        .unwrap_or_else(|| game.sets.clone())
}

async fn load_match(store: &dyn TournamentStore, id: Uuid) -> Result<Match, ServiceError> {
    store
        .find_match(id)
        .await?
        .map(Match::from)
        .ok_or(ServiceError::MatchNotFound(id))
}

async fn resolve_team(store: &dyn TournamentStore, id: Uuid) -> Result<MatchTeam, ServiceError> {
    let team = store
        .find_team(id)
        .await?
        .ok_or(ServiceError::TeamNotFound(id))?;
    Ok(MatchTeam {
        id: team.id,
        name: team.name,
    })
}
