use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::matches::{
        CreateMatchRequest, FinalizeMatchResponse, MatchResponse, SetsRequest,
        SetsValidationResponse, UpdateSetsRequest,
    },
    error::AppError,
    services::match_service,
    state::SharedState,
};

/// Match scheduling, scoring and finalization endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matches", post(create_match))
        .route("/matches/active", get(list_active_matches))
        .route("/matches/{id}", get(get_match))
        .route("/matches/{id}/sets", put(update_sets))
        .route("/matches/{id}/validate", post(validate_sets))
        .route("/matches/{id}/finalize", post(finalize_match))
}

/// Schedule a match between two registered teams.
#[utoipa::path(
    post,
    path = "/matches",
    tag = "matches",
    request_body = CreateMatchRequest,
    responses(
        (status = 201, description = "Match scheduled", body = MatchResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Unknown team"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn create_match(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateMatchRequest>>,
) -> Result<(StatusCode, Json<MatchResponse>), AppError> {
    let game = match_service::create_match(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// List scheduled and in-progress matches by start time.
#[utoipa::path(
    get,
    path = "/matches/active",
    tag = "matches",
    responses(
        (status = 200, description = "Active matches", body = [MatchResponse]),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn list_active_matches(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MatchResponse>>, AppError> {
    Ok(Json(match_service::list_active_matches(&state).await?))
}

/// Fetch one match in any state.
#[utoipa::path(
    get,
    path = "/matches/{id}",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Match", body = MatchResponse),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn get_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, AppError> {
    Ok(Json(match_service::get_match(&state, id).await?))
}

/// Record a partial score without touching standings.
#[utoipa::path(
    put,
    path = "/matches/{id}/sets",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = UpdateSetsRequest,
    responses(
        (status = 200, description = "Score recorded", body = MatchResponse),
        (status = 400, description = "Malformed set score"),
        (status = 404, description = "Unknown match"),
        (status = 409, description = "Match finished or already started")
    )
)]
pub async fn update_sets(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateSetsRequest>>,
) -> Result<Json<MatchResponse>, AppError> {
    Ok(Json(match_service::update_sets(&state, id, payload).await?))
}

/// Classify set scores without persisting them. Send `{}` to check the stored sets.
#[utoipa::path(
    post,
    path = "/matches/{id}/validate",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = SetsRequest,
    responses(
        (status = 200, description = "Classification", body = SetsValidationResponse),
        (status = 400, description = "Malformed set score"),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn validate_sets(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SetsRequest>>,
) -> Result<Json<SetsValidationResponse>, AppError> {
    Ok(Json(match_service::validate_sets(&state, id, payload).await?))
}

/// Commit a decided match and update both teams' standings.
#[utoipa::path(
    post,
    path = "/matches/{id}/finalize",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = SetsRequest,
    responses(
        (status = 200, description = "Match finalized", body = FinalizeMatchResponse),
        (status = 400, description = "Malformed set score"),
        (status = 404, description = "Unknown match or team"),
        (status = 409, description = "No winner yet or match already finished"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn finalize_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SetsRequest>>,
) -> Result<Json<FinalizeMatchResponse>, AppError> {
    Ok(Json(match_service::finalize_match(&state, id, payload).await?))
}
