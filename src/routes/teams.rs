use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dto::team::{CreateTeamRequest, TeamResponse},
    error::AppError,
    services::team_service,
    state::SharedState,
};

/// Team registration and listing endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/teams", get(list_teams).post(create_team))
        .route("/teams/ranking", get(ranked_teams))
}

/// List every registered team in registration order.
#[utoipa::path(
    get,
    path = "/teams",
    tag = "teams",
    responses(
        (status = 200, description = "Registered teams", body = [TeamResponse]),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn list_teams(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TeamResponse>>, AppError> {
    Ok(Json(team_service::list_teams(&state).await?))
}

/// Register a new team with zeroed standings.
#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team registered", body = TeamResponse),
        (status = 400, description = "Blank field or label outside the catalog"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn create_team(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateTeamRequest>>,
) -> Result<(StatusCode, Json<TeamResponse>), AppError> {
    let team = team_service::create_team(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// List teams ordered by category, zone, points and games won.
#[utoipa::path(
    get,
    path = "/teams/ranking",
    tag = "teams",
    responses(
        (status = 200, description = "Teams in ranking order", body = [TeamResponse]),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn ranked_teams(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TeamResponse>>, AppError> {
    Ok(Json(team_service::ranked_teams(&state).await?))
}
