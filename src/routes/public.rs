use axum::{Json, Router, extract::State, routing::get};

use crate::{
    config::Catalog,
    dto::public::{ScoreboardResponse, StandingsResponse},
    error::AppError,
    services::public_service,
    state::SharedState,
};

/// Public read-only endpoints backing the scoreboard screens.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/public/scoreboard", get(get_scoreboard))
        .route("/public/standings", get(get_standings))
        .route("/public/catalog", get(get_catalog))
}

#[utoipa::path(
    get,
    path = "/public/scoreboard",
    tag = "public",
    responses(
        (status = 200, description = "Active matches", body = ScoreboardResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
/// Return the matches currently scheduled or being played.
pub async fn get_scoreboard(
    State(state): State<SharedState>,
) -> Result<Json<ScoreboardResponse>, AppError> {
    Ok(Json(public_service::scoreboard(&state).await?))
}

#[utoipa::path(
    get,
    path = "/public/standings",
    tag = "public",
    responses(
        (status = 200, description = "Standings per category and zone", body = StandingsResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
/// Return the standings table of every group.
pub async fn get_standings(
    State(state): State<SharedState>,
) -> Result<Json<StandingsResponse>, AppError> {
    Ok(Json(public_service::standings(&state).await?))
}

#[utoipa::path(
    get,
    path = "/public/catalog",
    tag = "public",
    responses((status = 200, description = "Configured labels", body = Catalog))
)]
/// Return the configured categories, zones, courts and rounds.
pub async fn get_catalog(State(state): State<SharedState>) -> Json<Catalog> {
    Json(public_service::catalog(&state))
}
