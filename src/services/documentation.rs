use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Padel Live Back.
#[openapi(
    info(title = "Padel Live Back", description = "Live scoring and standings for a padel tournament"),
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::teams::list_teams,
        crate::routes::teams::create_team,
        crate::routes::teams::ranked_teams,
        crate::routes::matches::create_match,
        crate::routes::matches::list_active_matches,
        crate::routes::matches::get_match,
        crate::routes::matches::update_sets,
        crate::routes::matches::validate_sets,
        crate::routes::matches::finalize_match,
        crate::routes::public::get_scoreboard,
        crate::routes::public::get_standings,
        crate::routes::public::get_catalog,
    ),
    components(
        schemas(
            crate::config::Catalog,
            crate::dto::health::HealthResponse,
            crate::dto::team::CreateTeamRequest,
            crate::dto::team::TeamResponse,
            crate::dto::team::TeamStatsDto,
            crate::dto::matches::CreateMatchRequest,
            crate::dto::matches::UpdateSetsRequest,
            crate::dto::matches::SetsRequest,
            crate::dto::matches::MatchStatusDto,
            crate::dto::matches::MatchTeamDto,
            crate::dto::matches::MatchResponse,
            crate::dto::matches::SetsOutcomeDto,
            crate::dto::matches::SetsValidationResponse,
            crate::dto::matches::FinalizeMatchResponse,
            crate::dto::public::ScoreboardResponse,
            crate::dto::public::StandingsGroup,
            crate::dto::public::StandingEntry,
            crate::dto::public::StandingsResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::ActiveMatchesEvent,
            crate::dto::sse::MatchFinishedEvent,
            crate::dto::sse::StandingsUpdatedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "teams", description = "Team registration and ranking"),
        (name = "matches", description = "Match scheduling, scoring and finalization"),
        (name = "public", description = "Read-only scoreboard and standings"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/sse/public",
            "/teams",
            "/teams/ranking",
            "/matches",
            "/matches/active",
            "/matches/{id}",
            "/matches/{id}/sets",
            "/matches/{id}/validate",
            "/matches/{id}/finalize",
            "/public/scoreboard",
            "/public/standings",
            "/public/catalog",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
