//! HTTP flows driven through the full router with the in-memory store:
//! registration, scheduling, score entry, finalization and standings.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use padel_live_back::{
    config::AppConfig,
    dao::tournament_store::memory::MemoryTournamentStore,
    routes,
    state::AppState,
};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for oneshot

async fn setup_app() -> Router {
    let state = AppState::new(AppConfig::default());
    state
        .install_store(Arc::new(MemoryTournamentStore::new()))
        .await;
    routes::router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register_team(app: &Router, name: &str, zone: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/teams",
        Some(json!({
            "name": name,
            "player_one": "Juan",
            "player_two": "Pedro",
            "category": "5ta Caballeros",
            "zone": zone,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_owned()
}

async fn schedule_match(app: &Router, team_a: &str, team_b: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/matches",
        Some(json!({
            "team_a_id": team_a,
            "team_b_id": team_b,
            "court": "Cancha 1",
            "starts_at": "2025-03-14T18:30:00-03:00",
            "round": "Jornada 1",
            "zone": "Zona A",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "scheduled");
    body["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn health_reports_ok_with_store() {
    let app = setup_app().await;
    let (status, body) = send(&app, "GET", "/healthcheck", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn data_routes_are_unavailable_without_store() {
    let app = routes::router(AppState::new(AppConfig::default()));

    let (status, body) = send(&app, "GET", "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");

    let (status, _) = send(&app, "GET", "/teams", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = send(&app, "GET", "/public/catalog", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["courts"].as_array().is_some_and(|courts| !courts.is_empty()));
}

#[tokio::test]
async fn blank_team_name_is_rejected() {
    let app = setup_app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/teams",
        Some(json!({
            "name": "  ",
            "player_one": "Juan",
            "player_two": "Pedro",
            "category": "5ta Caballeros",
            "zone": "Zona A",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn match_with_unknown_team_is_not_found() {
    let app = setup_app().await;
    let team = register_team(&app, "Los Pumas", "Zona A").await;
    let (status, body) = send(
        &app,
        "POST",
        "/matches",
        Some(json!({
            "team_a_id": team,
            "team_b_id": "9b2f7c1e-3c1a-4e0b-a1a5-5f1d2f3e4a5b",
            "court": "Cancha 1",
            "starts_at": "2025-03-14T18:30:00-03:00",
            "round": "Jornada 1",
            "zone": "Zona A",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn full_match_flow_updates_standings() {
    let app = setup_app().await;
    let pumas = register_team(&app, "Los Pumas", "Zona A").await;
    let aguilas = register_team(&app, "Las Aguilas", "Zona A").await;
    let match_id = schedule_match(&app, &pumas, &aguilas).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/matches/{match_id}/sets"),
        Some(json!({ "status": "in_progress", "sets": [[7, 6], [4, 6], [0, 0]] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_progress");
    assert_eq!(body["sets"], json!([[7, 6], [4, 6]]));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/matches/{match_id}/finalize"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("no winner"));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/matches/{match_id}/validate"),
        Some(json!({ "sets": [[7, 6], [4, 6], [6, 3]] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "ready_to_finalize");
    assert_eq!(body["winner_id"], pumas.as_str());

    let (status, body) = send(
        &app,
        "POST",
        &format!("/matches/{match_id}/finalize"),
        Some(json!({ "sets": [[7, 6], [4, 6], [6, 3]] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["winner_id"], pumas.as_str());
    assert_eq!(body["match"]["status"], "finished");

    let (_, active) = send(&app, "GET", "/matches/active", None).await;
    assert_eq!(active, json!([]));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/matches/{match_id}/finalize"),
        Some(json!({ "sets": [[7, 6], [4, 6], [6, 3]] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, standings) = send(&app, "GET", "/public/standings", None).await;
    assert_eq!(status, StatusCode::OK);
    let table = &standings["groups"][0]["teams"];
    assert_eq!(table[0]["name"], "Los Pumas");
    assert_eq!(table[0]["position"], 1);
    assert_eq!(table[0]["stats"]["points"], 2);
    assert_eq!(table[0]["stats"]["games_for"], 17);
    assert_eq!(table[0]["stats"]["games_against"], 15);
    assert_eq!(table[1]["name"], "Las Aguilas");
    assert_eq!(table[1]["stats"]["matches_lost"], 1);
    assert_eq!(table[1]["stats"]["games_diff"], -2);
}

#[tokio::test]
async fn malformed_set_is_a_bad_request() {
    let app = setup_app().await;
    let pumas = register_team(&app, "Los Pumas", "Zona A").await;
    let aguilas = register_team(&app, "Las Aguilas", "Zona A").await;
    let match_id = schedule_match(&app, &pumas, &aguilas).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/matches/{match_id}/sets"),
        Some(json!({ "status": "in_progress", "sets": [[6, 2], [5, 5]] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("set 2"));
}

#[tokio::test]
async fn oversized_game_count_is_a_bad_request() {
    let app = setup_app().await;
    let pumas = register_team(&app, "Los Pumas", "Zona A").await;
    let aguilas = register_team(&app, "Las Aguilas", "Zona A").await;
    let match_id = schedule_match(&app, &pumas, &aguilas).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/matches/{match_id}/sets"),
        Some(json!({ "status": "in_progress", "sets": [[6, 4294967295u64]] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/matches/{match_id}/finalize"),
        Some(json!({ "sets": [[6, 4294967295u64], [6, 4294967295u64]] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", &format!("/matches/{match_id}"), None).await;
    assert_eq!(body["status"], "scheduled");
}

#[tokio::test]
async fn scoreboard_lists_live_matches() {
    let app = setup_app().await;
    let pumas = register_team(&app, "Los Pumas", "Zona A").await;
    let aguilas = register_team(&app, "Las Aguilas", "Zona A").await;
    let match_id = schedule_match(&app, &pumas, &aguilas).await;

    let (status, body) = send(&app, "GET", "/public/scoreboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degraded"], false);
    assert_eq!(body["matches"][0]["id"], match_id.as_str());
    assert_eq!(body["matches"][0]["team_b"]["name"], "Las Aguilas");
}

#[tokio::test]
async fn ranking_orders_by_points() {
    let app = setup_app().await;
    let pumas = register_team(&app, "Los Pumas", "Zona A").await;
    let aguilas = register_team(&app, "Las Aguilas", "Zona A").await;
    let match_id = schedule_match(&app, &pumas, &aguilas).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/matches/{match_id}/finalize"),
        Some(json!({ "sets": [[2, 6], [3, 6]] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, ranking) = send(&app, "GET", "/teams/ranking", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ranking[0]["id"], aguilas.as_str());
    assert_eq!(ranking[1]["id"], pumas.as_str());
}
