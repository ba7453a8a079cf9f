//! Integration tests for the ledger API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` against an
//! in-memory store, without starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::Utc;
use pilot_ledger_api::{AppState, StaticTokens, build_router};
use pilot_ledger_core::MemoryStore;
use pilot_ledger_types::{User, UserId};
use serde_json::{Value, json};
use tower::ServiceExt;

const PLAYER: &str = "player-token";
const RIVAL: &str = "rival-token";
const GM: &str = "gm-token";

fn user(name: &str, discord_id: &str, is_gm: bool) -> User {
    let now = Utc::now();
    User {
        id: UserId::new(),
        discord_id: Some(discord_id.to_owned()),
        discord_username: Some(name.to_lowercase()),
        display_name: Some(name.to_owned()),
        is_gm,
        created_at: now,
        updated_at: now,
    }
}

fn make_router() -> Router {
    let tokens = StaticTokens::default()
        .with_user(PLAYER, user("Player", "1001", false))
        .with_user(RIVAL, user("Rival", "1002", false))
        .with_user(GM, user("Gamemaster", "1003", true));
    let state = Arc::new(AppState::new(MemoryStore::new(), Arc::new(tokens)));
    build_router(state, &[])
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_pilot(router: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/pilots",
        Some(token),
        Some(json!({ "name": name, "callsign": "Hex" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_owned()
}

// ---------------------------------------------------------------------------
// Status and auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_needs_no_token() {
    let router = make_router();
    let (status, body) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&router, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "pilot-ledger");
}

#[tokio::test]
async fn protected_routes_reject_missing_or_unknown_tokens() {
    let router = make_router();
    let (status, body) = send(&router, Method::GET, "/pilots", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert_eq!(body["error"], "missing authorization header");

    let (status, body) = send(&router, Method::GET, "/pilots", Some("nope"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid token");
}

#[tokio::test]
async fn me_returns_the_callers_profile() {
    let router = make_router();
    let (status, body) = send(&router, Method::GET, "/auth/me", Some(GM), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Gamemaster");
    assert_eq!(body["is_gm"], true);
}

// ---------------------------------------------------------------------------
// Pilots
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pilot_lifecycle() {
    let router = make_router();
    let id = create_pilot(&router, PLAYER, "Ash").await;

    let (status, body) = send(&router, Method::GET, "/pilots", Some(PLAYER), None).await;
    assert_eq!(status, StatusCode::OK);
    let pilots = body.as_array().unwrap();
    assert_eq!(pilots.len(), 1);
    assert_eq!(body[0]["name"], "Ash");
    assert_eq!(body[0]["license_level"], 0);
    assert_eq!(body[0]["ll_clock_segments"], 3);

    let uri = format!("/pilots/{id}");
    let (status, body) = send(
        &router,
        Method::PUT,
        &uri,
        Some(PLAYER),
        Some(json!({ "background": "Ex-Union", "manna": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["background"], "Ex-Union");
    assert_eq!(body["manna"], 0);

    let (status, body) = send(&router, Method::DELETE, &uri, Some(PLAYER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Pilot deleted successfully");

    let (status, _) = send(&router, Method::GET, &uri, Some(PLAYER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_players_pilots_are_not_found() {
    let router = make_router();
    let id = create_pilot(&router, PLAYER, "Ash").await;

    let (status, body) =
        send(&router, Method::GET, &format!("/pilots/{id}"), Some(RIVAL), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Pilot not found");

    let (_, body) = send(&router, Method::GET, "/pilots", Some(RIVAL), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let router = make_router();
    let (status, _) = send(&router, Method::GET, "/pilots/not-a-uuid", Some(PLAYER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_pilot_name_fails_validation() {
    let router = make_router();
    let (status, body) = send(
        &router,
        Method::POST,
        "/pilots",
        Some(PLAYER),
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logging_a_session_replays_the_pilot() {
    let router = make_router();
    let id = create_pilot(&router, PLAYER, "Ash").await;
    let logs_uri = format!("/pilots/{id}/logs");

    let (status, body) = send(
        &router,
        Method::POST,
        &logs_uri,
        Some(PLAYER),
        Some(json!({
            "log_type": "game",
            "description": "Opening Salvo",
            "manna_change": 7,
            "downtime_change": 2,
            "ll_clock_change": 3,
            "gear_acquired": [{ "name": "Ghost Cloak" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["manna_change"], 7);
    assert_eq!(body["gear_acquired"][0]["name"], "Ghost Cloak");
    let log_id = body["id"].as_str().unwrap().to_owned();

    let (_, pilot) = send(&router, Method::GET, &format!("/pilots/{id}"), Some(PLAYER), None).await;
    assert_eq!(pilot["manna"], 7);
    assert_eq!(pilot["downtime"], 2);
    assert_eq!(pilot["license_level"], 1);
    assert_eq!(pilot["ll_clock_progress"], 0);

    let (status, details) = send(
        &router,
        Method::GET,
        &format!("/logs/{log_id}/details"),
        Some(PLAYER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["gear_acquired"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &router,
        Method::PUT,
        &format!("/logs/{log_id}"),
        Some(PLAYER),
        Some(json!({ "manna_change": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, pilot) = send(&router, Method::GET, &format!("/pilots/{id}"), Some(PLAYER), None).await;
    assert_eq!(pilot["manna"], 2);

    let (status, body) = send(
        &router,
        Method::DELETE,
        &format!("/logs/{log_id}"),
        Some(PLAYER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Log entry deleted successfully");

    let (_, pilot) = send(&router, Method::GET, &format!("/pilots/{id}"), Some(PLAYER), None).await;
    assert_eq!(pilot["manna"], 0);
    assert_eq!(pilot["license_level"], 0);
    let (_, gear) = send(&router, Method::GET, &format!("/pilots/{id}/gear"), Some(PLAYER), None).await;
    assert!(gear.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn other_players_logs_are_forbidden() {
    let router = make_router();
    let id = create_pilot(&router, PLAYER, "Ash").await;
    let (_, body) = send(
        &router,
        Method::POST,
        &format!("/pilots/{id}/logs"),
        Some(PLAYER),
        Some(json!({ "log_type": "trade", "manna_change": 5 })),
    )
    .await;
    let log_id = body["id"].as_str().unwrap().to_owned();

    let (status, body) =
        send(&router, Method::GET, &format!("/logs/{log_id}"), Some(RIVAL), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not authorized");

    let (status, _) =
        send(&router, Method::DELETE, &format!("/logs/{log_id}"), Some(RIVAL), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clock_segments_must_be_positive() {
    let router = make_router();
    let id = create_pilot(&router, PLAYER, "Ash").await;
    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/pilots/{id}/clocks"),
        Some(PLAYER),
        Some(json!({ "name": "Rival", "segments": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clock_ticks_fill_and_complete() {
    let router = make_router();
    let id = create_pilot(&router, PLAYER, "Ash").await;
    let (status, clock) = send(
        &router,
        Method::POST,
        &format!("/pilots/{id}/clocks"),
        Some(PLAYER),
        Some(json!({ "name": "Nemesis", "segments": 4, "tick_amount": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clock["filled"], 0);
    let clock_id = clock["id"].as_str().unwrap().to_owned();
    let tick_uri = format!("/clocks/{clock_id}/tick");

    let (status, clock) =
        send(&router, Method::POST, &tick_uri, Some(PLAYER), Some(json!({ "ticks": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clock["filled"], 2);
    assert_eq!(clock["is_completed"], false);

    let (_, clock) =
        send(&router, Method::POST, &tick_uri, Some(PLAYER), Some(json!({ "ticks": 5 }))).await;
    assert_eq!(clock["filled"], 4);
    assert_eq!(clock["is_completed"], true);

    let (status, _) =
        send(&router, Method::POST, &tick_uri, Some(RIVAL), Some(json!({ "ticks": 1 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &router,
        Method::DELETE,
        &format!("/clocks/{clock_id}"),
        Some(PLAYER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Clock deleted successfully");
}

// ---------------------------------------------------------------------------
// Corporations and reputation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn corporations_are_gm_managed() {
    let router = make_router();
    let payload = json!({ "name": "Harrison Armory" });

    let (status, body) =
        send(&router, Method::POST, "/corporations", Some(PLAYER), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "GM access required");

    let (status, _) = send(&router, Method::POST, "/corporations", Some(GM), Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, Method::GET, "/corporations", Some(PLAYER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Harrison Armory");
}

#[tokio::test]
async fn reputation_tracks_logged_changes() {
    let router = make_router();
    let (_, corp) = send(
        &router,
        Method::POST,
        "/corporations",
        Some(GM),
        Some(json!({ "name": "IPS-N" })),
    )
    .await;
    let corp_id = corp["id"].as_str().unwrap().to_owned();
    let id = create_pilot(&router, PLAYER, "Ash").await;
    let rep_uri = format!("/pilots/{id}/reputation");

    let (status, standing) = send(
        &router,
        Method::POST,
        &rep_uri,
        Some(PLAYER),
        Some(json!({ "corporation_id": corp_id, "base_value": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(standing["reputation_value"], 2);

    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/pilots/{id}/logs"),
        Some(PLAYER),
        Some(json!({
            "log_type": "game",
            "reputation_changes": [{ "corporation_id": corp_id, "change_value": 3 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, standings) = send(&router, Method::GET, &rep_uri, Some(PLAYER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(standings[0]["corporation_name"], "IPS-N");
    assert_eq!(standings[0]["reputation_value"], 5);

    let (status, _) = send(
        &router,
        Method::POST,
        &rep_uri,
        Some(PLAYER),
        Some(json!({ "corporation_id": uuid::Uuid::now_v7() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn open_corporation_standing(router: &Router, id: &str) -> (String, String) {
    let (_, corp) = send(
        router,
        Method::POST,
        "/corporations",
        Some(GM),
        Some(json!({ "name": "SSC" })),
    )
    .await;
    let corp_id = corp["id"].as_str().unwrap().to_owned();
    let (status, standing) = send(
        router,
        Method::POST,
        &format!("/pilots/{id}/reputation"),
        Some(PLAYER),
        Some(json!({ "corporation_id": corp_id, "base_value": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (corp_id, standing["id"].as_str().unwrap().to_owned())
}

#[tokio::test]
async fn duplicate_standing_is_a_conflict() {
    let router = make_router();
    let id = create_pilot(&router, PLAYER, "Ash").await;
    let (corp_id, standing_id) = open_corporation_standing(&router, &id).await;
    let rep_uri = format!("/pilots/{id}/reputation");

    let (status, body) = send(
        &router,
        Method::POST,
        &rep_uri,
        Some(PLAYER),
        Some(json!({ "corporation_id": corp_id, "base_value": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
    assert!(body["error"].as_str().unwrap().contains(&standing_id));

    let (_, standings) = send(&router, Method::GET, &rep_uri, Some(PLAYER), None).await;
    assert_eq!(standings.as_array().unwrap().len(), 1);
    assert_eq!(standings[0]["reputation_value"], 1);
}

#[tokio::test]
async fn deleted_standing_is_not_rebuilt_by_later_logs() {
    let router = make_router();
    let id = create_pilot(&router, PLAYER, "Ash").await;
    let (corp_id, standing_id) = open_corporation_standing(&router, &id).await;
    let logs_uri = format!("/pilots/{id}/logs");

    let (status, _) = send(
        &router,
        Method::POST,
        &logs_uri,
        Some(PLAYER),
        Some(json!({
            "log_type": "game",
            "reputation_changes": [{ "corporation_id": corp_id, "change_value": 2 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/reputation/{standing_id}"),
        Some(PLAYER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        Method::POST,
        &logs_uri,
        Some(PLAYER),
        Some(json!({ "log_type": "game", "manna_change": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, standings) =
        send(&router, Method::GET, &format!("/pilots/{id}/reputation"), Some(PLAYER), None).await;
    assert_eq!(standings, json!([]));
}

// ---------------------------------------------------------------------------
// GM views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn gm_views_require_gm() {
    let router = make_router();
    let (status, _) = send(&router, Method::GET, "/gm/pilots", Some(PLAYER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&router, Method::GET, "/gm/logs", Some(PLAYER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn gm_log_listing_filters_and_pages() {
    let router = make_router();
    let ash = create_pilot(&router, PLAYER, "Ash").await;
    let bex = create_pilot(&router, RIVAL, "Bex").await;
    for (pilot, token, manna) in [(&ash, PLAYER, 5), (&ash, PLAYER, -3), (&bex, RIVAL, 8)] {
        let (status, _) = send(
            &router,
            Method::POST,
            &format!("/pilots/{pilot}/logs"),
            Some(token),
            Some(json!({ "log_type": "game", "manna_change": manna })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, page) = send(&router, Method::GET, "/gm/logs", Some(GM), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["limit"], 50);

    let (_, page) = send(
        &router,
        Method::GET,
        "/gm/logs?resource_direction=decrease",
        Some(GM),
        None,
    )
    .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["logs"][0]["manna_change"], -3);
    assert_eq!(page["logs"][0]["pilot_name"], "Ash");
    assert_eq!(page["logs"][0]["owner_name"], "Player");

    let (_, page) = send(
        &router,
        Method::GET,
        "/gm/logs?user_discord_id=1002",
        Some(GM),
        None,
    )
    .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["logs"][0]["pilot_name"], "Bex");

    let (_, page) = send(&router, Method::GET, "/gm/logs?limit=1&offset=1", Some(GM), None).await;
    assert_eq!(page["logs"].as_array().unwrap().len(), 1);

    let (status, _) = send(&router, Method::GET, "/gm/logs?limit=0", Some(GM), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&router, Method::GET, "/gm/logs?limit=201", Some(GM), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, pilots) = send(&router, Method::GET, "/gm/pilots", Some(GM), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pilots.as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn csv_export_imports_as_a_pilot() {
    let router = make_router();
    let export = "\
name
Ash \"Hex\"
CharacterLogEntry,Patrol,,2024-01-05 18:00:00 UTC,,,,12,2,,,,,,LL4 (1/3)
CharacterLogEntry,GMing,,2024-01-12 18:00:00 UTC,,,,-2,1,,,,,,
MAGIC ITEM,Ghost Cloak,Uncommon,,,,
";
    let request = Request::post("/pilots/import")
        .header("authorization", format!("Bearer {PLAYER}"))
        .header("content-type", "text/csv")
        .body(Body::from(export))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let pilot = body_to_json(response.into_body()).await;
    assert_eq!(pilot["name"], "Ash");
    assert_eq!(pilot["callsign"], "Hex");
    assert_eq!(pilot["manna"], 10);
    assert_eq!(pilot["license_level"], 4);
    assert_eq!(pilot["ll_clock_progress"], 1);

    let id = pilot["id"].as_str().unwrap();
    let (_, gear) = send(&router, Method::GET, &format!("/pilots/{id}/gear"), Some(PLAYER), None).await;
    assert_eq!(gear[0]["description"], "Rarity: Uncommon");
}

#[tokio::test]
async fn empty_or_headless_imports_are_rejected() {
    let router = make_router();
    for body in ["   ", "name,race\n"] {
        let request = Request::post("/pilots/import")
            .header("authorization", format!("Bearer {PLAYER}"))
            .body(Body::from(body))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
