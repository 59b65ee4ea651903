//! Management API tests: auth boundaries, CRUD scoping, the bulk schedule
//! generator, and standings over the HTTP surface.

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use crate::test_utils::*;

#[sqlx::test]
async fn test_requests_without_key_are_unauthorized(pool: PgPool) {
    let (server, _handle) = create_test_app(pool).await;

    let response = server.get("/api/v1/classes").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server.get("/api/v1/classes").authorization_bearer("ck-invalid").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_key_scoping(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let (_platform, platform_secret) = create_platform_key(&pool).await;
    let (_club_key, club_secret) = create_club_key(&pool, club.id).await;

    let (server, _handle) = create_test_app(pool).await;

    // Club keys cannot administer the platform.
    let response = server.get("/api/v1/clubs").authorization_bearer(&club_secret).await;
    response.assert_status(StatusCode::FORBIDDEN);

    // Platform keys are not scoped to a club.
    let response = server.get("/api/v1/students").authorization_bearer(&platform_secret).await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[sqlx::test]
async fn test_club_key_cannot_reach_other_clubs_resources(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let other_club = create_test_club(&pool).await;
    let (_key, secret) = create_club_key(&pool, club.id).await;

    let other_class = create_test_class(&pool, other_club.id, 4).await;

    let (server, _handle) = create_test_app(pool).await;
    let response = server
        .get(&format!("/api/v1/classes/{}", other_class.id))
        .authorization_bearer(&secret)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn test_platform_key_creates_club_and_club_key(pool: PgPool) {
    let (_platform, platform_secret) = create_platform_key(&pool).await;
    let (server, _handle) = create_test_app(pool).await;

    let response = server
        .post("/api/v1/clubs")
        .authorization_bearer(&platform_secret)
        .json(&json!({ "name": "Dive Center Azul", "slug": "dive-azul" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let club: serde_json::Value = response.json();

    let response = server
        .post(&format!("/api/v1/clubs/{}/keys", club["id"].as_str().unwrap()))
        .authorization_bearer(&platform_secret)
        .json(&json!({ "name": "front desk" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let key: serde_json::Value = response.json();
    assert!(key["secret"].as_str().unwrap().starts_with("ck-"));

    // The minted key works for club-scoped endpoints.
    let response = server
        .get("/api/v1/classes")
        .authorization_bearer(key["secret"].as_str().unwrap())
        .await;
    response.assert_status_ok();

    // Revocation kills it.
    let response = server
        .delete(&format!("/api/v1/keys/{}", key["id"].as_str().unwrap()))
        .authorization_bearer(&platform_secret)
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server
        .get("/api/v1/classes")
        .authorization_bearer(key["secret"].as_str().unwrap())
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_bulk_schedule_generation(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let (_key, secret) = create_club_key(&pool, club.id).await;

    let (server, _handle) = create_test_app(pool).await;
    let response = server
        .post("/api/v1/classes/bulk")
        .authorization_bearer(&secret)
        .json(&json!({
            "name_prefix": "Padel",
            "max_participants": 4,
            "days_of_week": [0, 2],
            "window_start": "17:00:00",
            "window_end": "20:00:00",
            "slot_minutes": 60
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: Vec<serde_json::Value> = response.json();
    assert_eq!(created.len(), 6, "2 days x 3 hourly slots");
    assert_eq!(created[0]["name"], "Padel Mon 17:00");

    // An empty expansion is a client error.
    let response = server
        .post("/api/v1/classes/bulk")
        .authorization_bearer(&secret)
        .json(&json!({
            "name_prefix": "Padel",
            "max_participants": 4,
            "days_of_week": [0],
            "window_start": "20:00:00",
            "window_end": "17:00:00",
            "slot_minutes": 60
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_enrollment_fills_and_conflicts_over_http(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let (_key, secret) = create_club_key(&pool, club.id).await;
    let class = create_test_class(&pool, club.id, 1).await;

    let alice = create_test_student(&pool, club.id).await;
    let bob = create_test_student(&pool, club.id).await;

    let (server, _handle) = create_test_app(pool).await;

    let response = server
        .post(&format!("/api/v1/classes/{}/participants", class.id))
        .authorization_bearer(&secret)
        .json(&json!({ "student_id": alice.id }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post(&format!("/api/v1/classes/{}/participants", class.id))
        .authorization_bearer(&secret)
        .json(&json!({ "student_id": bob.id }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[sqlx::test]
async fn test_duplicate_waitlist_join_conflicts(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let (_key, secret) = create_club_key(&pool, club.id).await;
    let class = create_test_class(&pool, club.id, 1).await;
    let student = create_test_student(&pool, club.id).await;

    let (server, _handle) = create_test_app(pool).await;

    let response = server
        .post(&format!("/api/v1/classes/{}/waitlist", class.id))
        .authorization_bearer(&secret)
        .json(&json!({ "student_id": student.id }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post(&format!("/api/v1/classes/{}/waitlist", class.id))
        .authorization_bearer(&secret)
        .json(&json!({ "student_id": student.id }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[sqlx::test]
async fn test_standings_over_http(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let (_key, secret) = create_club_key(&pool, club.id).await;

    let (server, _handle) = create_test_app(pool).await;

    let league: serde_json::Value = server
        .post("/api/v1/leagues")
        .authorization_bearer(&secret)
        .json(&json!({ "name": "Winter League", "season": "2026" }))
        .await
        .json();
    let league_id = league["id"].as_str().unwrap().to_string();

    let mut team_ids = Vec::new();
    for name in ["Aces", "Breakers", "Curlers"] {
        let team: serde_json::Value = server
            .post(&format!("/api/v1/leagues/{league_id}/teams"))
            .authorization_bearer(&secret)
            .json(&json!({ "name": name }))
            .await
            .json();
        team_ids.push(team["id"].as_str().unwrap().to_string());
    }

    // Aces beat Breakers 2-0, Breakers beat Curlers 2-1, Aces beat Curlers 2-0.
    let results = [
        (&team_ids[0], &team_ids[1], json!([{ "home_games": 6, "away_games": 3 }, { "home_games": 6, "away_games": 4 }])),
        (
            &team_ids[1],
            &team_ids[2],
            json!([{ "home_games": 6, "away_games": 2 }, { "home_games": 3, "away_games": 6 }, { "home_games": 7, "away_games": 5 }]),
        ),
        (&team_ids[0], &team_ids[2], json!([{ "home_games": 6, "away_games": 1 }, { "home_games": 6, "away_games": 2 }])),
    ];

    for (home, away, sets) in results {
        let response = server
            .post(&format!("/api/v1/leagues/{league_id}/matches"))
            .authorization_bearer(&secret)
            .json(&json!({ "home_team_id": home, "away_team_id": away, "sets": sets }))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    let standings: Vec<serde_json::Value> = server
        .get(&format!("/api/v1/leagues/{league_id}/standings"))
        .authorization_bearer(&secret)
        .await
        .json();

    assert_eq!(standings.len(), 3);
    assert_eq!(standings[0]["team_name"], "Aces");
    assert_eq!(standings[0]["points"], 4); // two wins
    assert_eq!(standings[1]["team_name"], "Breakers");
    assert_eq!(standings[1]["points"], 3); // one win, one loss
    assert_eq!(standings[2]["team_name"], "Curlers");
    assert_eq!(standings[2]["points"], 2); // two losses
}
