// ABOUTME: HTTP tests for manual session tracking and trail re-matching
// ABOUTME: Start, progress, completion unlocks, locked completed sessions, and idempotent matching
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::Utc;
use common::{bearer, create_test_admin, create_test_resources, create_test_trail, create_test_user};
use helpers::axum_test::AxumTestRequest;
use kilele_server::database::SessionManager;
use kilele_server::models::{Difficulty, HikeSession, SessionProgressUpdate, SessionStatus};
use kilele_server::routes::build_router;
use kilele_server::services::sessions::start_session;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn test_session_lifecycle_completes_and_unlocks() {
    let (resources, notifier) = create_test_resources().await.unwrap();
    let user = create_test_user(&resources.database, "gathoni").await.unwrap();
    let trail = create_test_trail(
        &resources.database,
        "Ngong Hills",
        "Kajiado",
        Difficulty::Moderate,
        Some((-1.3850, 36.6420)),
    )
    .await
    .unwrap();
    let token = bearer(&resources.auth_manager, &user);
    let app = build_router(resources.clone());

    let session: HikeSession = AxumTestRequest::post("/api/sessions")
        .auth(&token)
        .json(&json!({ "trail_id": trail.id }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(session.status, SessionStatus::Active);
    assert_eq!(session.trail_id, Some(trail.id));

    let uri = format!("/api/sessions/{}", session.id);
    let progress: Value = AxumTestRequest::put(&uri)
        .auth(&token)
        .json(&json!({
            "distance_covered_km": 4.5,
            "current_latitude": -1.39,
            "current_longitude": 36.65
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(progress["session"]["status"], "active");
    assert!(progress["unlocked"].as_array().unwrap().is_empty());

    let completed: Value = AxumTestRequest::put(&uri)
        .auth(&token)
        .json(&json!({
            "distance_covered_km": 11.0,
            "elevation_gain_m": 520.0,
            "duration_hours": 4.0,
            "rating": 5,
            "completed": true
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(completed["session"]["status"], "completed");
    assert!(completed["session"]["ended_at"].is_string());

    let unlocked: Vec<&str> = completed["unlocked"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    for name in ["First Steps", "10K Walker", "Hill Climber"] {
        assert!(unlocked.contains(&name), "missing {name} in {unlocked:?}");
    }
    assert_eq!(notifier.names_for(user.id).len(), unlocked.len());

    // Completed sessions no longer accept progress
    AxumTestRequest::put(&uri)
        .auth(&token)
        .json(&json!({ "distance_covered_km": 12.0 }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CONFLICT);

    let listed: Vec<HikeSession> = AxumTestRequest::get("/api/sessions?status=completed")
        .auth(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed.len(), 1);
    assert!((listed[0].distance_covered_km - 11.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_second_active_session_on_same_trail_conflicts() {
    let (resources, _) = create_test_resources().await.unwrap();
    let user = create_test_user(&resources.database, "hamisi").await.unwrap();
    let trail = create_test_trail(&resources.database, "Karura", "Nairobi", Difficulty::Easy, None)
        .await
        .unwrap();
    let token = bearer(&resources.auth_manager, &user);
    let app = build_router(resources);

    let body = json!({ "trail_id": trail.id });
    AxumTestRequest::post("/api/sessions")
        .auth(&token)
        .json(&body)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);
    AxumTestRequest::post("/api/sessions")
        .auth(&token)
        .json(&body)
        .send(app)
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_progress_is_rejected() {
    let (resources, _) = create_test_resources().await.unwrap();
    let user = create_test_user(&resources.database, "imani").await.unwrap();
    let trail = create_test_trail(&resources.database, "Karura", "Nairobi", Difficulty::Easy, None)
        .await
        .unwrap();
    let token = bearer(&resources.auth_manager, &user);
    let app = build_router(resources);

    let session: HikeSession = AxumTestRequest::post("/api/sessions")
        .auth(&token)
        .json(&json!({ "trail_id": trail.id }))
        .send(app.clone())
        .await
        .json();
    let uri = format!("/api/sessions/{}", session.id);

    for body in [
        json!({ "distance_covered_km": -1.0 }),
        json!({ "rating": 6 }),
        json!({ "current_latitude": -1.0 }),
        json!({ "current_latitude": 91.0, "current_longitude": 36.0 }),
    ] {
        AxumTestRequest::put(&uri)
            .auth(&token)
            .json(&body)
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_sessions_are_private_to_their_owner() {
    let (resources, _) = create_test_resources().await.unwrap();
    let owner = create_test_user(&resources.database, "jabali").await.unwrap();
    let other = create_test_user(&resources.database, "kamau").await.unwrap();
    let trail = create_test_trail(&resources.database, "Karura", "Nairobi", Difficulty::Easy, None)
        .await
        .unwrap();
    let app = build_router(resources.clone());

    let session: HikeSession = AxumTestRequest::post("/api/sessions")
        .auth(&bearer(&resources.auth_manager, &owner))
        .json(&json!({ "trail_id": trail.id }))
        .send(app.clone())
        .await
        .json();

    let other_token = bearer(&resources.auth_manager, &other);
    let uri = format!("/api/sessions/{}", session.id);
    AxumTestRequest::get(&uri)
        .auth(&other_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::delete(&uri)
        .auth(&other_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::get(&uri)
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rematch_links_once_ambiguity_is_resolved() {
    let (resources, _) = create_test_resources().await.unwrap();
    let database = &resources.database;
    let user = create_test_user(database, "lulu").await.unwrap();
    let admin = create_test_admin(database, "ranger").await.unwrap();
    let north = create_test_trail(database, "Ngong North", "Kajiado", Difficulty::Hard, Some((-1.38, 36.64)))
        .await
        .unwrap();
    let south = create_test_trail(database, "Ngong South", "Kajiado", Difficulty::Hard, Some((-1.39, 36.64)))
        .await
        .unwrap();
    let token = bearer(&resources.auth_manager, &user);
    let app = build_router(resources.clone());

    let imported: Value = AxumTestRequest::post("/api/wearable/import")
        .auth(&token)
        .json(&json!({
            "source": "gpx",
            "points": [{ "latitude": -1.385, "longitude": 36.642 }],
            "summary": { "distance_km": 7.0, "elevation_gain_m": 300.0, "duration_hours": 3.0 }
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(imported["match"]["outcome"], "ambiguous");
    assert_eq!(imported["match"]["candidates"], 2);
    let session_id = imported["session"]["id"].as_str().unwrap().to_owned();

    AxumTestRequest::delete(&format!("/api/trails/{}", south.id))
        .auth(&bearer(&resources.auth_manager, &admin))
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let match_uri = format!("/api/sessions/{session_id}/match");
    let rematched: Value = AxumTestRequest::post(&match_uri)
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(rematched["match"]["outcome"], "matched");
    assert_eq!(rematched["session"]["trail_id"], north.id.to_string());
    assert_eq!(rematched["session"]["trail_matched"], true);

    // The difficulty count moved in the same commit as the link
    let progress = database.achievements().list_user_progress(user.id).await.unwrap();
    let hard_core = progress
        .iter()
        .find(|entry| entry.achievement.name == "Hard Core")
        .unwrap();
    assert!((hard_core.progress - 1.0).abs() < f64::EPSILON);

    // Matching again keeps the existing link
    let again: Value = AxumTestRequest::post(&match_uri)
        .auth(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(again["match"]["trail_id"], north.id.to_string());
    assert!(again["unlocked"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_trail_link_rolls_back_with_its_transaction() {
    let (resources, _) = create_test_resources().await.unwrap();
    let database = &resources.database;
    let user = create_test_user(database, "makena").await.unwrap();
    let token = bearer(&resources.auth_manager, &user);
    let app = build_router(resources.clone());

    let imported: Value = AxumTestRequest::post("/api/wearable/import")
        .auth(&token)
        .json(&json!({
            "source": "fit",
            "points": [{ "latitude": 0.5, "longitude": 35.3 }],
            "summary": { "distance_km": 4.0, "elevation_gain_m": 90.0, "duration_hours": 1.0 }
        }))
        .send(app)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(imported["match"]["outcome"], "no_candidates");
    let session_id: Uuid = imported["session"]["id"].as_str().unwrap().parse().unwrap();

    let trail = create_test_trail(database, "Kerio View", "Iten", Difficulty::Moderate, Some((0.5, 35.3)))
        .await
        .unwrap();

    let mut tx = database.pool().begin().await.unwrap();
    assert!(SessionManager::link_matched_trail(&mut tx, session_id, trail.id).await.unwrap());
    tx.rollback().await.unwrap();

    let session = database.sessions().get_user_session(user.id, session_id).await.unwrap();
    assert_eq!(session.trail_id, None);
    assert!(!session.trail_matched);
}

#[tokio::test]
async fn test_racing_completions_only_save_once() {
    let (resources, _) = create_test_resources().await.unwrap();
    let database = &resources.database;
    let user = create_test_user(database, "wambui").await.unwrap();
    let trail = create_test_trail(database, "Sagana Gorge", "Murang'a", Difficulty::Easy, None)
        .await
        .unwrap();
    let session = start_session(database, user.id, trail.id).await.unwrap();

    // Both requests read the session while it was still active
    let completion = SessionProgressUpdate {
        distance_covered_km: Some(3.0),
        completed: true,
        ..SessionProgressUpdate::default()
    };
    let mut first = session.clone();
    completion.apply_to(&mut first, Utc::now());
    let mut second = session;
    completion.apply_to(&mut second, Utc::now());

    let mut conn = database.pool().acquire().await.unwrap();
    SessionManager::save_progress(&mut conn, &first).await.unwrap();
    let error = SessionManager::save_progress(&mut conn, &second).await.unwrap_err();
    assert_eq!(error.http_status(), 409);

    let stored = database.sessions().get_user_session(user.id, first.id).await.unwrap();
    assert_eq!(stored.status, SessionStatus::Completed);
    assert_eq!(stored.ended_at.map(|t| t.timestamp()), first.ended_at.map(|t| t.timestamp()));
}

#[tokio::test]
async fn test_deleting_trail_clears_matched_flag() {
    let (resources, _) = create_test_resources().await.unwrap();
    let database = &resources.database;
    let user = create_test_user(database, "otieno").await.unwrap();
    let admin = create_test_admin(database, "warden").await.unwrap();
    let trail = create_test_trail(database, "Kit Mikayi", "Kisumu", Difficulty::Easy, Some((-0.07, 34.6)))
        .await
        .unwrap();
    let token = bearer(&resources.auth_manager, &user);
    let app = build_router(resources.clone());

    let imported: Value = AxumTestRequest::post("/api/wearable/import")
        .auth(&token)
        .json(&json!({
            "source": "tcx",
            "points": [{ "latitude": -0.071, "longitude": 34.601 }],
            "summary": { "distance_km": 2.5, "elevation_gain_m": 40.0, "duration_hours": 1.0 }
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(imported["session"]["trail_matched"], true);
    let session_uri = format!("/api/sessions/{}", imported["session"]["id"].as_str().unwrap());

    AxumTestRequest::delete(&format!("/api/trails/{}", trail.id))
        .auth(&bearer(&resources.auth_manager, &admin))
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let session: HikeSession = AxumTestRequest::get(&session_uri)
        .auth(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(session.trail_id, None);
    assert!(!session.trail_matched);
    assert_eq!(session.status, SessionStatus::Completed);
}
