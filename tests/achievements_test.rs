// ABOUTME: Integration tests for progress aggregation and achievement evaluation
// ABOUTME: Checks unlock thresholds, statistics, points, idempotent re-evaluation, and monotonicity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;
mod helpers;

use std::collections::HashSet;

use axum::http::StatusCode;
use common::{bearer, create_test_resources, create_test_trail, create_test_user};
use helpers::axum_test::AxumTestRequest;
use kilele_server::models::{Difficulty, NormalizedTrack, TrackSource, TrackSummary, User};
use kilele_server::resources::ServerResources;
use kilele_server::routes::build_router;
use kilele_server::services::achievements::{evaluate_for_user, progress_stats};
use kilele_server::services::imports::{import_track, TrackImport};
use serde_json::Value;

const LOCATIONS: [&str; 5] = ["Nairobi", "Naivasha", "Nanyuki", "Kajiado", "Machakos"];

/// Import one completed easy hike per location, each on its own trail
async fn hike_five_locations(resources: &ServerResources, user: &User) -> HashSet<String> {
    let mut unlocked = HashSet::new();
    for (index, location) in LOCATIONS.iter().enumerate() {
        let trail = create_test_trail(
            &resources.database,
            &format!("{location} Loop"),
            location,
            Difficulty::Easy,
            None,
        )
        .await
        .unwrap();

        let request = TrackImport {
            track: NormalizedTrack {
                source: TrackSource::Fit,
                name: Some(format!("Hike {index}")),
                points: Vec::new(),
                summary: TrackSummary {
                    distance_km: 1.5,
                    elevation_gain_m: 50.0,
                    duration_hours: 1.0,
                },
            },
            trail_id: Some(trail.id),
        };
        let result = import_track(
            &resources.database,
            &resources.matcher,
            resources.notifier.as_ref(),
            user.id,
            &request,
        )
        .await
        .unwrap();
        unlocked.extend(result.unlocked.into_iter().map(|a| a.name));
    }
    unlocked
}

#[tokio::test]
async fn test_thresholds_unlock_exactly_once() {
    let (resources, notifier) = create_test_resources().await.unwrap();
    let user = create_test_user(&resources.database, "mwangi").await.unwrap();

    let unlocked = hike_five_locations(&resources, &user).await;

    let expected: HashSet<String> = ["First Steps", "Trail Enthusiast", "Easy Does It", "Trail Scout"]
        .into_iter()
        .map(str::to_owned)
        .collect();
    assert_eq!(unlocked, expected);
    // 7.5 km and 250 m stay below the first distance and elevation tiers
    assert!(!unlocked.contains("10K Walker"));
    assert!(!unlocked.contains("Hill Climber"));
    assert_eq!(notifier.names_for(user.id).len(), 4);

    // Nothing new on a later run
    let again = evaluate_for_user(&resources.database, resources.notifier.as_ref(), user.id)
        .await
        .unwrap();
    assert!(again.is_empty());
    assert_eq!(notifier.names_for(user.id).len(), 4);
}

#[tokio::test]
async fn test_stats_and_points_reflect_sessions() {
    let (resources, _) = create_test_resources().await.unwrap();
    let user = create_test_user(&resources.database, "njeri").await.unwrap();
    hike_five_locations(&resources, &user).await;
    let token = bearer(&resources.auth_manager, &user);
    let app = build_router(resources.clone());

    let stats: Value = AxumTestRequest::get("/api/users/me/stats")
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(stats["completed_sessions"], 5);
    assert_eq!(stats["distinct_trails"], 5);
    assert_eq!(stats["distinct_locations"], 5);
    assert_eq!(stats["completed_by_difficulty"]["easy"], 5);
    assert!((stats["total_distance_km"].as_f64().unwrap() - 7.5).abs() < 1e-9);
    // First Steps 10 + Trail Enthusiast 25 + Easy Does It 20 + Trail Scout 40
    assert_eq!(stats["achievement_points"], 95);

    let mine: Value = AxumTestRequest::get("/api/achievements/me")
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(mine["completed"], 4);
    assert_eq!(mine["total_points"], 95);

    let catalog: Vec<Value> = AxumTestRequest::get("/api/achievements")
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(
        mine["achievements"].as_array().unwrap().len(),
        catalog.len()
    );
}

#[tokio::test]
async fn test_unlocks_survive_session_deletion() {
    let (resources, _) = create_test_resources().await.unwrap();
    let user = create_test_user(&resources.database, "otieno").await.unwrap();
    hike_five_locations(&resources, &user).await;

    let sessions = resources
        .database
        .sessions()
        .list_sessions(user.id, None)
        .await
        .unwrap();
    for session in &sessions {
        resources
            .database
            .sessions()
            .delete_session(user.id, session.id)
            .await
            .unwrap();
    }

    let stats = progress_stats(&resources.database, user.id).await.unwrap();
    assert_eq!(stats.completed_sessions, 0);

    let unlocked = evaluate_for_user(&resources.database, resources.notifier.as_ref(), user.id)
        .await
        .unwrap();
    assert!(unlocked.is_empty());

    let points = resources
        .database
        .achievements()
        .total_points(user.id)
        .await
        .unwrap();
    assert_eq!(points, 95);
}

#[tokio::test]
async fn test_explicit_evaluation_endpoint_requires_auth() {
    let (resources, _) = create_test_resources().await.unwrap();
    let app = build_router(resources);
    AxumTestRequest::post("/api/achievements/evaluate")
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
