// ABOUTME: Integration tests for Strava activity import through a scripted activity feed
// ABOUTME: Covers matching, type filtering, idempotent re-sync, per-user failure isolation, and routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;
mod helpers;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use common::{
    bearer, create_test_database, create_test_trail, create_test_user, test_config,
    RecordingNotifier,
};
use helpers::axum_test::AxumTestRequest;
use kilele_server::errors::{AppError, AppResult};
use kilele_server::models::{Difficulty, TrackSource};
use kilele_server::providers::{ActivityFeed, StravaActivity};
use kilele_server::resources::ServerResources;
use kilele_server::routes::build_router;
use kilele_server::sync::StravaSyncJob;
use serde_json::{json, Value};

/// Feed answering per access token; unknown tokens fail like a revoked grant
#[derive(Default)]
struct ScriptedFeed {
    activities: Mutex<HashMap<String, Vec<StravaActivity>>>,
}

impl ScriptedFeed {
    fn set(&self, token: &str, activities: Vec<StravaActivity>) {
        self.activities
            .lock()
            .unwrap()
            .insert(token.to_owned(), activities);
    }
}

#[async_trait]
impl ActivityFeed for ScriptedFeed {
    async fn recent_activities(
        &self,
        access_token: &str,
        _after: DateTime<Utc>,
    ) -> AppResult<Vec<StravaActivity>> {
        self.activities
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(|| AppError::external_service("Strava", "401 Authorization Error"))
    }
}

fn activity(id: u64, kind: &str, distance_m: f64, start: Option<(f64, f64)>) -> StravaActivity {
    StravaActivity {
        id,
        name: Some(format!("Activity {id}")),
        activity_type: kind.to_owned(),
        start_date: Utc::now() - Duration::days(1),
        distance: Some(distance_m),
        moving_time: Some(7_200),
        elapsed_time: Some(8_000),
        total_elevation_gain: Some(350.0),
        start_latlng: start.map(|(lat, lon)| vec![lat, lon]),
    }
}

async fn resources_with_feed() -> (Arc<ServerResources>, Arc<ScriptedFeed>) {
    let database = create_test_database().await.unwrap();
    let feed = Arc::new(ScriptedFeed::default());
    let resources = ServerResources::new(database, Arc::new(test_config()))
        .unwrap()
        .with_notifier(Arc::new(RecordingNotifier::default()))
        .with_activity_feed(feed.clone());
    (Arc::new(resources), feed)
}

#[tokio::test]
async fn test_batch_imports_matches_and_skips() {
    let (resources, feed) = resources_with_feed().await;
    let database = &resources.database;
    let trail = create_test_trail(
        database,
        "Karura Forest Loop",
        "Nairobi",
        Difficulty::Easy,
        Some((-1.2418, 36.8330)),
    )
    .await
    .unwrap();
    let user = create_test_user(database, "wekesa").await.unwrap();
    database
        .strava()
        .upsert_connection(user.id, "token-wekesa", Some("4242"))
        .await
        .unwrap();

    feed.set(
        "token-wekesa",
        vec![
            activity(1, "Hike", 6_500.0, Some((-1.24, 36.835))),
            activity(2, "Trail Run", 12_000.0, None),
            activity(3, "Ride", 40_000.0, Some((-1.24, 36.835))),
        ],
    );

    let report = StravaSyncJob::new(resources.clone()).run_once().await.unwrap();
    assert_eq!(report.users_processed, 1);
    assert_eq!(report.users_failed, 0);
    assert_eq!(report.activities_imported, 2);
    assert_eq!(report.activities_matched, 1);

    let sessions = database.sessions().list_sessions(user.id, None).await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(sessions.iter().all(|s| s.source == TrackSource::Strava));
    let hike = sessions
        .iter()
        .find(|s| s.external_id.as_deref() == Some("1"))
        .unwrap();
    assert_eq!(hike.trail_id, Some(trail.id));
    assert!(hike.trail_matched);
    assert!((hike.distance_covered_km - 6.5).abs() < 1e-9);

    let connection = database.strava().get_connection(user.id).await.unwrap().unwrap();
    assert!(connection.last_synced_at.is_some());

    // 18.5 km in total
    let earned: Vec<String> = database
        .achievements()
        .list_user_progress(user.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.completed)
        .map(|p| p.achievement.name)
        .collect();
    assert!(earned.contains(&"First Steps".to_owned()));
    assert!(earned.contains(&"10K Walker".to_owned()));
}

#[tokio::test]
async fn test_resync_refreshes_instead_of_duplicating() {
    let (resources, feed) = resources_with_feed().await;
    let database = &resources.database;
    let user = create_test_user(database, "atieno").await.unwrap();
    database
        .strava()
        .upsert_connection(user.id, "token-atieno", None)
        .await
        .unwrap();

    feed.set("token-atieno", vec![activity(77, "Walk", 3_000.0, None)]);
    let job = StravaSyncJob::new(resources.clone());
    job.run_once().await.unwrap();

    feed.set("token-atieno", vec![activity(77, "Walk", 4_200.0, None)]);
    job.run_once().await.unwrap();

    let sessions = database.sessions().list_sessions(user.id, None).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert!((sessions[0].distance_covered_km - 4.2).abs() < 1e-9);
}

#[tokio::test]
async fn test_one_failing_user_does_not_stop_the_batch() {
    let (resources, feed) = resources_with_feed().await;
    let database = &resources.database;
    let healthy = create_test_user(database, "korir").await.unwrap();
    let revoked = create_test_user(database, "moraa").await.unwrap();
    database
        .strava()
        .upsert_connection(healthy.id, "token-korir", None)
        .await
        .unwrap();
    database
        .strava()
        .upsert_connection(revoked.id, "token-revoked", None)
        .await
        .unwrap();
    feed.set("token-korir", vec![activity(5, "Hike", 8_000.0, None)]);

    let report = StravaSyncJob::new(resources.clone()).run_once().await.unwrap();
    assert_eq!(report.users_processed, 1);
    assert_eq!(report.users_failed, 1);
    assert_eq!(report.activities_imported, 1);

    assert_eq!(
        database
            .sessions()
            .list_sessions(healthy.id, None)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(database
        .sessions()
        .list_sessions(revoked.id, None)
        .await
        .unwrap()
        .is_empty());
    let revoked_connection = database
        .strava()
        .get_connection(revoked.id)
        .await
        .unwrap()
        .unwrap();
    assert!(revoked_connection.last_synced_at.is_none());
}

#[tokio::test]
async fn test_connection_routes() {
    let (resources, feed) = resources_with_feed().await;
    let user = create_test_user(&resources.database, "mutua").await.unwrap();
    let token = bearer(&resources.auth_manager, &user);
    let app = build_router(resources);

    AxumTestRequest::post("/api/strava/sync")
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::put("/api/strava/connection")
        .auth(&token)
        .json(&json!({"access_token": "  "}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::put("/api/strava/connection")
        .auth(&token)
        .json(&json!({"access_token": "token-mutua", "athlete_id": "99"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    feed.set("token-mutua", vec![activity(9, "Hike", 2_000.0, None)]);
    let outcome: Value = AxumTestRequest::post("/api/strava/sync")
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(outcome["imported"], 1);
    assert_eq!(outcome["unlocked"][0]["name"], "First Steps");

    AxumTestRequest::delete("/api/strava/connection")
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    AxumTestRequest::get("/api/strava/connection")
        .auth(&token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
