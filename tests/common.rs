// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides an in-memory database, server resources, users, tokens, and trails
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `kilele_server`

use std::env;
use std::sync::{Arc, Mutex, Once};

use anyhow::Result;
use async_trait::async_trait;
use kilele_intelligence::SEED_ACHIEVEMENTS;
use kilele_server::{
    auth::AuthManager,
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    models::{Difficulty, Trail, TrailInput, UnlockedAchievement, User},
    notifications::AchievementNotifier,
    resources::ServerResources,
};
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// In-memory database with the achievement catalog seeded
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    let database = Database::new(&DatabaseUrl::Memory).await?;
    database
        .achievements()
        .seed_catalog(SEED_ACHIEVEMENTS)
        .await?;
    Ok(database)
}

/// Notifier that remembers every delivery
#[derive(Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<(Uuid, Vec<String>)>>,
}

impl RecordingNotifier {
    /// Names delivered for `user_id`, in delivery order
    pub fn names_for(&self, user_id: Uuid) -> Vec<String> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == user_id)
            .flat_map(|(_, names)| names.clone())
            .collect()
    }

    /// Number of notifier calls
    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }
}

#[async_trait]
impl AchievementNotifier for RecordingNotifier {
    async fn achievements_unlocked(&self, user_id: Uuid, unlocked: &[UnlockedAchievement]) {
        let names = unlocked.iter().map(|a| a.name.clone()).collect();
        self.deliveries.lock().unwrap().push((user_id, names));
    }
}

/// Test server configuration: in-memory database, cheap bcrypt
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.database = DatabaseUrl::Memory;
    config.auth.jwt_secret = "kilele-test-secret-kilele-test-secret".to_owned();
    config.auth.bcrypt_cost = 4;
    config
}

/// Resources over a fresh database plus the notifier they report to
pub async fn create_test_resources() -> Result<(Arc<ServerResources>, Arc<RecordingNotifier>)> {
    let database = create_test_database().await?;
    let notifier = Arc::new(RecordingNotifier::default());
    let resources =
        ServerResources::new(database, Arc::new(test_config()))?.with_notifier(notifier.clone());
    Ok((Arc::new(resources), notifier))
}

/// Create a user directly in the database
pub async fn create_test_user(database: &Database, username: &str) -> Result<User> {
    let user = User::new(
        username.to_owned(),
        format!("{username}@example.com"),
        "not-a-real-hash".to_owned(),
        None,
    );
    database.users().create_user(&user).await?;
    Ok(user)
}

/// Create an admin user directly in the database
pub async fn create_test_admin(database: &Database, username: &str) -> Result<User> {
    let user = create_test_user(database, username).await?;
    Ok(database.users().promote_to_admin(&user.email).await?)
}

/// `Authorization` header value for `user`
pub fn bearer(auth_manager: &AuthManager, user: &User) -> String {
    format!("Bearer {}", auth_manager.generate_token(user).unwrap())
}

/// Trail input with sensible defaults
pub fn trail_input(
    name: &str,
    location: &str,
    difficulty: Difficulty,
    trailhead: Option<(f64, f64)>,
) -> TrailInput {
    TrailInput {
        name: name.to_owned(),
        location: location.to_owned(),
        difficulty,
        distance_km: 8.0,
        elevation_gain_m: Some(400.0),
        duration_hours: 3.0,
        description: None,
        latitude: trailhead.map(|(lat, _)| lat),
        longitude: trailhead.map(|(_, lon)| lon),
    }
}

/// Create a trail at `trailhead`
pub async fn create_test_trail(
    database: &Database,
    name: &str,
    location: &str,
    difficulty: Difficulty,
    trailhead: Option<(f64, f64)>,
) -> Result<Trail> {
    Ok(database
        .trails()
        .create_trail(&trail_input(name, location, difficulty, trailhead))
        .await?)
}
