// ABOUTME: Integration tests for environment-driven configuration and file-backed storage
// ABOUTME: Environment mutations run serially; file databases live in temporary directories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::env;

use common::create_test_user;
use kilele_intelligence::SEED_ACHIEVEMENTS;
use kilele_server::config::{DatabaseUrl, Environment, ServerConfig};
use kilele_server::database::Database;
use serial_test::serial;
use tempfile::TempDir;

const VARS: &[&str] = &[
    "ENVIRONMENT",
    "HTTP_PORT",
    "DATABASE_URL",
    "TRAIL_MATCH_RADIUS_DEG",
    "JWT_SECRET",
    "BCRYPT_COST",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_environment_overrides_defaults() {
    clear_env();
    env::set_var("HTTP_PORT", "9123");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("TRAIL_MATCH_RADIUS_DEG", "0.02");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.http_port, 9123);
    assert_eq!(config.database, DatabaseUrl::Memory);
    assert!((config.matching.radius_deg - 0.02).abs() < f64::EPSILON);
    assert_eq!(config.environment, Environment::Development);
    clear_env();
}

#[test]
#[serial]
fn test_invalid_values_are_config_errors() {
    clear_env();
    env::set_var("HTTP_PORT", "eighty");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("TRAIL_MATCH_RADIUS_DEG", "-1");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("BCRYPT_COST", "40");
    assert!(ServerConfig::from_env().is_err());
    clear_env();
}

#[test]
#[serial]
fn test_production_requires_strong_jwt_secret() {
    clear_env();
    env::set_var("ENVIRONMENT", "production");
    assert!(ServerConfig::from_env().is_err());

    env::set_var("JWT_SECRET", "short");
    assert!(ServerConfig::from_env().is_err());

    env::set_var("JWT_SECRET", "a-production-secret-that-is-long-enough");
    let config = ServerConfig::from_env().unwrap();
    assert!(config.environment.is_production());
    clear_env();
}

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let url = DatabaseUrl::SQLite {
        path: dir.path().join("nested").join("kilele.db"),
    };

    let database = Database::new(&url).await.unwrap();
    let seeded = database
        .achievements()
        .seed_catalog(SEED_ACHIEVEMENTS)
        .await
        .unwrap();
    assert_eq!(seeded, SEED_ACHIEVEMENTS.len());
    let user = create_test_user(&database, "persisted").await.unwrap();
    drop(database);

    let reopened = Database::new(&url).await.unwrap();
    // Seeding is keyed by name, so a second run inserts nothing
    let reseeded = reopened
        .achievements()
        .seed_catalog(SEED_ACHIEVEMENTS)
        .await
        .unwrap();
    assert_eq!(reseeded, 0);
    assert!(reopened.users().exists(user.id).await.unwrap());
}
