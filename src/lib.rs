// ABOUTME: Main library entry point for the Kilele trail activity server
// ABOUTME: Trail matching, hike sessions, wearable and Strava imports, achievements, and goals over REST
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

#![deny(unsafe_code)]

//! # Kilele Server
//!
//! Backend for a trail hiking app. Hikes are recorded as sessions, either
//! tracked live, uploaded from a wearable, or pulled from Strava. Sessions
//! without an explicit trail are linked to the nearest trailhead inside a
//! search box around their first point. Lifetime statistics are recomputed
//! from sessions, and achievements and goals are evaluated against them.
//!
//! ## Architecture
//!
//! - **`kilele-core`**: errors, domain models, constants
//! - **`kilele-intelligence`**: pure matching, aggregation, achievement, and goal rules
//! - **Database**: `SQLite` managers, one per table family
//! - **Services**: units of work that combine managers inside transactions
//! - **Routes**: thin `axum` handlers over the services
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use kilele_server::config::ServerConfig;
//! use kilele_server::database::Database;
//! use kilele_server::errors::AppResult;
//! use kilele_server::resources::ServerResources;
//! use kilele_server::routes::build_router;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = Arc::new(ServerConfig::from_env()?);
//!     let database = Database::new(&config.database).await?;
//!     let resources = Arc::new(ServerResources::new(database, config)?);
//!     let _router = build_router(resources);
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by binary crates (src/bin/) and integration tests (tests/).

/// `JWT` authentication and password hashing
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Application constants
pub mod constants;

/// `SQLite` persistence
pub mod database;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Domain models
pub mod models;

/// Achievement unlock notifications
pub mod notifications;

/// External activity providers
pub mod providers;

/// Shared server resources
pub mod resources;

/// `HTTP` routes
pub mod routes;

/// Units of work combining database managers
pub mod services;

/// Background Strava sync job
pub mod sync;
