// ABOUTME: Configuration management for the Kilele server
// ABOUTME: Environment-driven settings for HTTP, database, auth, matching, and Strava sync
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! Configuration module
//!
//! All settings come from environment variables with defaults suited to local
//! development. [`ServerConfig::from_env`] is the single entry point.

/// Database connection configuration
pub mod database;
/// Top-level server configuration
pub mod environment;
/// Authentication and CORS settings
pub mod security;
/// Strava client and sync job settings
pub mod strava;

pub use database::DatabaseUrl;
pub use environment::{Environment, ServerConfig};
pub use security::{AuthConfig, SecurityConfig};
pub use strava::StravaConfig;
