// ABOUTME: HTTP route organization and router assembly for the Kilele server
// ABOUTME: Each domain module exposes XRoutes::routes; this module merges them and adds tracing and CORS
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! Route module for the Kilele server
//!
//! Each domain module contains route definitions and thin handlers that
//! authenticate the caller and delegate to the service layer.

/// Achievement catalog, user progress, and statistics routes
pub mod achievements;
/// Registration, login, and profile routes
pub mod auth;
/// Goal routes
pub mod goals;
/// Health and readiness routes
pub mod health;
/// Manual session tracking routes
pub mod sessions;
/// Reviews, bookmarks, and follow routes
pub mod social;
/// Strava connection and sync routes
pub mod strava;
/// Trail reference data routes
pub mod trails;
/// Wearable track import routes
pub mod wearable;

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;

pub use achievements::AchievementRoutes;
pub use auth::AuthRoutes;
pub use goals::GoalRoutes;
pub use health::HealthRoutes;
pub use sessions::SessionRoutes;
pub use social::SocialRoutes;
pub use strava::StravaRoutes;
pub use trails::TrailRoutes;
pub use wearable::WearableRoutes;

use crate::auth::AuthResult;
use crate::config::SecurityConfig;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;

/// Build the complete application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = cors_layer(&resources.config.security);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(TrailRoutes::routes(resources.clone()))
        .merge(SessionRoutes::routes(resources.clone()))
        .merge(WearableRoutes::routes(resources.clone()))
        .merge(AchievementRoutes::routes(resources.clone()))
        .merge(GoalRoutes::routes(resources.clone()))
        .merge(SocialRoutes::routes(resources.clone()))
        .merge(StravaRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if security.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| warn!(%origin, error = %e, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Authenticate the caller from the `Authorization` header
pub(crate) fn authenticate(
    headers: &HeaderMap,
    resources: &ServerResources,
) -> AppResult<AuthResult> {
    resources.auth_manager.authenticate(headers)
}

/// Parse a path id
pub(crate) fn parse_id(value: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| AppError::invalid_input(format!("Invalid {what} ID format")))
}
