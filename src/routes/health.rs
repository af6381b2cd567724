// ABOUTME: Health check route handlers for service monitoring
// ABOUTME: Liveness reports the process is up; readiness also pings the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_health() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339()
        }))
    }

    async fn handle_ready(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Json<Value>, AppError> {
        resources.database.ping().await?;
        Ok(Json(json!({
            "status": "ready",
            "timestamp": Utc::now().to_rfc3339()
        })))
    }
}
