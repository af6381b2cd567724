// ABOUTME: Strava connection management and on-demand sync route handlers
// ABOUTME: Stores the caller's access token and imports their recent activities immediately
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::authenticate;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::strava_sync::{self, SyncContext};

/// Body of a connect request
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    /// Strava API access token
    pub access_token: String,
    /// Strava athlete id, when known
    #[serde(default)]
    pub athlete_id: Option<String>,
}

/// Strava routes
pub struct StravaRoutes;

impl StravaRoutes {
    /// Create all Strava routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/strava/connection",
                put(Self::handle_connect)
                    .get(Self::handle_get)
                    .delete(Self::handle_disconnect),
            )
            .route("/api/strava/sync", post(Self::handle_sync))
            .with_state(resources)
    }

    /// Handle PUT /api/strava/connection
    async fn handle_connect(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<ConnectRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let token = request.access_token.trim();
        if token.is_empty() {
            return Err(AppError::invalid_input("access_token is required"));
        }

        let connection = resources
            .database
            .strava()
            .upsert_connection(auth.user_id, token, request.athlete_id.as_deref())
            .await?;
        info!(user_id = %auth.user_id, "Strava connection stored");
        Ok((StatusCode::OK, Json(connection)).into_response())
    }

    /// Handle GET /api/strava/connection
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let connection = resources
            .database
            .strava()
            .get_connection(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Strava connection"))?;
        Ok((StatusCode::OK, Json(connection)).into_response())
    }

    /// Handle DELETE /api/strava/connection
    async fn handle_disconnect(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        if !resources
            .database
            .strava()
            .delete_connection(auth.user_id)
            .await?
        {
            return Err(AppError::not_found("Strava connection"));
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/strava/sync
    async fn handle_sync(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let connection = resources
            .database
            .strava()
            .get_connection(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Strava connection"))?;

        let context = SyncContext {
            database: &resources.database,
            matcher: &resources.matcher,
            notifier: resources.notifier.as_ref(),
            feed: resources.activity_feed.as_ref(),
            lookback_days: resources.config.strava.sync_lookback_days,
        };
        let outcome = strava_sync::sync_user(&context, &connection).await?;
        Ok((StatusCode::OK, Json(outcome)).into_response())
    }
}
