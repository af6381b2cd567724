// ABOUTME: Manual hike session route handlers
// ABOUTME: Start, list, fetch, update progress, delete, view routes, and re-run trail matching
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{authenticate, parse_id};
use crate::errors::AppError;
use crate::models::{SessionProgressUpdate, SessionStatus};
use crate::resources::ServerResources;
use crate::services::sessions;

/// Body of a start-session request
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Trail being hiked
    pub trail_id: Uuid,
}

/// Query parameters for listing sessions
#[derive(Debug, Default, Deserialize)]
pub struct SessionListQuery {
    /// Restrict to one status
    #[serde(default)]
    pub status: Option<SessionStatus>,
}

/// Session routes
pub struct SessionRoutes;

impl SessionRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/sessions",
                get(Self::handle_list).post(Self::handle_start),
            )
            .route(
                "/api/sessions/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/sessions/:id/route", get(Self::handle_route))
            .route("/api/sessions/:id/match", post(Self::handle_match))
            .with_state(resources)
    }

    /// Handle POST /api/sessions
    async fn handle_start(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<StartSessionRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let session =
            sessions::start_session(&resources.database, auth.user_id, request.trail_id).await?;
        Ok((StatusCode::CREATED, Json(session)).into_response())
    }

    /// Handle GET /api/sessions
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<SessionListQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let sessions = resources
            .database
            .sessions()
            .list_sessions(auth.user_id, query.status)
            .await?;
        Ok((StatusCode::OK, Json(sessions)).into_response())
    }

    /// Handle GET /api/sessions/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let session_id = parse_id(&id, "session")?;
        let session = resources
            .database
            .sessions()
            .get_user_session(auth.user_id, session_id)
            .await?;
        Ok((StatusCode::OK, Json(session)).into_response())
    }

    /// Handle GET /api/sessions/:id/route
    async fn handle_route(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let session_id = parse_id(&id, "session")?;
        let sessions = resources.database.sessions();
        // ownership check before exposing points
        sessions.get_user_session(auth.user_id, session_id).await?;
        let points = sessions.get_route(session_id).await?;
        Ok((StatusCode::OK, Json(points)).into_response())
    }

    /// Handle PUT /api/sessions/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(update): Json<SessionProgressUpdate>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let session_id = parse_id(&id, "session")?;
        let result = sessions::update_session(
            &resources.database,
            resources.notifier.as_ref(),
            auth.user_id,
            session_id,
            &update,
        )
        .await?;
        Ok((StatusCode::OK, Json(result)).into_response())
    }

    /// Handle DELETE /api/sessions/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let session_id = parse_id(&id, "session")?;
        if !resources
            .database
            .sessions()
            .delete_session(auth.user_id, session_id)
            .await?
        {
            return Err(AppError::not_found(format!("Session {session_id}")));
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/sessions/:id/match
    async fn handle_match(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let session_id = parse_id(&id, "session")?;
        let result = sessions::rematch_session(
            &resources.database,
            &resources.matcher,
            resources.notifier.as_ref(),
            auth.user_id,
            session_id,
        )
        .await?;
        Ok((StatusCode::OK, Json(result)).into_response())
    }
}
