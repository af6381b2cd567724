// ABOUTME: Trail reference data route handlers
// ABOUTME: Listing and lookup are open to any caller; create, update, and delete require an admin token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use super::{authenticate, parse_id};
use crate::database::TrailFilter;
use crate::errors::AppError;
use crate::models::{Trail, TrailInput};
use crate::resources::ServerResources;

/// Page of trails
#[derive(Debug, Serialize)]
pub struct TrailListResponse {
    /// Trails on this page
    pub trails: Vec<Trail>,
    /// Number of trails on this page
    pub count: usize,
    /// Page size used
    pub limit: i64,
    /// Offset used
    pub offset: i64,
}

/// Trail routes
pub struct TrailRoutes;

impl TrailRoutes {
    /// Create all trail routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/trails",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/trails/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/trails
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(filter): Query<TrailFilter>,
    ) -> Result<Response, AppError> {
        let (limit, offset) = filter.page();
        let trails = resources.database.trails().list_trails(&filter).await?;
        let response = TrailListResponse {
            count: trails.len(),
            trails,
            limit,
            offset,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/trails/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let trail_id = parse_id(&id, "trail")?;
        let trail = resources.database.trails().require_trail(trail_id).await?;
        Ok((StatusCode::OK, Json(trail)).into_response())
    }

    /// Handle POST /api/trails
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(input): Json<TrailInput>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        auth.require_admin()?;

        let trail = resources.database.trails().create_trail(&input).await?;
        info!(trail_id = %trail.id, name = %trail.name, admin = %auth.user_id, "Trail created");
        Ok((StatusCode::CREATED, Json(trail)).into_response())
    }

    /// Handle PUT /api/trails/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(input): Json<TrailInput>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        auth.require_admin()?;
        let trail_id = parse_id(&id, "trail")?;

        let trail = resources
            .database
            .trails()
            .update_trail(trail_id, &input)
            .await?;
        Ok((StatusCode::OK, Json(trail)).into_response())
    }

    /// Handle DELETE /api/trails/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        auth.require_admin()?;
        let trail_id = parse_id(&id, "trail")?;

        if !resources.database.trails().delete_trail(trail_id).await? {
            return Err(AppError::not_found(format!("Trail {trail_id}")));
        }
        info!(%trail_id, admin = %auth.user_id, "Trail deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
