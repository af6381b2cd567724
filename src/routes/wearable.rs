// ABOUTME: Wearable track import route handlers
// ABOUTME: Accepts parsed GPX/FIT/TCX tracks and lists the formats the importer understands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::authenticate;
use crate::errors::AppError;
use crate::models::TrackSource;
use crate::resources::ServerResources;
use crate::services::imports::{self, TrackImport, MAX_TRACK_POINTS};

/// Formats accepted by the import endpoint
#[derive(Debug, Serialize)]
pub struct SupportedFormats {
    /// Accepted `source` values
    pub formats: Vec<TrackSource>,
    /// Largest accepted track
    pub max_points: usize,
}

/// Wearable import routes
pub struct WearableRoutes;

impl WearableRoutes {
    /// Create all wearable routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/wearable/import", post(Self::handle_import))
            .route(
                "/api/wearable/supported-formats",
                get(Self::handle_supported_formats),
            )
            .with_state(resources)
    }

    /// Handle POST /api/wearable/import
    async fn handle_import(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<TrackImport>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let result = imports::import_track(
            &resources.database,
            &resources.matcher,
            resources.notifier.as_ref(),
            auth.user_id,
            &request,
        )
        .await?;
        Ok((StatusCode::CREATED, Json(result)).into_response())
    }

    /// Handle GET /api/wearable/supported-formats
    async fn handle_supported_formats() -> Response {
        let formats = SupportedFormats {
            formats: vec![TrackSource::Gpx, TrackSource::Fit, TrackSource::Tcx],
            max_points: MAX_TRACK_POINTS,
        };
        (StatusCode::OK, Json(formats)).into_response()
    }
}
