// ABOUTME: Runs the trail proximity matcher against trails loaded from storage
// ABOUTME: Only trails inside the search box are fetched
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use kilele_intelligence::{TrailMatch, TrailMatcher};
use tracing::debug;

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::Coordinate;

/// Match a track start against stored trails
///
/// # Errors
///
/// Returns an error if the trail query fails
pub async fn match_trail(
    database: &Database,
    matcher: &TrailMatcher,
    start: Option<Coordinate>,
) -> AppResult<TrailMatch> {
    let Some(search_box) = start.and_then(|point| matcher.search_box(point)) else {
        return Ok(TrailMatch::InvalidStart);
    };

    let candidates = database.trails().trails_in_box(&search_box).await?;
    let outcome = matcher.match_start(start, &candidates);
    debug!(candidates = candidates.len(), ?outcome, "Trail match evaluated");
    Ok(outcome)
}
