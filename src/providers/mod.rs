// ABOUTME: External activity sources feeding sessions into Kilele
// ABOUTME: Currently the Strava REST API behind the ActivityFeed trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

/// Strava activity client
pub mod strava;

pub use strava::{ActivityFeed, StravaActivity, StravaClient};
