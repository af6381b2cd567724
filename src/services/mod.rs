// ABOUTME: Domain service layer orchestrating storage, algorithms, and notifications
// ABOUTME: Multi-row writes run in one transaction; notifications fire only after commit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! Domain service layer
//!
//! Route handlers and background jobs call these functions instead of the
//! managers directly so that business rules hold regardless of the entry
//! point.

/// Achievement evaluation unit of work and progress statistics
pub mod achievements;

/// Goal creation and progress updates
pub mod goals;

/// Normalized track import from wearable files
pub mod imports;

/// Trail proximity matching against stored trails
pub mod matching;

/// Manual session tracking lifecycle
pub mod sessions;

/// Strava activity import
pub mod strava_sync;
