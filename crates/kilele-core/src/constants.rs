// ABOUTME: Domain constants for trail matching, validation limits, and defaults
// ABOUTME: Single source for tunable numbers referenced across the workspace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

/// Trail proximity matching
pub mod matching {
    /// Default half-width of the start-point bounding box, in degrees (~5.5 km at the equator)
    pub const DEFAULT_RADIUS_DEG: f64 = 0.05;
    /// Upper bound accepted for a configured radius
    pub const MAX_RADIUS_DEG: f64 = 1.0;
}

/// Geographic coordinate bounds
pub mod geo {
    /// Minimum valid latitude
    pub const MIN_LATITUDE: f64 = -90.0;
    /// Maximum valid latitude
    pub const MAX_LATITUDE: f64 = 90.0;
    /// Minimum valid longitude
    pub const MIN_LONGITUDE: f64 = -180.0;
    /// Maximum valid longitude
    pub const MAX_LONGITUDE: f64 = 180.0;
}

/// Input validation limits
pub mod limits {
    /// Lowest review / session rating
    pub const MIN_RATING: i64 = 1;
    /// Highest review / session rating
    pub const MAX_RATING: i64 = 5;
    /// Minimum password length at registration
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Maximum characters kept in session notes
    pub const MAX_NOTES_LENGTH: usize = 500;
    /// Default page size for list endpoints
    pub const DEFAULT_PAGE_SIZE: i64 = 50;
    /// Maximum page size for list endpoints
    pub const MAX_PAGE_SIZE: i64 = 200;
}

/// Unit conversions
pub mod units {
    /// Metres per kilometre
    pub const METERS_PER_KM: f64 = 1000.0;
    /// Seconds per hour
    pub const SECONDS_PER_HOUR: f64 = 3600.0;
}

/// Strava integration
pub mod strava {
    /// Default Strava REST API base
    pub const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";
    /// Activity types imported as hiking sessions
    pub const IMPORTED_ACTIVITY_TYPES: &[&str] = &["Hike", "Walk", "TrailRun", "Run"];
    /// Page size requested from the activities endpoint
    pub const ACTIVITIES_PER_PAGE: u32 = 100;
    /// Default sync period in seconds
    pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 3600;
    /// Default look-back window for a sync run
    pub const DEFAULT_SYNC_LOOKBACK_DAYS: i64 = 7;
}

/// Service identity used in logs
pub mod service_names {
    /// Server service name
    pub const KILELE_SERVER: &str = "kilele-server";
}
