// ABOUTME: Application constants for matching, validation limits, and the Strava integration
// ABOUTME: Re-exported from kilele-core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

pub use kilele_core::constants::*;
