// ABOUTME: Domain models for trails, sessions, achievements, goals, and social records
// ABOUTME: Re-exported from kilele-core so storage and routes share one definition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

pub use kilele_core::models::*;
