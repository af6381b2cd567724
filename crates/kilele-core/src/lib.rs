// ABOUTME: Core types and constants for the Kilele hiking platform
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

#![deny(unsafe_code)]

//! # Kilele Core
//!
//! Foundation crate providing shared types for the Kilele trail discovery and
//! tracking platform. It carries no I/O so both the algorithms crate and the
//! server can depend on it.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Matching radius, coordinate bounds, and validation limits
//! - **models**: Trails, sessions, achievements, goals, and social records

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models
pub mod models;
