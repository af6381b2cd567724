// ABOUTME: Error types for the Kilele server, shared with the core crate
// ABOUTME: Re-exports AppError, ErrorCode, and AppResult so handlers use one error type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! Unified error handling
//!
//! All library operations return [`AppResult`]. Handlers return `AppError`
//! directly; its `IntoResponse` impl renders `{"error": {"code", "message"}}`
//! with the status mapped from the [`ErrorCode`].

pub use kilele_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails};
