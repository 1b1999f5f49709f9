// ABOUTME: Core types and constants for the Tri Planner decision engine
// ABOUTME: Foundation crate with error handling, constants, and schema-validated domain models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Tri Planner Core
//!
//! Foundation crate providing the shared data model for the triathlon
//! methodology engine. It holds no decision logic: the validator, fragility
//! calculator, planner and sensitivity analyzer live in
//! `tri-planner-intelligence` and consume these types.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `SchemaError`
//! - **constants**: Schema bounds and default algorithm constants organized by domain
//! - **models**: Profile, methodology, trace, fragility and plan types

/// Unified error handling system with standard error codes
pub mod errors;

/// Schema bounds and default algorithm constants organized by domain
pub mod constants;

/// Core data models (`UserProfile`, `MethodologyConfig`, `TrainingPlan`, etc.)
pub mod models;
