// ABOUTME: Main library entry point for the Tri Planner triathlon methodology engine
// ABOUTME: Document loading, environment configuration, logging, persistence and the end-to-end pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Tri Planner
//!
//! Decides whether a training methodology may be applied to a triathlete,
//! scores how fragile the athlete currently is, and builds a periodized plan
//! when it is safe to do so. Every decision is recorded in a reasoning trace.
//!
//! ## Architecture
//!
//! - **`tri_planner_core`**: data model, schema validation and error taxonomy
//! - **`tri_planner_intelligence`**: validator, fragility calculator, planner,
//!   sensitivity analyzer and trace rendering; no I/O
//! - **this crate**: JSON/YAML loading, environment configuration, logging,
//!   trace and plan files, and the [`pipeline::Pipeline`] that chains the stages
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tri_planner::config::load_profile;
//! use tri_planner::pipeline::Pipeline;
//! use tri_planner_core::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let pipeline = Pipeline::from_path(Path::new("methodologies/methodology_polarized.json"))?;
//!     let profile = load_profile(Path::new("athlete.json"))?;
//!     let outcome = pipeline.evaluate(&profile)?;
//!     println!("{}", pipeline.validator().summary_report(&outcome.validation));
//!     Ok(())
//! }
//! ```

/// Outer-layer configuration and document loading
pub mod config;

/// Service identity, environment variable names and default paths
pub mod constants;

/// Structured logging setup
pub mod logging;

/// Trace and plan files
pub mod persistence;

/// Validate, score and plan in one call
pub mod pipeline;
