// ABOUTME: Decision engine for the Tri Planner: validation, fragility, planning and sensitivity analysis
// ABOUTME: Pure synchronous stages over immutable methodology configuration and athlete profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Tri Planner Intelligence
//!
//! The engine runs as a chain of stages, each consuming the previous stage's
//! immutable output:
//!
//! 1. [`validator::MethodologyValidator`] checks assumptions and safety gates
//! 2. [`fragility::FragilityCalculator`] scores an approved athlete
//! 3. [`planner::TrainingPlanGenerator`] builds a periodized plan
//! 4. [`sensitivity::SensitivityAnalyzer`] re-runs the chain on modified copies
//!
//! No stage performs I/O. Loading documents and persisting traces is the
//! caller's job; [`trace_export`] only renders.

/// Refusal bridge rendering
pub mod bridge;

/// Engine-wide tunables with environment overrides
pub mod config;

/// Rule and threshold expression compiler
pub mod expression;

/// Fragility score calculation
pub mod fragility;

/// Multi-week plan generation
pub mod planner;

/// Recovery recommendations per risk level
pub mod recovery_guidance;

/// What-if scenario analysis
pub mod sensitivity;

/// JSON and Markdown trace reports
pub mod trace_export;

/// Assumption and safety gate validation
pub mod validator;

pub use config::IntelligenceConfig;
pub use fragility::FragilityCalculator;
pub use planner::TrainingPlanGenerator;
pub use sensitivity::{PlanAdjustmentSummary, ScenarioResult, SensitivityAnalyzer};
pub use trace_export::TraceReport;
pub use validator::MethodologyValidator;
