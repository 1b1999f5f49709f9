// ABOUTME: Application constants and environment variable names for the Tri Planner binary layer
// ABOUTME: Service identity, environment lookups and default paths used by config, logging and persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Engine constants live in `tri_planner_core::constants`. This module only
//! holds what the outer layer needs: service identity, environment variable
//! names and default locations.

/// Service identity used in structured logs
pub mod service_names {
    /// Service name reported at startup
    pub const TRI_PLANNER: &str = "tri-planner";

    /// Service version from Cargo.toml
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Environment variable names
pub mod env_vars {
    /// Path of the methodology document used when none is given
    pub const METHODOLOGY: &str = "TRI_PLANNER_METHODOLOGY";
    /// Directory searched by `methodology list` and id lookups
    pub const METHODOLOGY_DIR: &str = "TRI_PLANNER_METHODOLOGY_DIR";
    /// Directory receiving reasoning traces
    pub const TRACE_DIR: &str = "TRI_PLANNER_TRACE_DIR";
    /// `json` or `markdown`
    pub const TRACE_FORMAT: &str = "TRI_PLANNER_TRACE_FORMAT";
    /// Fixed plan start date (`YYYY-MM-DD`)
    pub const PLAN_START_DATE: &str = "TRI_PLANNER_PLAN_START_DATE";
}

/// Default locations
pub mod paths {
    /// Directory under the platform data dir holding tri-planner state
    pub const APP_DIR: &str = "tri-planner";
    /// Trace directory name
    pub const TRACE_DIR_NAME: &str = "reasoning_logs";
    /// Methodology directory used when nothing else is configured
    pub const DEFAULT_METHODOLOGY_DIR: &str = "methodologies";
    /// Methodology used when none is configured
    pub const DEFAULT_METHODOLOGY_FILE: &str = "methodologies/methodology_polarized.json";
}
