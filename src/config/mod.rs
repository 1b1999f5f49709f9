// ABOUTME: Outer-layer configuration: document locations, trace output and planner overrides
// ABOUTME: Reads TRI_PLANNER_* environment variables on top of platform-aware defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the Tri Planner binary layer
//!
//! - **loader**: JSON/YAML methodology and profile documents
//! - [`EngineConfig`]: where documents and traces live
//!
//! Algorithm tunables are not configured here; see
//! `tri_planner_intelligence::config::IntelligenceConfig`.

/// Document loading and schema validation
pub mod loader;

pub use loader::{
    find_methodology, list_methodologies, load_methodology, load_profile, parse_methodology_str,
    parse_profile_str, DocumentFormat, MethodologyEntry,
};

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use tri_planner_core::errors::{AppError, AppResult};

use crate::constants::{env_vars, paths};

/// Trace output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceFormat {
    /// Machine-readable trace, reloadable with `load_trace`
    #[default]
    Json,
    /// Human-readable audit report
    Markdown,
}

impl TraceFormat {
    /// File extension without the dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

impl fmt::Display for TraceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
        })
    }
}

impl FromStr for TraceFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(AppError::config(format!(
                "unsupported trace format '{other}': use 'json' or 'markdown'"
            ))),
        }
    }
}

/// Locations and output settings for the pipeline and CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Methodology used when a command names none
    pub methodology_path: PathBuf,
    /// Directory searched for methodology documents
    pub methodology_dir: PathBuf,
    /// Directory receiving reasoning traces
    pub trace_dir: PathBuf,
    /// Trace encoding
    pub trace_format: TraceFormat,
    /// Fixed first day of generated plans, `None` for today
    pub plan_start_date: Option<NaiveDate>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            methodology_path: PathBuf::from(paths::DEFAULT_METHODOLOGY_FILE),
            methodology_dir: PathBuf::from(paths::DEFAULT_METHODOLOGY_DIR),
            trace_dir: default_trace_dir(),
            trace_format: TraceFormat::default(),
            plan_start_date: None,
        }
    }
}

/// `<data_local_dir>/tri-planner/reasoning_logs`, or `./reasoning_logs` when
/// the platform has no data directory
#[must_use]
pub fn default_trace_dir() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from(paths::TRACE_DIR_NAME),
        |dir| dir.join(paths::APP_DIR).join(paths::TRACE_DIR_NAME),
    )
}

impl EngineConfig {
    /// Load configuration from defaults plus `TRI_PLANNER_*` environment overrides
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown trace format or a start
    /// date that is not `YYYY-MM-DD`
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let trace_format = env::var(env_vars::TRACE_FORMAT)
            .ok()
            .map(|value| value.parse::<TraceFormat>())
            .transpose()?
            .unwrap_or(defaults.trace_format);
        let plan_start_date = env::var(env_vars::PLAN_START_DATE)
            .ok()
            .map(|value| {
                NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| {
                    AppError::config(format!(
                        "{} must be YYYY-MM-DD, got '{value}': {e}",
                        env_vars::PLAN_START_DATE
                    ))
                })
            })
            .transpose()?;

        let config = Self {
            methodology_path: env::var(env_vars::METHODOLOGY)
                .map_or(defaults.methodology_path, PathBuf::from),
            methodology_dir: env::var(env_vars::METHODOLOGY_DIR)
                .map_or(defaults.methodology_dir, PathBuf::from),
            trace_dir: env::var(env_vars::TRACE_DIR).map_or(defaults.trace_dir, PathBuf::from),
            trace_format,
            plan_start_date,
        };
        info!(
            methodology = %config.methodology_path.display(),
            trace_dir = %config.trace_dir.display(),
            trace_format = %config.trace_format,
            "Engine configuration loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_format_parsing() {
        assert_eq!("JSON".parse::<TraceFormat>().unwrap(), TraceFormat::Json);
        assert_eq!("md".parse::<TraceFormat>().unwrap(), TraceFormat::Markdown);
        assert!("xml".parse::<TraceFormat>().is_err());
        assert_eq!(TraceFormat::Markdown.extension(), "md");
    }

    #[test]
    fn test_default_trace_dir_ends_with_reasoning_logs() {
        assert!(default_trace_dir().ends_with(paths::TRACE_DIR_NAME));
    }
}
