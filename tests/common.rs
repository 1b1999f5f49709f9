// ABOUTME: Shared test utilities and fixture loaders for integration tests
// ABOUTME: Provides quiet logging setup, methodology and athlete profile fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::expect_used
)]
//! Shared test utilities for `tri_planner`

use std::path::{Path, PathBuf};
use std::sync::Once;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tri_planner::config::{load_methodology, load_profile};
use tri_planner_core::models::{MethodologyConfig, UserProfile};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Workspace root
pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Directory holding the bundled methodologies
pub fn methodology_dir() -> PathBuf {
    workspace_root().join("methodologies")
}

/// Path to a profile fixture
pub fn fixture_path(name: &str) -> PathBuf {
    workspace_root().join("tests").join("fixtures").join(name)
}

/// The polarized 80/20 methodology
pub fn polarized_methodology() -> MethodologyConfig {
    init_test_logging();
    load_methodology(&methodology_dir().join("methodology_polarized.json"))
        .expect("polarized methodology loads")
}

/// The pyramidal 70/20/10 methodology
pub fn threshold_methodology() -> MethodologyConfig {
    init_test_logging();
    load_methodology(&methodology_dir().join("methodology_threshold_70_20_10.json"))
        .expect("threshold methodology loads")
}

fn profile(name: &str) -> UserProfile {
    init_test_logging();
    load_profile(&fixture_path(name)).expect("profile fixture loads")
}

/// Sleep 6.5 h, moderate stress, 12 weeks to race: approved, moderate risk
pub fn moderate_athlete() -> UserProfile {
    profile("athlete_moderate_fragility.json")
}

/// Sleep 6.0 h, short consistency, 8 weeks to race: approved, high risk
pub fn high_fragility_athlete() -> UserProfile {
    profile("athlete_high_fragility.json")
}

/// Well rested, low stress, 16 weeks to race: approved, low risk
pub fn low_fragility_athlete() -> UserProfile {
    profile("athlete_low_fragility.json")
}

/// Injured and sleep deprived: refused
pub fn refused_athlete() -> UserProfile {
    profile("athlete_refused.json")
}

/// Fixed evaluation instant for reproducible traces
pub fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 7, 30, 0)
        .single()
        .expect("valid timestamp")
}

/// Fixed plan start (a Monday)
pub fn fixed_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date")
}

/// Whether `path` has the given extension
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}
