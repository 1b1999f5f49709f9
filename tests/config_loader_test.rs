// ABOUTME: Tests for methodology/profile document loading and environment configuration
// ABOUTME: Covers JSON and YAML parsing, schema rejection, directory listing and env overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use common::{fixture_path, methodology_dir, moderate_athlete, polarized_methodology};
use serial_test::serial;
use tempfile::TempDir;
use tri_planner::config::{
    find_methodology, list_methodologies, load_methodology, load_profile, parse_methodology_str,
    DocumentFormat, EngineConfig, TraceFormat,
};
use tri_planner::constants::env_vars;
use tri_planner_core::errors::ErrorCode;
use tri_planner_intelligence::MethodologyValidator;

#[test]
fn test_bundled_methodologies_compile() {
    let entries = list_methodologies(&methodology_dir()).unwrap();
    let ids: Vec<&str> = entries
        .iter()
        .map(|entry| entry.methodology.id.as_str())
        .collect();
    assert_eq!(ids, vec!["polarized_80_20_v1", "threshold_70_20_10_v1"]);

    for entry in &entries {
        MethodologyValidator::new(&entry.methodology).unwrap();
    }
}

#[test]
fn test_find_methodology_by_id() {
    let entry = find_methodology(&methodology_dir(), "polarized_80_20_v1").unwrap();
    assert_eq!(entry.methodology.name, "Polarized 80/20 Training");
    assert!(entry.path.ends_with("methodology_polarized.json"));

    let err = find_methodology(&methodology_dir(), "no_such_method").unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[test]
fn test_yaml_profile_matches_json() {
    let dir = TempDir::new().unwrap();
    let athlete = moderate_athlete();
    let yaml = DocumentFormat::Yaml.render(&athlete).unwrap();
    let path = dir.path().join("athlete.yaml");
    fs::write(&path, yaml).unwrap();

    let reloaded = load_profile(&path).unwrap();
    assert_eq!(reloaded.athlete_id, athlete.athlete_id);
    assert_eq!(reloaded.current_state.stress_level, athlete.current_state.stress_level);
    assert_eq!(reloaded.preferences, athlete.preferences);
}

#[test]
fn test_methodology_schema_violation_is_reported() {
    let mut methodology = polarized_methodology();
    methodology.intensity_distribution_config.high_intensity_target = 0.5;
    let text = DocumentFormat::Json.render(&methodology).unwrap();

    let err = parse_methodology_str(&text, DocumentFormat::Json).unwrap_err();
    assert_eq!(err.code, ErrorCode::SchemaViolation);
    assert_eq!(
        err.context.methodology_id.as_deref(),
        Some("polarized_80_20_v1")
    );
}

#[test]
fn test_unparsable_rule_fails_validator_construction() {
    let mut methodology = polarized_methodology();
    methodology.assumptions[0].validation_rule = "user.sleep_hours is plenty".to_owned();
    let err = MethodologyValidator::new(&methodology).unwrap_err();
    assert_eq!(err.code, ErrorCode::SchemaViolation);
}

#[test]
fn test_profile_errors() {
    let dir = TempDir::new().unwrap();

    let err = load_profile(&dir.path().join("missing.json")).unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let bad_ext = dir.path().join("athlete.txt");
    fs::write(&bad_ext, "{}").unwrap();
    let err = load_profile(&bad_ext).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let bad_id = dir.path().join("athlete.json");
    let text = fs::read_to_string(fixture_path("athlete_moderate_fragility.json"))
        .unwrap()
        .replace("athlete_moderate_001", "athlete moderate!");
    fs::write(&bad_id, text).unwrap();
    let err = load_profile(&bad_id).unwrap_err();
    assert_eq!(err.code, ErrorCode::SchemaViolation);
}

#[test]
fn test_invalid_documents_are_skipped_when_listing() {
    let dir = TempDir::new().unwrap();
    fs::copy(
        methodology_dir().join("methodology_polarized.json"),
        dir.path().join("polarized.json"),
    )
    .unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let entries = list_methodologies(dir.path()).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(load_methodology(&dir.path().join("broken.json")).is_err());
}

fn clear_env() {
    for var in [
        env_vars::METHODOLOGY,
        env_vars::METHODOLOGY_DIR,
        env_vars::TRACE_DIR,
        env_vars::TRACE_FORMAT,
        env_vars::PLAN_START_DATE,
    ] {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_engine_config_defaults() {
    clear_env();
    let config = EngineConfig::from_env().unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.trace_format, TraceFormat::Json);
    assert!(config.plan_start_date.is_none());
}

#[test]
#[serial]
fn test_engine_config_env_overrides() {
    clear_env();
    env::set_var(env_vars::METHODOLOGY_DIR, "/srv/methodologies");
    env::set_var(env_vars::TRACE_DIR, "/tmp/traces");
    env::set_var(env_vars::TRACE_FORMAT, "markdown");
    env::set_var(env_vars::PLAN_START_DATE, "2025-04-07");

    let config = EngineConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.methodology_dir, PathBuf::from("/srv/methodologies"));
    assert_eq!(config.trace_dir, Path::new("/tmp/traces"));
    assert_eq!(config.trace_format, TraceFormat::Markdown);
    assert_eq!(
        config.plan_start_date,
        NaiveDate::from_ymd_opt(2025, 4, 7)
    );
}

#[test]
#[serial]
fn test_engine_config_rejects_bad_values() {
    clear_env();
    env::set_var(env_vars::TRACE_FORMAT, "xml");
    let err = EngineConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigError);

    clear_env();
    env::set_var(env_vars::PLAN_START_DATE, "next monday");
    let err = EngineConfig::from_env().unwrap_err();
    clear_env();
    assert_eq!(err.code, ErrorCode::ConfigError);
}
