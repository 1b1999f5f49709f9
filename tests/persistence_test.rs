// ABOUTME: Tests for writing and reloading reasoning traces and training plans
// ABOUTME: Exercises JSON and Markdown trace output in temporary directories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::fs;

use common::{
    fixed_start_date, fixed_timestamp, has_extension, moderate_athlete, polarized_methodology,
    refused_athlete,
};
use tempfile::TempDir;
use tri_planner::config::TraceFormat;
use tri_planner::persistence::{load_plan, load_trace, save_plan, save_trace, trace_file_name};
use tri_planner::pipeline::{Pipeline, PipelineOutcome};
use tri_planner_core::errors::ErrorCode;
use tri_planner_core::models::UserProfile;
use tri_planner_intelligence::IntelligenceConfig;

fn run(profile: &UserProfile) -> PipelineOutcome {
    Pipeline::new(&polarized_methodology())
        .unwrap()
        .with_config(IntelligenceConfig::default())
        .with_start_date(Some(fixed_start_date()))
        .evaluate_at(profile, fixed_timestamp())
        .unwrap()
}

#[test]
fn test_trace_file_name_uses_athlete_and_timestamp() {
    let outcome = run(&moderate_athlete());
    let name = trace_file_name(&outcome.validation.trace, TraceFormat::Json);
    assert_eq!(name, "trace_athlete_moderate_001_20250303_073000.json");
    let name = trace_file_name(&outcome.validation.trace, TraceFormat::Markdown);
    assert!(name.ends_with(".md"));
}

#[test]
fn test_json_trace_round_trips_with_extra_sections() {
    let dir = TempDir::new().unwrap();
    let outcome = run(&moderate_athlete());

    let path = save_trace(&outcome.report(), dir.path(), TraceFormat::Json).unwrap();
    assert!(has_extension(&path, "json"));

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw.get("fragility_details").is_some());
    assert!(raw.get("plan_decisions").is_some());

    let reloaded = load_trace(&path).unwrap();
    let original = &outcome.validation.trace;
    assert_eq!(reloaded.athlete_id, original.athlete_id);
    assert_eq!(reloaded.timestamp, original.timestamp);
    assert_eq!(reloaded.result, original.result);
    assert_eq!(reloaded.checks, original.checks);
    assert_eq!(reloaded.gate_evaluations, original.gate_evaluations);
    let score = reloaded.fragility_score.unwrap();
    assert!((score - original.fragility_score.unwrap()).abs() < 1e-12);
}

#[test]
fn test_refused_trace_omits_fragility_sections() {
    let dir = TempDir::new().unwrap();
    let outcome = run(&refused_athlete());

    let path = save_trace(&outcome.report(), dir.path(), TraceFormat::Json).unwrap();
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw.get("fragility_details").is_none());
    assert!(raw.get("plan_decisions").is_none());
    assert_eq!(raw["result"], "refused");
}

#[test]
fn test_markdown_trace_is_written_into_nested_dir() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("logs").join("traces");
    let outcome = run(&moderate_athlete());

    let path = save_trace(&outcome.report(), &nested, TraceFormat::Markdown).unwrap();
    assert!(has_extension(&path, "md"));
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("athlete_moderate_001"));
    assert!(text.contains("Sensitivity Factor"));
    assert!(text.contains("Training Phase Distribution"));
}

#[test]
fn test_plan_round_trips() {
    let dir = TempDir::new().unwrap();
    let outcome = run(&moderate_athlete());
    let plan = outcome.plan.unwrap();

    let path = dir.path().join("plan.json");
    save_plan(&plan, &path).unwrap();
    let reloaded = load_plan(&path).unwrap();
    assert_eq!(reloaded.plan_id, plan.plan_id);
    assert_eq!(reloaded.start_date, plan.start_date);
    assert_eq!(reloaded.plan_decisions, plan.plan_decisions);
    assert_eq!(reloaded.weeks.len(), plan.weeks.len());
    for (loaded, original) in reloaded.weeks.iter().zip(&plan.weeks) {
        assert_eq!(loaded.phase, original.phase);
        assert_eq!(loaded.week_type, original.week_type);
        assert_eq!(loaded.sessions, original.sessions);
    }
}

#[test]
fn test_missing_files_are_not_found() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("absent.json");
    let err = load_trace(&absent).unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert_eq!(
        err.context.resource_id.as_deref(),
        Some(absent.display().to_string().as_str())
    );
    let err = load_plan(&absent).unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[test]
fn test_unwritable_plan_path_is_storage_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let plan = run(&moderate_athlete()).plan.unwrap();

    let err = save_plan(&plan, &blocker.join("plan.json")).unwrap_err();
    assert_eq!(err.code, ErrorCode::StorageError);
    assert_eq!(
        err.context.resource_id.as_deref(),
        Some(blocker.display().to_string().as_str())
    );
    assert!(err.source.is_some());
}

#[test]
fn test_corrupt_trace_is_serialization_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"athlete_id\": 3").unwrap();
    let err = load_trace(&path).unwrap_err();
    assert_eq!(err.code, ErrorCode::SerializationError);
}
