// ABOUTME: File persistence for reasoning traces and generated training plans
// ABOUTME: Writes timestamped trace files in JSON or Markdown and round-trips plans as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use tri_planner_core::constants::trace::{FILE_PREFIX, FILE_TIMESTAMP_FORMAT};
use tri_planner_core::errors::{AppError, AppResult};
use tri_planner_core::models::{ReasoningTrace, TrainingPlan};
use tri_planner_intelligence::TraceReport;

use crate::config::loader::read_document;
use crate::config::TraceFormat;

/// `trace_{athlete}_{YYYYmmdd_HHMMSS}.{json|md}`
#[must_use]
pub fn trace_file_name(trace: &ReasoningTrace, format: TraceFormat) -> String {
    format!(
        "{FILE_PREFIX}_{}_{}.{}",
        trace.athlete_id.replace(' ', "_"),
        trace.timestamp.format(FILE_TIMESTAMP_FORMAT),
        format.extension()
    )
}

fn write_file(path: &Path, contents: &str) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::storage(format!("failed to create {}: {e}", parent.display()))
                .with_resource_id(parent.display().to_string())
                .with_source(e)
        })?;
    }
    fs::write(path, contents).map_err(|e| {
        AppError::storage(format!("failed to write {}: {e}", path.display()))
            .with_resource_id(path.display().to_string())
            .with_source(e)
    })
}

/// Write a trace report into `dir`, creating it if needed
///
/// # Errors
///
/// Returns a storage error if the directory or file cannot be written
pub fn save_trace(report: &TraceReport<'_>, dir: &Path, format: TraceFormat) -> AppResult<PathBuf> {
    let trace = report.trace();
    let path = dir.join(trace_file_name(trace, format));
    let contents = match format {
        TraceFormat::Json => report.to_json_pretty()?,
        TraceFormat::Markdown => report.to_markdown(),
    };
    write_file(&path, &contents)?;
    info!(
        athlete_id = %trace.athlete_id,
        path = %path.display(),
        format = %format,
        "Reasoning trace saved"
    );
    Ok(path)
}

/// Read a JSON trace written by [`save_trace`]
///
/// # Errors
///
/// Returns `ResourceNotFound` for a missing file and a serialization error
/// when the file is not a trace
pub fn load_trace(path: &Path) -> AppResult<ReasoningTrace> {
    let text = read_document(path)?;
    serde_json::from_str(&text).map_err(|e| {
        AppError::serialization(format!("invalid trace file {}: {e}", path.display()))
            .with_source(e)
    })
}

/// Write a plan as indented JSON
///
/// # Errors
///
/// Returns a storage error if the file cannot be written
pub fn save_plan(plan: &TrainingPlan, path: &Path) -> AppResult<()> {
    write_file(path, &serde_json::to_string_pretty(plan)?)?;
    info!(
        plan_id = %plan.plan_id,
        athlete_id = %plan.athlete_id,
        path = %path.display(),
        "Training plan saved"
    );
    Ok(())
}

/// Read a plan written by [`save_plan`] and re-check its structure
///
/// # Errors
///
/// Returns `ResourceNotFound` for a missing file, a serialization error for
/// malformed JSON and a schema violation for a structurally invalid plan
pub fn load_plan(path: &Path) -> AppResult<TrainingPlan> {
    let text = read_document(path)?;
    let plan: TrainingPlan = serde_json::from_str(&text).map_err(|e| {
        AppError::serialization(format!("invalid plan file {}: {e}", path.display())).with_source(e)
    })?;
    plan.validate()?;
    Ok(plan)
}
