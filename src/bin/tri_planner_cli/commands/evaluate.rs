// ABOUTME: validate and plan commands for tri-planner-cli
// ABOUTME: Run the pipeline for one profile, print the report and persist traces and plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;
use tri_planner::config::{load_profile, EngineConfig, TraceFormat};
use tri_planner::persistence::{save_plan, save_trace};
use tri_planner::pipeline::{Pipeline, PipelineOutcome};

use crate::helpers::display::{display_fragility, display_plan};
use crate::helpers::resolve;

/// Exit status for a refused athlete
const REFUSED_EXIT_CODE: u8 = 2;

/// Where, and whether, to write the reasoning trace
pub struct TraceOutput {
    dir: PathBuf,
    format: TraceFormat,
    enabled: bool,
}

impl TraceOutput {
    /// Command-line overrides on top of the engine configuration
    pub fn new(
        config: &EngineConfig,
        format: Option<TraceFormat>,
        dir: Option<PathBuf>,
        disabled: bool,
    ) -> Self {
        Self {
            dir: dir.unwrap_or_else(|| config.trace_dir.clone()),
            format: format.unwrap_or(config.trace_format),
            enabled: !disabled,
        }
    }

    fn save(&self, outcome: &PipelineOutcome) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let path = save_trace(&outcome.report(), &self.dir, self.format)?;
        println!("\nReasoning trace saved to {}", path.display());
        Ok(())
    }
}

fn exit_code(outcome: &PipelineOutcome) -> ExitCode {
    if outcome.is_approved() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(REFUSED_EXIT_CODE)
    }
}

fn evaluate(
    config: &EngineConfig,
    methodology: Option<&str>,
    profile_path: &Path,
    start_date: Option<NaiveDate>,
) -> Result<(Pipeline, PipelineOutcome)> {
    let methodology = resolve::methodology(config, methodology)?;
    let profile = load_profile(profile_path)?;
    let pipeline = Pipeline::new(&methodology)?.with_start_date(start_date);
    let outcome = pipeline.evaluate(&profile)?;
    Ok((pipeline, outcome))
}

/// Validate a profile and print the report
pub fn validate(
    config: &EngineConfig,
    methodology: Option<&str>,
    profile_path: &Path,
    trace: &TraceOutput,
) -> Result<ExitCode> {
    let (pipeline, outcome) = evaluate(config, methodology, profile_path, config.plan_start_date)?;

    println!("{}", pipeline.validator().summary_report(&outcome.validation));
    if let Some(fragility) = &outcome.fragility {
        display_fragility(fragility);
    }
    trace.save(&outcome)?;
    Ok(exit_code(&outcome))
}

/// Validate, score and plan; print the plan or write it to `output`
pub fn plan(
    config: &EngineConfig,
    methodology: Option<&str>,
    profile_path: &Path,
    output: Option<&Path>,
    start_date: Option<NaiveDate>,
    trace: &TraceOutput,
) -> Result<ExitCode> {
    let (pipeline, outcome) = evaluate(config, methodology, profile_path, start_date)?;

    match (&outcome.fragility, &outcome.plan) {
        (Some(fragility), Some(plan)) => {
            display_fragility(fragility);
            if let Some(path) = output {
                save_plan(plan, path)?;
                println!("\nPlan {} written to {}", plan.plan_id, path.display());
            } else {
                display_plan(plan);
            }
            info!(plan_id = %plan.plan_id, weeks = plan.duration_weeks, "Plan command finished");
        }
        _ => {
            println!("{}", pipeline.validator().summary_report(&outcome.validation));
        }
    }
    trace.save(&outcome)?;
    Ok(exit_code(&outcome))
}
