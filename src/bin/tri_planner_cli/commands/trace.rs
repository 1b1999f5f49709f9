// ABOUTME: trace show command for tri-planner-cli
// ABOUTME: Reloads a saved JSON trace and renders it as Markdown or JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use tri_planner::config::TraceFormat;
use tri_planner::persistence::load_trace;
use tri_planner_intelligence::TraceReport;

/// Render a trace file
pub fn show(file: &Path, format: TraceFormat) -> Result<ExitCode> {
    let trace = load_trace(file)?;
    let report = TraceReport::new(&trace);
    match format {
        TraceFormat::Markdown => println!("{}", report.to_markdown()),
        TraceFormat::Json => println!("{}", report.to_json_pretty()?),
    }
    Ok(ExitCode::SUCCESS)
}
