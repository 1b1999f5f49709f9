// ABOUTME: what-if command for tri-planner-cli
// ABOUTME: Parses path=value changes and evaluates each as an independent scenario
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use serde_json::Value;
use tri_planner::config::{load_profile, EngineConfig};
use tri_planner::pipeline::Pipeline;

use crate::helpers::display::display_scenario;
use crate::helpers::resolve;

/// `current_state.sleep_hours=7.5` -> (`current_state.sleep_hours`, 7.5)
///
/// The value is read as JSON when it parses (numbers, booleans, `null`,
/// quoted strings) and as a bare string otherwise, so `stress_level=high` works.
fn parse_change(raw: &str) -> Result<(String, Value)> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected PATH=VALUE, got '{raw}'"))?;
    let value = value.trim();
    let parsed =
        serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((path.trim().to_owned(), parsed))
}

/// Evaluate each change against the baseline and print the differences
pub fn run(
    config: &EngineConfig,
    methodology: Option<&str>,
    profile_path: &Path,
    changes: &[String],
    json: bool,
) -> Result<ExitCode> {
    let changes = changes
        .iter()
        .map(|raw| parse_change(raw))
        .collect::<Result<Vec<_>>>()?;

    let methodology = resolve::methodology(config, methodology)?;
    let profile = load_profile(profile_path)?;
    let pipeline = Pipeline::new(&methodology)?.with_start_date(config.plan_start_date);
    let baseline = pipeline.evaluate(&profile)?;
    let analyzer = pipeline.sensitivity(&profile, &baseline)?;

    println!(
        "Baseline: {} (fragility {})",
        baseline.validation.status,
        baseline
            .fragility
            .as_ref()
            .map_or_else(|| "n/a".to_owned(), |f| format!("{:.3}", f.score))
    );

    let mut failures = 0_usize;
    let mut results = Vec::with_capacity(changes.len());
    for ((path, _), outcome) in changes.iter().zip(analyzer.modify_assumptions(&changes)) {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                failures += 1;
                eprintln!("error: scenario '{path}' rejected: {e}");
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        results.iter().for_each(display_scenario);
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_change_reads_json_or_text() {
        let (path, value) = parse_change("current_state.sleep_hours=7.5").unwrap();
        assert_eq!(path, "current_state.sleep_hours");
        assert_eq!(value, Value::from(7.5));

        let (_, value) = parse_change("current_state.stress_level=high").unwrap();
        assert_eq!(value, Value::String("high".to_owned()));

        let (_, value) = parse_change("current_state.recent_illness = true").unwrap();
        assert_eq!(value, Value::Bool(true));

        assert!(parse_change("sleep_hours").is_err());
    }
}
