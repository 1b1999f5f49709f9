// ABOUTME: methodology list and show commands for tri-planner-cli
// ABOUTME: Browses methodology documents found in the configured methodology directory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::process::ExitCode;

use anyhow::Result;
use tri_planner::config::{find_methodology, list_methodologies, EngineConfig};

/// List every valid methodology document
pub fn list(config: &EngineConfig) -> Result<ExitCode> {
    let entries = list_methodologies(&config.methodology_dir)?;
    if entries.is_empty() {
        println!(
            "No methodologies found in {}",
            config.methodology_dir.display()
        );
        return Ok(ExitCode::SUCCESS);
    }
    for entry in entries {
        let methodology = &entry.methodology;
        println!(
            "{:<32} v{:<8} {}",
            methodology.id, methodology.version, methodology.name
        );
        println!("{:<32} {}", "", methodology.philosophy.one_line_description);
    }
    Ok(ExitCode::SUCCESS)
}

/// Print one methodology's philosophy, assumptions, gates and targets
pub fn show(config: &EngineConfig, id: &str) -> Result<ExitCode> {
    let entry = find_methodology(&config.methodology_dir, id)?;
    let m = &entry.methodology;

    println!("{} (v{}, updated {})", m.name, m.version, m.last_updated);
    println!("Source: {}", entry.path.display());
    println!("\n{}", m.philosophy.one_line_description);
    println!("{}", m.philosophy.core_logic);

    println!("\nAssumptions:");
    for assumption in &m.assumptions {
        println!(
            "  [{:?}] {}: {}",
            assumption.criticality, assumption.key, assumption.expectation
        );
        println!("      rule: {}", assumption.validation_rule);
    }

    println!("\nSafety gates:");
    for gate in &m.safety_gates.exclusion_criteria {
        println!(
            "  [{:?}] {} {}",
            gate.severity, gate.condition, gate.threshold
        );
    }

    let targets = &m.intensity_distribution_config;
    println!(
        "\nIntensity targets: {:.0}% low / {:.0}% threshold / {:.0}% high (±{}%)",
        targets.low_intensity_target * 100.0,
        targets.threshold_intensity_target * 100.0,
        targets.high_intensity_target * 100.0,
        targets.tolerance_percent
    );
    println!("Base fragility: {:.2}", m.risk_profile.fragility_score);
    Ok(ExitCode::SUCCESS)
}
