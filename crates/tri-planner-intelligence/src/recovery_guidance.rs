// ABOUTME: Recovery guidance per fragility risk bucket
// ABOUTME: Static advice lists shown alongside the targeted fragility recommendations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tri_planner_core::models::RiskLevel;

const LOW: &[&str] = &[
    "Maintain current training load",
    "Continue monitoring recovery metrics",
    "Ensure adequate sleep and nutrition",
];

const MODERATE: &[&str] = &[
    "Take 2-3 easy recovery days at Zone 1 intensity",
    "Reduce training volume by 20-30% this week",
    "Prioritize sleep (8+ hours per night)",
    "Monitor resting heart rate daily",
    "Consider massage or light stretching",
];

const HIGH: &[&str] = &[
    "Take a full rest week (no training or very light activity only)",
    "Prioritize sleep (9+ hours per night)",
    "Monitor resting heart rate and HRV daily",
    "Consult a coach or sports medicine professional",
    "Address any underlying illness or stress",
    "Do not resume training until recovery metrics normalize",
];

/// General recovery advice for a risk bucket; high and critical share the strictest list
#[must_use]
pub const fn recovery_guidance(risk: RiskLevel) -> &'static [&'static str] {
    match risk {
        RiskLevel::Low => LOW,
        RiskLevel::Moderate => MODERATE,
        RiskLevel::High | RiskLevel::Critical => HIGH,
    }
}
