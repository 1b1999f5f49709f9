// ABOUTME: Fragility penalty tunables: sleep curve, stress, volume band, timeline pressure, HRV
// ABOUTME: Defaults mirror tri-planner-core constants; overridable through the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use tri_planner_core::constants::fragility;

/// Tunables for the five fragility penalties and risk bucketing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragilityTuning {
    /// Sleep at or above this carries no penalty
    pub optimal_sleep_hours: f64,
    /// Below this the penalty rises along the steep segment
    pub critical_sleep_hours: f64,
    /// Penalty per hour below critical sleep
    pub severe_sleep_slope: f64,
    /// Penalty for low stress
    pub stress_penalty_low: f64,
    /// Penalty for moderate stress
    pub stress_penalty_moderate: f64,
    /// Penalty for high stress
    pub stress_penalty_high: f64,
    /// Lower edge of the healthy weekly volume band (hours)
    pub min_healthy_volume_hours: f64,
    /// Upper edge of the healthy weekly volume band (hours)
    pub max_healthy_volume_hours: f64,
    /// Consistency below this many weeks adds a penalty
    pub min_consistency_weeks: u32,
    /// Maximum share of the volume penalty coming from inconsistency
    pub consistency_penalty_share: f64,
    /// Weeks to race assumed when unknown
    pub default_weeks_to_race: u32,
    /// Timeline pressure as `(max weeks, penalty)` steps, ascending
    pub timeline_pressure: Vec<(u32, f64)>,
    /// Pressure when the race is further than every step
    pub distant_race_pressure: f64,
    /// Intensity multiplier when HRV is decreasing
    pub hrv_decreasing_amplifier: f64,
    /// Intensity multiplier when HRV is increasing
    pub hrv_increasing_dampener: f64,
    /// Recovery penalty for increasing HRV
    pub hrv_penalty_increasing: f64,
    /// Recovery penalty for stable HRV
    pub hrv_penalty_stable: f64,
    /// Recovery penalty for decreasing HRV
    pub hrv_penalty_decreasing: f64,
    /// Recovery penalty when HRV is not tracked
    pub hrv_penalty_unknown: f64,
    /// HRV share of the recovery penalty
    pub recovery_hrv_weight: f64,
    /// Illness share of the recovery penalty
    pub recovery_illness_weight: f64,
    /// Scores below this are low risk
    pub low_risk_ceiling: f64,
    /// Scores below this are moderate risk
    pub moderate_risk_ceiling: f64,
    /// Scores below this are high risk, otherwise critical
    pub high_risk_ceiling: f64,
    /// Recommendations emitted at most
    pub max_recommendations: usize,
}

impl Default for FragilityTuning {
    fn default() -> Self {
        Self {
            optimal_sleep_hours: fragility::OPTIMAL_SLEEP_HOURS,
            critical_sleep_hours: fragility::CRITICAL_SLEEP_HOURS,
            severe_sleep_slope: fragility::SEVERE_SLEEP_SLOPE,
            stress_penalty_low: fragility::STRESS_PENALTY_LOW,
            stress_penalty_moderate: fragility::STRESS_PENALTY_MODERATE,
            stress_penalty_high: fragility::STRESS_PENALTY_HIGH,
            min_healthy_volume_hours: fragility::MIN_HEALTHY_VOLUME_HOURS,
            max_healthy_volume_hours: fragility::MAX_HEALTHY_VOLUME_HOURS,
            min_consistency_weeks: fragility::MIN_CONSISTENCY_WEEKS,
            consistency_penalty_share: fragility::CONSISTENCY_PENALTY_SHARE,
            default_weeks_to_race: fragility::DEFAULT_WEEKS_TO_RACE,
            timeline_pressure: fragility::TIMELINE_PRESSURE.to_vec(),
            distant_race_pressure: fragility::DISTANT_RACE_PRESSURE,
            hrv_decreasing_amplifier: fragility::HRV_DECREASING_AMPLIFIER,
            hrv_increasing_dampener: fragility::HRV_INCREASING_DAMPENER,
            hrv_penalty_increasing: fragility::HRV_PENALTY_INCREASING,
            hrv_penalty_stable: fragility::HRV_PENALTY_STABLE,
            hrv_penalty_decreasing: fragility::HRV_PENALTY_DECREASING,
            hrv_penalty_unknown: fragility::HRV_PENALTY_UNKNOWN,
            recovery_hrv_weight: fragility::RECOVERY_HRV_WEIGHT,
            recovery_illness_weight: fragility::RECOVERY_ILLNESS_WEIGHT,
            low_risk_ceiling: fragility::LOW_RISK_CEILING,
            moderate_risk_ceiling: fragility::MODERATE_RISK_CEILING,
            high_risk_ceiling: fragility::HIGH_RISK_CEILING,
            max_recommendations: fragility::MAX_RECOMMENDATIONS,
        }
    }
}
