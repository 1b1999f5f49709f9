// ABOUTME: Fragility score calculator: weighted sum of five named penalties over an approved profile
// ABOUTME: Produces the score, risk bucket, per-factor breakdown and targeted recommendations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Fragility Scoring
//!
//! `score = clamp01(base_fragility + Σ weight_i × penalty_i)`
//!
//! `base_fragility` and the weights come from the methodology's risk profile.
//! Each penalty is an independent function of the profile returning a value
//! in `[0, 1]`; the curve shapes come from [`FragilityTuning`].
//!
//! Fragility is only defined once safety has been established, so
//! [`FragilityCalculator::calculate`] requires an approved validation result
//! for the same athlete and methodology.

use std::collections::BTreeMap;

use tracing::{debug, info};
use tri_planner_core::errors::{AppError, AppResult};
use tri_planner_core::models::{
    FragilityFactor, FragilityResult, HrvTrend, MethodologyConfig, RiskLevel, StressLevel,
    UserProfile, ValidationResult,
};

use crate::config::{FragilityTuning, IntelligenceConfig};

// ============================================================================
// Penalty Functions
// ============================================================================

/// Two-segment sleep penalty: gentle between critical and optimal, steep below critical
#[must_use]
pub fn sleep_deviation_penalty(sleep_hours: f64, tuning: &FragilityTuning) -> f64 {
    let optimal = tuning.optimal_sleep_hours;
    let critical = tuning.critical_sleep_hours;
    if sleep_hours >= optimal {
        0.0
    } else if sleep_hours >= critical {
        (optimal - sleep_hours) / optimal
    } else {
        let at_kink = (optimal - critical) / optimal;
        (at_kink + tuning.severe_sleep_slope * (critical - sleep_hours)).min(1.0)
    }
}

/// Step penalty over stress levels
#[must_use]
pub const fn stress_multiplier_penalty(stress: StressLevel, tuning: &FragilityTuning) -> f64 {
    match stress {
        StressLevel::Low => tuning.stress_penalty_low,
        StressLevel::Moderate => tuning.stress_penalty_moderate,
        StressLevel::High => tuning.stress_penalty_high,
    }
}

/// Volume outside the healthy band plus a share for short consistency (missing counts as zero weeks)
#[must_use]
pub fn volume_variance_penalty(
    weekly_volume_hours: f64,
    consistency_weeks: Option<u32>,
    tuning: &FragilityTuning,
) -> f64 {
    let min = tuning.min_healthy_volume_hours;
    let max = tuning.max_healthy_volume_hours;
    let mut penalty = if weekly_volume_hours < min {
        (min - weekly_volume_hours) / min
    } else if weekly_volume_hours > max {
        (weekly_volume_hours - max) / max
    } else {
        0.0
    };

    let weeks = consistency_weeks.unwrap_or(0);
    if weeks < tuning.min_consistency_weeks {
        let required = f64::from(tuning.min_consistency_weeks);
        penalty += tuning.consistency_penalty_share * (required - f64::from(weeks)) / required;
    }
    penalty.min(1.0)
}

/// Timeline pressure from weeks to race, scaled by the HRV trend
#[must_use]
pub fn intensity_frequency_penalty(
    weeks_to_race: Option<u32>,
    hrv: HrvTrend,
    tuning: &FragilityTuning,
) -> f64 {
    let weeks = weeks_to_race.unwrap_or(tuning.default_weeks_to_race);
    let pressure = tuning
        .timeline_pressure
        .iter()
        .find(|(max_weeks, _)| weeks <= *max_weeks)
        .map_or(tuning.distant_race_pressure, |(_, penalty)| *penalty);
    let scaled = match hrv {
        HrvTrend::Decreasing => pressure * tuning.hrv_decreasing_amplifier,
        HrvTrend::Increasing => pressure * tuning.hrv_increasing_dampener,
        HrvTrend::Stable | HrvTrend::Unknown => pressure,
    };
    scaled.min(1.0)
}

/// HRV trend and recent illness; both adverse at once is the maximum penalty
#[must_use]
pub fn recovery_quality_penalty(hrv: HrvTrend, recent_illness: bool, tuning: &FragilityTuning) -> f64 {
    if hrv == HrvTrend::Decreasing && recent_illness {
        return 1.0;
    }
    let hrv_penalty = match hrv {
        HrvTrend::Increasing => tuning.hrv_penalty_increasing,
        HrvTrend::Stable => tuning.hrv_penalty_stable,
        HrvTrend::Decreasing => tuning.hrv_penalty_decreasing,
        HrvTrend::Unknown => tuning.hrv_penalty_unknown,
    };
    let illness_penalty = if recent_illness { 1.0 } else { 0.0 };
    (hrv_penalty * tuning.recovery_hrv_weight + illness_penalty * tuning.recovery_illness_weight)
        .min(1.0)
}

/// Bucket a score using the tuned cut points
#[must_use]
pub fn risk_level(score: f64, tuning: &FragilityTuning) -> RiskLevel {
    if score < tuning.low_risk_ceiling {
        RiskLevel::Low
    } else if score < tuning.moderate_risk_ceiling {
        RiskLevel::Moderate
    } else if score < tuning.high_risk_ceiling {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

// ============================================================================
// Calculator
// ============================================================================

/// Computes athlete-specific fragility under one methodology
#[derive(Debug, Clone, Copy)]
pub struct FragilityCalculator<'a> {
    methodology: &'a MethodologyConfig,
    tuning: &'a FragilityTuning,
}

impl<'a> FragilityCalculator<'a> {
    /// Calculator using the global tuning
    #[must_use]
    pub fn new(methodology: &'a MethodologyConfig) -> Self {
        Self::with_config(methodology, &IntelligenceConfig::global().fragility)
    }

    /// Calculator with explicit tuning
    #[must_use]
    pub const fn with_config(methodology: &'a MethodologyConfig, tuning: &'a FragilityTuning) -> Self {
        Self {
            methodology,
            tuning,
        }
    }

    /// Score an approved profile
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` when the validation result was refused or
    /// belongs to a different athlete or methodology
    pub fn calculate(
        &self,
        profile: &UserProfile,
        validation: &ValidationResult,
    ) -> AppResult<FragilityResult> {
        if !validation.approved {
            return Err(AppError::precondition_failed(
                "fragility is undefined for a refused profile; validation must approve first",
            )
            .with_athlete_id(&profile.athlete_id)
            .with_methodology_id(&self.methodology.id));
        }
        if !validation.belongs_to(&profile.athlete_id, &self.methodology.id) {
            return Err(AppError::precondition_failed(format!(
                "validation result is for athlete '{}' under '{}', not '{}' under '{}'",
                validation.trace.athlete_id,
                validation.trace.methodology_id,
                profile.athlete_id,
                self.methodology.id
            ))
            .with_athlete_id(&profile.athlete_id));
        }
        Ok(self.score(profile))
    }

    fn penalties(&self, profile: &UserProfile) -> BTreeMap<FragilityFactor, f64> {
        let state = &profile.current_state;
        let tuning = self.tuning;
        FragilityFactor::ALL
            .into_iter()
            .map(|factor| {
                let penalty = match factor {
                    FragilityFactor::SleepDeviation => {
                        sleep_deviation_penalty(state.sleep_hours, tuning)
                    }
                    FragilityFactor::StressMultiplier => {
                        stress_multiplier_penalty(state.stress_level, tuning)
                    }
                    FragilityFactor::VolumeVariance => volume_variance_penalty(
                        state.weekly_volume_hours,
                        state.volume_consistency_weeks,
                        tuning,
                    ),
                    FragilityFactor::IntensityFrequency => intensity_frequency_penalty(
                        profile.goals.weeks_to_race,
                        state.hrv_trend,
                        tuning,
                    ),
                    FragilityFactor::RecoveryQuality => {
                        recovery_quality_penalty(state.hrv_trend, state.recent_illness, tuning)
                    }
                };
                (factor, penalty)
            })
            .collect()
    }

    fn score(&self, profile: &UserProfile) -> FragilityResult {
        let risk = &self.methodology.risk_profile;
        let penalties = self.penalties(profile);
        let breakdown: BTreeMap<FragilityFactor, f64> = penalties
            .iter()
            .map(|(factor, penalty)| (*factor, penalty * risk.weight(*factor)))
            .collect();

        for (factor, contribution) in &breakdown {
            debug!(
                factor = %factor,
                penalty = penalties.get(factor).copied().unwrap_or_default(),
                contribution,
                "Fragility penalty"
            );
        }

        let total: f64 = breakdown.values().sum();
        let score = (risk.fragility_score + total).clamp(0.0, 1.0);
        let risk_level = risk_level(score, self.tuning);
        let recommendations = self.recommendations(profile, &breakdown);

        info!(
            athlete_id = %profile.athlete_id,
            methodology_id = %self.methodology.id,
            score,
            risk_level = %risk_level,
            "Fragility calculated"
        );

        FragilityResult {
            athlete_id: profile.athlete_id.clone(),
            methodology_id: self.methodology.id.clone(),
            score,
            base_fragility: risk.fragility_score,
            risk_level,
            interpretation: risk_level.label().to_owned(),
            penalties,
            breakdown,
            recommendations,
        }
    }

    // ========================================================================
    // Recommendations
    // ========================================================================

    fn recommendations(
        &self,
        profile: &UserProfile,
        breakdown: &BTreeMap<FragilityFactor, f64>,
    ) -> Vec<String> {
        let mut ranked: Vec<(FragilityFactor, f64)> = breakdown
            .iter()
            .filter(|(_, contribution)| **contribution > 0.0)
            .map(|(factor, contribution)| (*factor, *contribution))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let recommendations: Vec<String> = ranked
            .into_iter()
            .take(self.tuning.max_recommendations)
            .map(|(factor, _)| self.recommendation_for(factor, profile))
            .collect();

        if recommendations.is_empty() {
            let state = &profile.current_state;
            return vec![format!(
                "Current fragility is low. Keep sleep at {:.1} hrs and stress at {} while you keep monitoring recovery metrics.",
                state.sleep_hours,
                state.stress_level.as_str()
            )];
        }
        recommendations
    }

    fn recommendation_for(&self, factor: FragilityFactor, profile: &UserProfile) -> String {
        let state = &profile.current_state;
        let tuning = self.tuning;
        match factor {
            FragilityFactor::SleepDeviation => {
                if state.sleep_hours < tuning.critical_sleep_hours {
                    format!(
                        "Increase sleep to {:.1}+ hours per night (current: {:.1} hrs). Sleep is critical for recovery and adaptation.",
                        (tuning.critical_sleep_hours + tuning.optimal_sleep_hours) / 2.0,
                        state.sleep_hours
                    )
                } else {
                    format!(
                        "Optimize sleep to {:.0}+ hours per night (current: {:.1} hrs) to reduce fragility.",
                        tuning.optimal_sleep_hours, state.sleep_hours
                    )
                }
            }
            FragilityFactor::StressMultiplier => format!(
                "Manage life stress through relaxation techniques, time management, or workload reduction (current: {}). High stress impairs recovery.",
                state.stress_level.as_str()
            ),
            FragilityFactor::VolumeVariance => self.volume_recommendation(profile),
            FragilityFactor::IntensityFrequency => {
                let weeks = profile
                    .goals
                    .weeks_to_race
                    .unwrap_or(tuning.default_weeks_to_race);
                let shortest_step = tuning.timeline_pressure.first().map_or(0, |(w, _)| *w);
                if weeks <= shortest_step {
                    format!(
                        "Very short timeline to race ({weeks} weeks). Consider extending preparation period or reducing race expectations to manage intensity pressure."
                    )
                } else if state.hrv_trend == HrvTrend::Decreasing {
                    format!(
                        "Race in {weeks} weeks with a decreasing HRV trend. Keep hard sessions well spaced and skip them when recovery markers worsen."
                    )
                } else {
                    format!(
                        "Race in {weeks} weeks adds intensity pressure. Respect the recovery days between hard sessions."
                    )
                }
            }
            FragilityFactor::RecoveryQuality => Self::recovery_recommendation(profile),
        }
    }

    fn volume_recommendation(&self, profile: &UserProfile) -> String {
        let state = &profile.current_state;
        let tuning = self.tuning;
        let mut parts = Vec::new();
        if state.weekly_volume_hours < tuning.min_healthy_volume_hours {
            parts.push(format!(
                "Gradually increase training volume to at least {:.0} hours per week (current: {:.1} hrs).",
                tuning.min_healthy_volume_hours, state.weekly_volume_hours
            ));
        } else if state.weekly_volume_hours > tuning.max_healthy_volume_hours {
            parts.push(format!(
                "Reduce training volume below {:.0} hours per week (current: {:.1} hrs) to avoid overtraining.",
                tuning.max_healthy_volume_hours, state.weekly_volume_hours
            ));
        }
        let weeks = state.volume_consistency_weeks.unwrap_or(0);
        if weeks < tuning.min_consistency_weeks {
            parts.push(format!(
                "Maintain consistent volume for at least {} consecutive weeks (current: {weeks} weeks) before increasing intensity.",
                tuning.min_consistency_weeks
            ));
        }
        parts.join(" ")
    }

    fn recovery_recommendation(profile: &UserProfile) -> String {
        let state = &profile.current_state;
        let mut parts = Vec::new();
        if state.recent_illness {
            parts.push(
                "Recent illness detected. Extend recovery period before resuming high-intensity training.",
            );
        }
        match state.hrv_trend {
            HrvTrend::Decreasing => parts.push(
                "HRV trend is decreasing, indicating poor recovery. Add extra rest days and reduce training load until HRV stabilizes.",
            ),
            HrvTrend::Unknown => parts.push(
                "Consider tracking HRV (Heart Rate Variability) to monitor recovery and optimize training load.",
            ),
            HrvTrend::Stable => parts.push(
                "HRV trend is stable but not improving (current: stable). Protect easy days and sleep so recovery can trend upward.",
            ),
            HrvTrend::Increasing => {}
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> FragilityTuning {
        FragilityTuning::default()
    }

    #[test]
    fn test_sleep_penalty_is_continuous_at_kink() {
        let t = tuning();
        assert!(sleep_deviation_penalty(8.0, &t).abs() < f64::EPSILON);
        assert!(sleep_deviation_penalty(9.5, &t).abs() < f64::EPSILON);
        assert!((sleep_deviation_penalty(7.5, &t) - 0.0625).abs() < 1e-12);
        let above = sleep_deviation_penalty(7.0, &t);
        let below = sleep_deviation_penalty(7.0 - 1e-9, &t);
        assert!((above - below).abs() < 1e-6);
        assert!((sleep_deviation_penalty(6.5, &t) - 0.3125).abs() < 1e-12);
        assert!((sleep_deviation_penalty(0.0, &t) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_volume_penalty_includes_consistency_share() {
        let t = tuning();
        assert!(volume_variance_penalty(10.0, Some(8), &t).abs() < f64::EPSILON);
        assert!((volume_variance_penalty(10.0, None, &t) - 0.5).abs() < 1e-12);
        assert!((volume_variance_penalty(3.0, Some(2), &t) - 0.75).abs() < 1e-12);
        assert!((volume_variance_penalty(30.0, Some(0), &t) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_intensity_penalty_steps_and_hrv_scaling() {
        let t = tuning();
        assert!((intensity_frequency_penalty(Some(4), HrvTrend::Stable, &t) - 0.8).abs() < 1e-12);
        assert!((intensity_frequency_penalty(None, HrvTrend::Stable, &t) - 0.2).abs() < 1e-12);
        assert!((intensity_frequency_penalty(Some(20), HrvTrend::Stable, &t) - 0.1).abs() < 1e-12);
        assert!(
            (intensity_frequency_penalty(Some(4), HrvTrend::Decreasing, &t) - 1.0).abs()
                < f64::EPSILON
        );
        assert!(
            (intensity_frequency_penalty(Some(8), HrvTrend::Increasing, &t) - 0.28).abs() < 1e-12
        );
    }

    #[test]
    fn test_recovery_penalty_compounds() {
        let t = tuning();
        assert!(
            (recovery_quality_penalty(HrvTrend::Decreasing, true, &t) - 1.0).abs() < f64::EPSILON
        );
        assert!((recovery_quality_penalty(HrvTrend::Stable, false, &t) - 0.21).abs() < 1e-12);
        assert!((recovery_quality_penalty(HrvTrend::Increasing, true, &t) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_risk_level_uses_tuned_cut_points() {
        let t = tuning();
        assert_eq!(risk_level(0.39, &t), RiskLevel::Low);
        assert_eq!(risk_level(0.44, &t), RiskLevel::Moderate);
        assert_eq!(risk_level(0.8, &t), RiskLevel::Critical);
    }
}
