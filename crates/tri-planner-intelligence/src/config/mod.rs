// ABOUTME: Decision engine configuration: tunable fragility and planning constants
// ABOUTME: Provides defaults, environment overrides, validation and a cached global instance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Intelligence Configuration Module
//!
//! Methodology documents carry the per-methodology numbers (weights, phase
//! splits, templates). The constants here are engine-wide: the shape of each
//! fragility penalty and the scheduler's structural rules.
//!
//! # Module Structure
//!
//! - `fragility` - Penalty curves and risk bucket cut points
//! - `planning` - Hard-session caps, spacing, sport minimums and volume multipliers
//! - `error` - Validation and parse errors

pub mod error;
pub mod fragility;
pub mod planning;

pub use error::ConfigError;
pub use fragility::FragilityTuning;
pub use planning::PlanningTuning;

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Global configuration singleton
static INTELLIGENCE_CONFIG: OnceLock<IntelligenceConfig> = OnceLock::new();

/// Main intelligence configuration container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntelligenceConfig {
    /// Fragility penalty tunables
    pub fragility: FragilityTuning,
    /// Plan generation tunables
    pub planning: PlanningTuning,
}

impl IntelligenceConfig {
    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        INTELLIGENCE_CONFIG.get_or_init(|| {
            Self::from_env().unwrap_or_else(|e| {
                warn!("Failed to load intelligence config: {e}, using defaults");
                Self::default()
            })
        })
    }

    /// Load configuration from defaults plus `TRI_PLANNER_*` environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found
    // Long function: Ordered checks over every fragility and planning tunable
    #[allow(clippy::too_many_lines)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.fragility;
        if f.critical_sleep_hours >= f.optimal_sleep_hours {
            return Err(ConfigError::InvalidRange(
                "critical_sleep_hours must be < optimal_sleep_hours",
            ));
        }
        if f.severe_sleep_slope <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "severe_sleep_slope must be positive",
            ));
        }
        for penalty in [
            f.stress_penalty_low,
            f.stress_penalty_moderate,
            f.stress_penalty_high,
            f.hrv_penalty_increasing,
            f.hrv_penalty_stable,
            f.hrv_penalty_decreasing,
            f.hrv_penalty_unknown,
            f.consistency_penalty_share,
            f.distant_race_pressure,
        ] {
            if !(0.0..=1.0).contains(&penalty) {
                return Err(ConfigError::ValueOutOfRange(
                    "stress, HRV and timeline penalties must be within [0, 1]",
                ));
            }
        }
        if f.stress_penalty_low > f.stress_penalty_moderate
            || f.stress_penalty_moderate > f.stress_penalty_high
        {
            return Err(ConfigError::InvalidRange(
                "stress penalties must be ascending low <= moderate <= high",
            ));
        }
        if f.min_healthy_volume_hours <= 0.0
            || f.min_healthy_volume_hours >= f.max_healthy_volume_hours
        {
            return Err(ConfigError::InvalidRange(
                "min_healthy_volume_hours must be positive and < max_healthy_volume_hours",
            ));
        }
        if f.min_consistency_weeks == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "min_consistency_weeks must be at least 1",
            ));
        }
        if f.timeline_pressure.is_empty()
            || f
                .timeline_pressure
                .windows(2)
                .any(|pair| pair[0].0 >= pair[1].0)
        {
            return Err(ConfigError::InvalidRange(
                "timeline_pressure steps must be non-empty with ascending week limits",
            ));
        }
        if f.hrv_decreasing_amplifier < 1.0 || !(0.0..=1.0).contains(&f.hrv_increasing_dampener) {
            return Err(ConfigError::ValueOutOfRange(
                "HRV amplifier must be >= 1 and dampener within [0, 1]",
            ));
        }
        if (f.recovery_hrv_weight + f.recovery_illness_weight - 1.0).abs() > 0.01 {
            return Err(ConfigError::InvalidWeights(
                "Recovery HRV and illness weights must sum to 1.0",
            ));
        }
        if !(0.0 < f.low_risk_ceiling
            && f.low_risk_ceiling < f.moderate_risk_ceiling
            && f.moderate_risk_ceiling < f.high_risk_ceiling
            && f.high_risk_ceiling <= 1.0)
        {
            return Err(ConfigError::InvalidRange(
                "risk ceilings must be ascending within (0, 1]",
            ));
        }
        if f.max_recommendations == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "max_recommendations must be at least 1",
            ));
        }

        let p = &self.planning;
        if p.hi_sessions_by_risk.windows(2).any(|pair| pair[0] < pair[1]) {
            return Err(ConfigError::InvalidRange(
                "hard-session caps must not increase with risk",
            ));
        }
        if p.hi_sessions_by_risk[0] > 4 {
            return Err(ConfigError::ValueOutOfRange(
                "at most four hard sessions per week fit the minimum spacing",
            ));
        }
        if p.min_hard_session_gap_days == 0 || p.min_hard_session_gap_days > 6 {
            return Err(ConfigError::ValueOutOfRange(
                "min_hard_session_gap_days must be within 1-6",
            ));
        }
        if !(0.0 < p.long_workout_fraction && p.long_workout_fraction < 1.0) {
            return Err(ConfigError::ValueOutOfRange(
                "long_workout_fraction must be within (0, 1)",
            ));
        }
        if p.taper_multipliers
            .iter()
            .any(|multiplier| !(0.0 < *multiplier && *multiplier <= 1.0))
        {
            return Err(ConfigError::ValueOutOfRange(
                "taper multipliers must be within (0, 1]",
            ));
        }
        if p.build_volume_multiplier < 1.0 || p.build_volume_multiplier > 1.5 {
            return Err(ConfigError::ValueOutOfRange(
                "build_volume_multiplier must be within [1.0, 1.5]",
            ));
        }
        if p.min_planning_volume_hours <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "min_planning_volume_hours must be positive",
            ));
        }
        if p.default_plan_weeks == 0 || p.default_plan_weeks > 52 {
            return Err(ConfigError::ValueOutOfRange(
                "default_plan_weeks must be within 1-52",
            ));
        }
        Ok(())
    }

    /// Helper function to parse and apply an environment variable override
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Fragility overrides
        Self::apply_env_var(
            "TRI_PLANNER_OPTIMAL_SLEEP_HOURS",
            &mut self.fragility.optimal_sleep_hours,
        )?;
        Self::apply_env_var(
            "TRI_PLANNER_CRITICAL_SLEEP_HOURS",
            &mut self.fragility.critical_sleep_hours,
        )?;
        Self::apply_env_var(
            "TRI_PLANNER_SEVERE_SLEEP_SLOPE",
            &mut self.fragility.severe_sleep_slope,
        )?;
        Self::apply_env_var(
            "TRI_PLANNER_MIN_HEALTHY_VOLUME_HOURS",
            &mut self.fragility.min_healthy_volume_hours,
        )?;
        Self::apply_env_var(
            "TRI_PLANNER_MAX_HEALTHY_VOLUME_HOURS",
            &mut self.fragility.max_healthy_volume_hours,
        )?;
        Self::apply_env_var(
            "TRI_PLANNER_MIN_CONSISTENCY_WEEKS",
            &mut self.fragility.min_consistency_weeks,
        )?;
        Self::apply_env_var(
            "TRI_PLANNER_DEFAULT_WEEKS_TO_RACE",
            &mut self.fragility.default_weeks_to_race,
        )?;
        Self::apply_env_var(
            "TRI_PLANNER_MAX_RECOMMENDATIONS",
            &mut self.fragility.max_recommendations,
        )?;

        // Planning overrides
        Self::apply_env_var(
            "TRI_PLANNER_MIN_HARD_SESSION_GAP_DAYS",
            &mut self.planning.min_hard_session_gap_days,
        )?;
        Self::apply_env_var(
            "TRI_PLANNER_LONG_WORKOUT_FRACTION",
            &mut self.planning.long_workout_fraction,
        )?;
        Self::apply_env_var(
            "TRI_PLANNER_BUILD_VOLUME_MULTIPLIER",
            &mut self.planning.build_volume_multiplier,
        )?;
        Self::apply_env_var(
            "TRI_PLANNER_MIN_PLANNING_VOLUME_HOURS",
            &mut self.planning.min_planning_volume_hours,
        )?;
        Self::apply_env_var(
            "TRI_PLANNER_DEFAULT_PLAN_WEEKS",
            &mut self.planning.default_plan_weeks,
        )?;

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(IntelligenceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_sleep_thresholds_rejected() {
        let mut config = IntelligenceConfig::default();
        config.fragility.critical_sleep_hours = 9.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_recovery_weights_must_sum_to_one() {
        let mut config = IntelligenceConfig::default();
        config.fragility.recovery_illness_weight = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_increasing_hi_caps_rejected() {
        let mut config = IntelligenceConfig::default();
        config.planning.hi_sessions_by_risk = [1, 2, 1, 0];
        assert!(config.validate().is_err());
    }
}
