// ABOUTME: Plan generation tunables: hard-session caps, spacing, sport minimums, volume multipliers
// ABOUTME: Defaults mirror tri-planner-core constants; overridable through the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use tri_planner_core::constants::planning;
use tri_planner_core::models::RiskLevel;

/// Tunables for phase allocation and weekly scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningTuning {
    /// Hard sessions per week for low, moderate, high and critical risk
    pub hi_sessions_by_risk: [u8; 4],
    /// Minimum calendar-day gap between hard sessions
    pub min_hard_session_gap_days: u8,
    /// Weekly run sessions to aim for
    pub min_run_sessions: u8,
    /// Weekly bike sessions to aim for
    pub min_bike_sessions: u8,
    /// Weekly swim sessions to aim for
    pub min_swim_sessions: u8,
    /// Share of weekly volume in the long workout
    pub long_workout_fraction: f64,
    /// Volume multiplier for build weeks
    pub build_volume_multiplier: f64,
    /// Taper multipliers: last week, second to last, earlier
    pub taper_multipliers: [f64; 3],
    /// Weekly volume floor used for planning (hours)
    pub min_planning_volume_hours: f64,
    /// Plan length when weeks to race is unknown
    pub default_plan_weeks: u32,
}

impl Default for PlanningTuning {
    fn default() -> Self {
        Self {
            hi_sessions_by_risk: planning::HI_SESSIONS_BY_RISK,
            min_hard_session_gap_days: planning::MIN_HARD_SESSION_GAP_DAYS,
            min_run_sessions: planning::MIN_RUN_SESSIONS,
            min_bike_sessions: planning::MIN_BIKE_SESSIONS,
            min_swim_sessions: planning::MIN_SWIM_SESSIONS,
            long_workout_fraction: planning::LONG_WORKOUT_FRACTION,
            build_volume_multiplier: planning::BUILD_VOLUME_MULTIPLIER,
            taper_multipliers: planning::TAPER_MULTIPLIERS,
            min_planning_volume_hours: planning::MIN_PLANNING_VOLUME_HOURS,
            default_plan_weeks: planning::DEFAULT_PLAN_WEEKS,
        }
    }
}

impl PlanningTuning {
    /// Hard-session cap for a risk bucket
    #[must_use]
    pub const fn hi_sessions_for(&self, risk: RiskLevel) -> u8 {
        match risk {
            RiskLevel::Low => self.hi_sessions_by_risk[0],
            RiskLevel::Moderate => self.hi_sessions_by_risk[1],
            RiskLevel::High => self.hi_sessions_by_risk[2],
            RiskLevel::Critical => self.hi_sessions_by_risk[3],
        }
    }
}
