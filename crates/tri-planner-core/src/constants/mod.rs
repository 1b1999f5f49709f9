// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Schema bounds, fragility defaults, and planning defaults for the decision engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped by domain. Algorithm tunables here are the *defaults*
//! of `IntelligenceConfig` in the intelligence crate; schema bounds are fixed.

/// Inclusive bounds enforced on user profile documents
pub mod profile_bounds {
    /// Minimum average nightly sleep (hours)
    pub const SLEEP_HOURS_MIN: f64 = 4.0;
    /// Maximum average nightly sleep (hours)
    pub const SLEEP_HOURS_MAX: f64 = 12.0;
    /// Maximum weekly training volume (hours)
    pub const WEEKLY_VOLUME_MAX: f64 = 40.0;
    /// Maximum tracked volume consistency (weeks)
    pub const CONSISTENCY_WEEKS_MAX: u32 = 52;
    /// Resting heart rate bounds (bpm)
    pub const RESTING_HR_MIN: u32 = 30;
    /// Resting heart rate upper bound (bpm)
    pub const RESTING_HR_MAX: u32 = 100;
    /// Weeks-to-race bounds
    pub const WEEKS_TO_RACE_MIN: u32 = 1;
    /// Weeks-to-race upper bound
    pub const WEEKS_TO_RACE_MAX: u32 = 52;
    /// Training days per week bounds
    pub const TRAINING_DAYS_MIN: u8 = 1;
    /// Training days per week upper bound
    pub const TRAINING_DAYS_MAX: u8 = 7;
    /// Maximum single session duration bounds (hours)
    pub const MAX_SESSION_HOURS_MIN: f64 = 0.5;
    /// Maximum single session duration upper bound (hours)
    pub const MAX_SESSION_HOURS_MAX: f64 = 8.0;
    /// Default available training days
    pub const DEFAULT_TRAINING_DAYS: u8 = 6;
    /// Default maximum session duration (hours)
    pub const DEFAULT_MAX_SESSION_HOURS: f64 = 2.5;
}

/// Inclusive bounds enforced on methodology documents
pub mod methodology_bounds {
    /// Maximum number of assumptions a methodology may declare
    pub const MAX_ASSUMPTIONS: usize = 15;
    /// Tolerance when checking that fractions sum to 1.0
    pub const DISTRIBUTION_SUM_TOLERANCE: f64 = 0.01;
    /// Tolerance when checking that risk weights sum to at most 1.0
    pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;
    /// Maximum intensity distribution tolerance (percent)
    pub const MAX_TOLERANCE_PERCENT: f64 = 10.0;
    /// Maximum consecutive hard sessions of the same type
    pub const MAX_CONSECUTIVE_SAME_TYPE: u8 = 3;
}

/// Fragility scoring defaults
pub mod fragility {
    /// Sleep at or above this incurs no penalty (hours)
    pub const OPTIMAL_SLEEP_HOURS: f64 = 8.0;
    /// Below this sleep the penalty slope steepens (hours)
    pub const CRITICAL_SLEEP_HOURS: f64 = 7.0;
    /// Penalty per hour below the critical threshold
    pub const SEVERE_SLEEP_SLOPE: f64 = 0.375;
    /// Stress penalty for low stress
    pub const STRESS_PENALTY_LOW: f64 = 0.0;
    /// Stress penalty for moderate stress
    pub const STRESS_PENALTY_MODERATE: f64 = 0.3;
    /// Stress penalty for high stress
    pub const STRESS_PENALTY_HIGH: f64 = 1.0;
    /// Lower edge of the healthy weekly volume band (hours)
    pub const MIN_HEALTHY_VOLUME_HOURS: f64 = 6.0;
    /// Upper edge of the healthy weekly volume band (hours)
    pub const MAX_HEALTHY_VOLUME_HOURS: f64 = 20.0;
    /// Weeks of steady volume before no consistency penalty applies
    pub const MIN_CONSISTENCY_WEEKS: u32 = 4;
    /// Share of the volume penalty attributed to inconsistency
    pub const CONSISTENCY_PENALTY_SHARE: f64 = 0.5;
    /// Weeks-to-race assumed when none is supplied
    pub const DEFAULT_WEEKS_TO_RACE: u32 = 12;
    /// Timeline pressure (weeks bound, penalty), evaluated in order
    pub const TIMELINE_PRESSURE: [(u32, f64); 3] = [(4, 0.8), (8, 0.4), (12, 0.2)];
    /// Timeline pressure beyond the last bound
    pub const DISTANT_RACE_PRESSURE: f64 = 0.1;
    /// Intensity penalty multiplier when HRV is decreasing
    pub const HRV_DECREASING_AMPLIFIER: f64 = 1.5;
    /// Intensity penalty multiplier when HRV is increasing
    pub const HRV_INCREASING_DAMPENER: f64 = 0.7;
    /// Recovery penalty per HRV trend
    pub const HRV_PENALTY_INCREASING: f64 = 0.0;
    /// Recovery penalty for a stable HRV
    pub const HRV_PENALTY_STABLE: f64 = 0.3;
    /// Recovery penalty for a decreasing HRV
    pub const HRV_PENALTY_DECREASING: f64 = 1.0;
    /// Recovery penalty when HRV is not tracked
    pub const HRV_PENALTY_UNKNOWN: f64 = 0.5;
    /// Weight of HRV inside the recovery-quality penalty
    pub const RECOVERY_HRV_WEIGHT: f64 = 0.7;
    /// Weight of recent illness inside the recovery-quality penalty
    pub const RECOVERY_ILLNESS_WEIGHT: f64 = 0.3;
    /// Upper bound (exclusive) of the Low bucket
    pub const LOW_RISK_CEILING: f64 = 0.4;
    /// Upper bound (exclusive) of the Moderate bucket
    pub const MODERATE_RISK_CEILING: f64 = 0.6;
    /// Upper bound (exclusive) of the High bucket
    pub const HIGH_RISK_CEILING: f64 = 0.8;
    /// Maximum number of targeted recommendations
    pub const MAX_RECOMMENDATIONS: usize = 3;
}

/// Plan generation defaults
pub mod planning {
    /// Plan length when weeks-to-race is unknown
    pub const DEFAULT_PLAN_WEEKS: u32 = 12;
    /// Hard sessions per week by risk bucket (low, moderate, high, critical)
    pub const HI_SESSIONS_BY_RISK: [u8; 4] = [3, 2, 1, 0];
    /// Minimum calendar-day gap between two hard sessions
    pub const MIN_HARD_SESSION_GAP_DAYS: u8 = 2;
    /// Minimum weekly run sessions
    pub const MIN_RUN_SESSIONS: u8 = 2;
    /// Minimum weekly bike sessions
    pub const MIN_BIKE_SESSIONS: u8 = 2;
    /// Minimum weekly swim sessions
    pub const MIN_SWIM_SESSIONS: u8 = 1;
    /// Share of the weekly volume assigned to the long workout
    pub const LONG_WORKOUT_FRACTION: f64 = 0.35;
    /// Volume multiplier for build-phase load weeks
    pub const BUILD_VOLUME_MULTIPLIER: f64 = 1.05;
    /// Volume multipliers for the taper, counted back from race week
    pub const TAPER_MULTIPLIERS: [f64; 3] = [0.4, 0.6, 0.7];
    /// Planning floor for weekly volume (hours)
    pub const MIN_PLANNING_VOLUME_HOURS: f64 = 3.0;
    /// Session duration bounds (minutes)
    pub const MIN_SESSION_MINUTES: u32 = 5;
    /// Session duration upper bound (minutes)
    pub const MAX_SESSION_MINUTES: u32 = 360;
    /// Plan length at or below which the short phase split applies
    pub const SHORT_PLAN_MAX_WEEKS: u32 = 6;
    /// Plan length at or below which the medium phase split applies
    pub const MEDIUM_PLAN_MAX_WEEKS: u32 = 12;
    /// Maximum taper length (weeks)
    pub const MAX_TAPER_WEEKS: u32 = 2;
}

/// Trace export defaults
pub mod trace {
    /// Prefix of persisted trace file names
    pub const FILE_PREFIX: &str = "trace";
    /// Timestamp layout used in persisted trace file names
    pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
    /// Placeholder rendered for absent bridge template values
    pub const MISSING_PLACEHOLDER: &str = "N/A";
}
