// ABOUTME: Training plan model: phases, weeks, sessions, intensity zones and plan decisions
// ABOUTME: Built once per generation; volume and intensity metrics are computed, never stored mutable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::{RaceDistance, Weekday};
use crate::constants::planning::{MAX_SESSION_MINUTES, MIN_SESSION_MINUTES};
use crate::errors::SchemaError;

/// Physiological intensity zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityZone {
    /// Very easy, promotes blood flow
    ActiveRecovery,
    /// Aerobic base
    Endurance,
    /// Moderate sustained effort
    Tempo,
    /// Lactate threshold
    Threshold,
    /// Maximal aerobic capacity
    Vo2max,
    /// Above threshold, short efforts
    Anaerobic,
    /// Neuromuscular, all-out
    Sprint,
    /// Complete rest
    Rest,
}

/// Category used for intensity distribution accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneCategory {
    /// Active recovery and endurance
    Low,
    /// Tempo and threshold
    Threshold,
    /// VO2max, anaerobic and sprint
    High,
}

impl IntensityZone {
    /// Distribution category, `None` for rest
    #[must_use]
    pub const fn category(&self) -> Option<ZoneCategory> {
        match self {
            Self::ActiveRecovery | Self::Endurance => Some(ZoneCategory::Low),
            Self::Tempo | Self::Threshold => Some(ZoneCategory::Threshold),
            Self::Vo2max | Self::Anaerobic | Self::Sprint => Some(ZoneCategory::High),
            Self::Rest => None,
        }
    }

    /// Easy aerobic work or rest
    #[must_use]
    pub const fn is_low_intensity(&self) -> bool {
        !matches!(
            self.category(),
            Some(ZoneCategory::Threshold | ZoneCategory::High)
        )
    }

    /// Zone 3 and above: occupies a hard-session slot
    #[must_use]
    pub const fn is_hard(&self) -> bool {
        !self.is_low_intensity()
    }

    /// Zone 4-5
    #[must_use]
    pub const fn is_high_intensity(&self) -> bool {
        matches!(self.category(), Some(ZoneCategory::High))
    }

    /// Parse the zone names accepted in hard-session templates
    #[must_use]
    pub fn parse_template_zone(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "zone_3" | "threshold" => Some(Self::Threshold),
            "tempo" => Some(Self::Tempo),
            "zone_4" | "vo2max" => Some(Self::Vo2max),
            "zone_5" | "anaerobic" => Some(Self::Anaerobic),
            "sprint" => Some(Self::Sprint),
            _ => None,
        }
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ActiveRecovery => "active_recovery",
            Self::Endurance => "endurance",
            Self::Tempo => "tempo",
            Self::Threshold => "threshold",
            Self::Vo2max => "vo2max",
            Self::Anaerobic => "anaerobic",
            Self::Sprint => "sprint",
            Self::Rest => "rest",
        }
    }
}

/// Kind of session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// Swim
    Swim,
    /// Bike
    Bike,
    /// Run
    Run,
    /// Bike-run transition
    Brick,
    /// Strength
    Strength,
    /// Rest
    Rest,
}

impl SessionType {
    /// Parse one of the three triathlon disciplines
    #[must_use]
    pub fn parse_sport(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "swim" => Some(Self::Swim),
            "bike" => Some(Self::Bike),
            "run" => Some(Self::Run),
            _ => None,
        }
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Swim => "swim",
            Self::Bike => "bike",
            Self::Run => "run",
            Self::Brick => "brick",
            Self::Strength => "strength",
            Self::Rest => "rest",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sport-specific zone label: FTP bands for bike, pace for run, CSS for swim
#[must_use]
pub const fn zone_display(session_type: SessionType, zone: IntensityZone) -> &'static str {
    match (session_type, zone) {
        (SessionType::Bike, IntensityZone::ActiveRecovery) => "Z1 (Recovery) - <55% FTP",
        (SessionType::Bike, IntensityZone::Endurance) => "Z2 (Endurance) - 56-75% FTP",
        (SessionType::Bike, IntensityZone::Tempo) => "Z3 (Tempo) - 76-90% FTP",
        (SessionType::Bike, IntensityZone::Threshold) => "Z4 (Threshold) - 91-105% FTP",
        (SessionType::Bike, IntensityZone::Vo2max) => "Z5 (VO2max) - 106-120% FTP",
        (SessionType::Bike, IntensityZone::Anaerobic) => "Z6 (Anaerobic) - 121-150% FTP",
        (SessionType::Bike, IntensityZone::Sprint) => "Z7 (Neuromuscular) - max power",
        (SessionType::Run, IntensityZone::ActiveRecovery) => "Recovery pace - very easy",
        (SessionType::Run, IntensityZone::Endurance) => "Easy pace - conversational",
        (SessionType::Run, IntensityZone::Tempo) => "Tempo pace - comfortably hard",
        (SessionType::Run, IntensityZone::Threshold) => "Threshold pace - sustainable 60min",
        (SessionType::Run, IntensityZone::Vo2max) => "VO2max pace - 3-8min race effort",
        (SessionType::Run, IntensityZone::Anaerobic) => "Repetition pace - 1-2min max effort",
        (SessionType::Run, IntensityZone::Sprint) => "Sprint - all-out strides/sprints",
        (SessionType::Swim, IntensityZone::ActiveRecovery) => "Recovery - easy drill work",
        (SessionType::Swim, IntensityZone::Endurance) => "Endurance - CSS pace -10sec/100m",
        (SessionType::Swim, IntensityZone::Tempo) => "Tempo - CSS pace -5sec/100m",
        (SessionType::Swim, IntensityZone::Threshold) => "Threshold - CSS pace",
        (SessionType::Swim, IntensityZone::Vo2max) => "VO2max - CSS pace +5sec/100m",
        (SessionType::Swim, IntensityZone::Anaerobic) => "Anaerobic - near max 100m pace",
        (SessionType::Swim, IntensityZone::Sprint) => "Sprint - all-out 25m/50m",
        (_, zone) => zone.as_str(),
    }
}

/// Training phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPhase {
    /// Aerobic foundation
    Base,
    /// Rising intensity and volume
    Build,
    /// Maximum specificity
    Peak,
    /// Reduced volume before the race
    Taper,
}

impl TrainingPhase {
    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Build => "build",
            Self::Peak => "peak",
            Self::Taper => "taper",
        }
    }
}

impl fmt::Display for TrainingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a week inside its mesocycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekType {
    /// Progressive overload
    #[default]
    Load,
    /// Deload
    Recovery,
}

/// One workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSession {
    /// Day of the week
    pub day: Weekday,
    /// Sport
    pub session_type: SessionType,
    /// Primary zone
    pub primary_zone: IntensityZone,
    /// Duration (minutes, 5-360)
    pub duration_minutes: u32,
    /// Human-readable description
    pub description: String,
    /// Interval prescription for hard sessions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_details: Option<String>,
}

/// Scheduling constraint that had to be loosened for a week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxedConstraint {
    /// Weekly per-sport minimums could not all be met
    SportFrequencyMinimum,
    /// Fewer hard sessions than the fragility cap allows
    HighIntensityCount,
    /// Weekly zone split deviates from the methodology target
    IntensityDistribution,
    /// Preferred long-workout day unavailable
    LongWorkoutDay,
    /// Hard sessions of one sport ran past the methodology's consecutive limit
    ConsecutiveSessionType,
}

impl RelaxedConstraint {
    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SportFrequencyMinimum => "sport_frequency_minimum",
            Self::HighIntensityCount => "high_intensity_count",
            Self::IntensityDistribution => "intensity_distribution",
            Self::LongWorkoutDay => "long_workout_day",
            Self::ConsecutiveSessionType => "consecutive_session_type",
        }
    }
}

/// Record of a constraint relaxation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRelaxation {
    /// Which constraint
    pub constraint: RelaxedConstraint,
    /// What happened
    pub detail: String,
}

/// Share of minutes per category, in percent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IntensityDistributionSummary {
    /// Active recovery + endurance
    pub low_intensity_percent: f64,
    /// Tempo + threshold
    pub threshold_percent: f64,
    /// VO2max + anaerobic + sprint
    pub high_intensity_percent: f64,
}

impl IntensityDistributionSummary {
    fn from_sessions<'a>(sessions: impl Iterator<Item = &'a TrainingSession>) -> Self {
        let mut minutes: BTreeMap<ZoneCategory, f64> = BTreeMap::new();
        for session in sessions {
            if let Some(category) = session.primary_zone.category() {
                *minutes.entry(category).or_insert(0.0) += f64::from(session.duration_minutes);
            }
        }
        let total: f64 = minutes.values().sum();
        if total <= 0.0 {
            return Self::default();
        }
        let share = |category| minutes.get(&category).copied().unwrap_or(0.0) / total * 100.0;
        Self {
            low_intensity_percent: share(ZoneCategory::Low),
            threshold_percent: share(ZoneCategory::Threshold),
            high_intensity_percent: share(ZoneCategory::High),
        }
    }
}

/// One week of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingWeek {
    /// 1-based week number
    pub week_number: u32,
    /// Phase
    pub phase: TrainingPhase,
    /// Load or recovery
    pub week_type: WeekType,
    /// Mesocycle number, `None` in the taper
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesocycle_number: Option<u32>,
    /// Position in the mesocycle, `None` in the taper
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesocycle_week: Option<u32>,
    /// Multiplier applied to the athlete's base volume
    pub volume_multiplier: f64,
    /// Volume the scheduler aimed for (hours)
    pub target_volume_hours: f64,
    /// Sessions in day order
    pub sessions: Vec<TrainingSession>,
    /// Coach notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Constraints loosened while scheduling this week
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relaxations: Vec<ConstraintRelaxation>,
}

impl TrainingWeek {
    /// Scheduled volume (hours)
    #[must_use]
    pub fn total_volume_hours(&self) -> f64 {
        f64::from(self.sessions.iter().map(|s| s.duration_minutes).sum::<u32>()) / 60.0
    }

    /// Zone split of this week
    #[must_use]
    pub fn intensity_distribution(&self) -> IntensityDistributionSummary {
        IntensityDistributionSummary::from_sessions(self.sessions.iter())
    }

    /// Days carrying a hard (zone 3+) session, in calendar order
    #[must_use]
    pub fn hard_days(&self) -> Vec<Weekday> {
        let mut days: Vec<_> = self
            .sessions
            .iter()
            .filter(|s| s.primary_zone.is_hard())
            .map(|s| s.day)
            .collect();
        days.sort();
        days
    }

    /// Number of hard (zone 3+) sessions
    #[must_use]
    pub fn hard_session_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.primary_zone.is_hard())
            .count()
    }

    /// Number of zone 4-5 sessions
    #[must_use]
    pub fn high_intensity_session_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.primary_zone.is_high_intensity())
            .count()
    }

    /// Sessions of a given sport
    #[must_use]
    pub fn sessions_of(&self, sport: SessionType) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.session_type == sport)
            .count()
    }

    /// Structural checks on the week
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for more than seven sessions, two sessions on
    /// one day, or a duration outside 5-360 minutes
    pub fn validate(&self) -> Result<(), SchemaError> {
        let field = format!("weeks[{}].sessions", self.week_number);
        if self.sessions.len() > 7 {
            return Err(SchemaError::TooMany {
                field,
                count: self.sessions.len(),
                max: 7,
            });
        }
        let mut days = HashSet::new();
        for session in &self.sessions {
            if !days.insert(session.day) {
                return Err(SchemaError::DuplicateKey {
                    field,
                    key: session.day.to_string(),
                });
            }
            SchemaError::check_range(
                &format!("{field}.duration_minutes"),
                f64::from(session.duration_minutes),
                f64::from(MIN_SESSION_MINUTES),
                f64::from(MAX_SESSION_MINUTES),
            )?;
        }
        Ok(())
    }
}

/// A documented planning decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDecision {
    /// What was decided
    pub decision_point: String,
    /// Inputs, as `name=value`
    pub input_factors: Vec<String>,
    /// Why
    pub reasoning: String,
    /// Result
    pub outcome: String,
}

/// Complete multi-week plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    /// Unique plan identifier
    pub plan_id: Uuid,
    /// Athlete
    pub athlete_id: String,
    /// Methodology used
    pub methodology_id: String,
    /// First day of week 1
    pub start_date: NaiveDate,
    /// Number of weeks
    pub duration_weeks: u32,
    /// Race date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_date: Option<NaiveDate>,
    /// Race distance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_distance: Option<RaceDistance>,
    /// Fragility score the plan was built with
    pub fragility_score: f64,
    /// Weeks in order
    pub weeks: Vec<TrainingWeek>,
    /// Decisions taken while generating
    pub plan_decisions: Vec<PlanDecision>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl TrainingPlan {
    /// Zone split across the whole plan
    #[must_use]
    pub fn intensity_distribution(&self) -> IntensityDistributionSummary {
        IntensityDistributionSummary::from_sessions(
            self.weeks.iter().flat_map(|week| week.sessions.iter()),
        )
    }

    /// Mean scheduled weekly volume (hours)
    #[must_use]
    pub fn average_weekly_volume(&self) -> f64 {
        if self.weeks.is_empty() {
            return 0.0;
        }
        self.weeks
            .iter()
            .map(TrainingWeek::total_volume_hours)
            .sum::<f64>()
            / self.weeks.len() as f64
    }

    /// Mean hard sessions per week
    #[must_use]
    pub fn average_hi_sessions_per_week(&self) -> f64 {
        if self.weeks.is_empty() {
            return 0.0;
        }
        self.weeks
            .iter()
            .map(TrainingWeek::hard_session_count)
            .sum::<usize>() as f64
            / self.weeks.len() as f64
    }

    /// Weeks per phase
    #[must_use]
    pub fn phase_breakdown(&self) -> BTreeMap<TrainingPhase, u32> {
        let mut counts = BTreeMap::new();
        for week in &self.weeks {
            *counts.entry(week.phase).or_insert(0) += 1;
        }
        counts
    }

    /// First week that is not in the taper
    #[must_use]
    pub fn first_non_taper_week(&self) -> Option<&TrainingWeek> {
        self.weeks
            .iter()
            .find(|week| week.phase != TrainingPhase::Taper)
    }

    /// Structural checks on the plan
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when the week count or numbering is wrong,
    /// the fragility score is out of range, or any week is malformed
    pub fn validate(&self) -> Result<(), SchemaError> {
        SchemaError::check_range("fragility_score", self.fragility_score, 0.0, 1.0)?;
        if self.weeks.len() != self.duration_weeks as usize {
            return Err(SchemaError::Invalid {
                field: "weeks".into(),
                reason: format!(
                    "expected {} weeks but got {}",
                    self.duration_weeks,
                    self.weeks.len()
                ),
            });
        }
        for (expected, week) in (1..).zip(&self.weeks) {
            if week.week_number != expected {
                return Err(SchemaError::Invalid {
                    field: "weeks".into(),
                    reason: format!(
                        "week numbering must be sequential: expected {expected}, got {}",
                        week.week_number
                    ),
                });
            }
            week.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(day: Weekday, zone: IntensityZone, minutes: u32) -> TrainingSession {
        TrainingSession {
            day,
            session_type: SessionType::Run,
            primary_zone: zone,
            duration_minutes: minutes,
            description: "test session".into(),
            workout_details: None,
        }
    }

    fn week(sessions: Vec<TrainingSession>) -> TrainingWeek {
        TrainingWeek {
            week_number: 1,
            phase: TrainingPhase::Base,
            week_type: WeekType::Load,
            mesocycle_number: Some(1),
            mesocycle_week: Some(1),
            volume_multiplier: 1.0,
            target_volume_hours: 2.0,
            sessions,
            notes: None,
            relaxations: Vec::new(),
        }
    }

    #[test]
    fn test_week_distribution_is_computed() {
        let w = week(vec![
            session(Weekday::Monday, IntensityZone::Endurance, 80),
            session(Weekday::Wednesday, IntensityZone::Vo2max, 20),
        ]);
        let dist = w.intensity_distribution();
        assert!((dist.low_intensity_percent - 80.0).abs() < 1e-9);
        assert!((dist.high_intensity_percent - 20.0).abs() < 1e-9);
        assert_eq!(w.hard_days(), vec![Weekday::Wednesday]);
        assert!((w.total_volume_hours() - 100.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_day_rejected() {
        let w = week(vec![
            session(Weekday::Monday, IntensityZone::Endurance, 60),
            session(Weekday::Monday, IntensityZone::Endurance, 60),
        ]);
        assert!(matches!(w.validate(), Err(SchemaError::DuplicateKey { .. })));
    }

    #[test]
    fn test_template_zone_aliases() {
        assert_eq!(
            IntensityZone::parse_template_zone("zone_4"),
            Some(IntensityZone::Vo2max)
        );
        assert_eq!(
            IntensityZone::parse_template_zone("Threshold"),
            Some(IntensityZone::Threshold)
        );
        assert!(IntensityZone::Tempo.is_hard());
        assert!(!IntensityZone::Tempo.is_high_intensity());
        assert_eq!(IntensityZone::parse_template_zone("zone_2"), None);
    }
}
