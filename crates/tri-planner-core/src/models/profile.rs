// ABOUTME: Athlete profile model: current state, history, goals, constraints and preferences
// ABOUTME: Serde document shape plus schema validation applied before any engine logic runs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::profile_bounds;
use crate::errors::SchemaError;

/// Perceived life stress level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    /// Low stress
    Low,
    /// Moderate stress
    Moderate,
    /// High stress
    High,
}

impl StressLevel {
    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    /// Parse a wire name
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "moderate" => Some(Self::Moderate),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Heart rate variability trend over recent weeks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrvTrend {
    /// HRV rising: recovery improving
    Increasing,
    /// HRV flat
    Stable,
    /// HRV falling: accumulated fatigue
    Decreasing,
    /// Not tracked
    #[default]
    Unknown,
}

impl HrvTrend {
    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Stable => "stable",
            Self::Decreasing => "decreasing",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a wire name
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "increasing" => Some(Self::Increasing),
            "stable" => Some(Self::Stable),
            "decreasing" => Some(Self::Decreasing),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Menstrual cycle phase, when tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenstrualPhase {
    /// Follicular phase
    Follicular,
    /// Ovulation
    Ovulation,
    /// Luteal phase
    Luteal,
    /// Menstruation
    Menstruation,
    /// Not tracked or not applicable
    #[default]
    NotApplicable,
}

/// Primary training goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryGoal {
    /// Race performance
    RacePerformance,
    /// Aerobic base building
    BaseBuilding,
    /// Weight loss
    WeightLoss,
    /// General fitness
    GeneralFitness,
    /// Injury prevention
    InjuryPrevention,
}

/// Triathlon race distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceDistance {
    /// Sprint distance
    Sprint,
    /// Olympic distance
    Olympic,
    /// Half Ironman
    HalfIronman,
    /// Full Ironman
    Ironman,
    /// Ironman 70.3
    #[serde(rename = "70.3")]
    SeventyThree,
    /// Anything else
    Other,
}

impl RaceDistance {
    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sprint => "sprint",
            Self::Olympic => "olympic",
            Self::HalfIronman => "half_ironman",
            Self::Ironman => "ironman",
            Self::SeventyThree => "70.3",
            Self::Other => "other",
        }
    }
}

/// Priority of the target race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RacePriority {
    /// Key race
    A,
    /// Important
    #[default]
    B,
    /// Training race
    C,
}

/// Preferred intensity distribution family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityPreference {
    /// Mostly easy plus hard, little threshold
    Polarized,
    /// Decreasing volume with intensity
    Pyramidal,
    /// Threshold emphasis
    Threshold,
    /// No preference
    Flexible,
}

/// Climate the athlete trains in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Climate {
    /// Hot and humid
    HotHumid,
    /// Hot and dry
    HotDry,
    /// Temperate
    Temperate,
    /// Cold
    Cold,
    /// Variable
    Variable,
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl Weekday {
    /// All days in calendar order starting Monday
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Zero-based position in the week (Monday = 0)
    #[must_use]
    pub const fn index(&self) -> u8 {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    /// Parse a wire name
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.as_str() == value)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Athlete's current physiological and life state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentState {
    /// Average nightly sleep (hours)
    pub sleep_hours: f64,
    /// Sleep regularity score (0-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_consistency: Option<f64>,
    /// Currently injured
    #[serde(default)]
    pub injury_status: bool,
    /// Injury description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injury_details: Option<String>,
    /// Perceived stress
    pub stress_level: StressLevel,
    /// Stress description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_details: Option<String>,
    /// Current weekly training volume (hours)
    pub weekly_volume_hours: f64,
    /// Consecutive weeks at a steady volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_consistency_weeks: Option<u32>,
    /// Resting heart rate (bpm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resting_heart_rate: Option<u32>,
    /// HRV trend
    #[serde(default)]
    pub hrv_trend: HrvTrend,
    /// Illness in the last two weeks
    #[serde(default)]
    pub recent_illness: bool,
    /// Menstrual cycle phase
    #[serde(default)]
    pub menstrual_cycle_phase: MenstrualPhase,
}

/// A completed race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    /// Race date
    #[serde(rename = "date")]
    pub race_date: NaiveDate,
    /// Race distance
    pub distance: RaceDistance,
    /// Finish time `HH:MM:SS`
    pub finish_time: String,
}

/// A past injury
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryHistoryItem {
    /// Injury type
    pub injury_type: String,
    /// When the injury occurred
    pub date_occurred: NaiveDate,
    /// Whether it has fully resolved
    pub resolved: bool,
}

/// Training background
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// Years of structured endurance training
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_training: Option<f64>,
    /// Recent race results
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_races: Vec<RaceResult>,
    /// Injury history
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub injury_history: Vec<InjuryHistoryItem>,
}

/// Training goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    /// Primary goal
    pub primary_goal: PrimaryGoal,
    /// Target race date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_date: Option<NaiveDate>,
    /// Target race distance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_distance: Option<RaceDistance>,
    /// Goal finish time `H:MM:SS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_finish_time: Option<String>,
    /// Weeks until race day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_to_race: Option<u32>,
    /// Race priority
    #[serde(default)]
    pub priority_level: RacePriority,
}

/// Equipment available to the athlete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentAccess {
    /// Pool access
    #[serde(default = "default_true")]
    pub pool_access: bool,
    /// Indoor bike trainer
    #[serde(default)]
    pub bike_trainer: bool,
    /// Power meter
    #[serde(default)]
    pub power_meter: bool,
    /// Heart rate monitor
    #[serde(default = "default_true")]
    pub heart_rate_monitor: bool,
}

const fn default_true() -> bool {
    true
}

/// Environmental training conditions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvironmentalFactors {
    /// Climate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate: Option<Climate>,
    /// Training altitude (m)
    #[serde(default)]
    pub altitude_meters: u32,
}

/// Scheduling constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Days per week available for training
    pub available_training_days: u8,
    /// Longest session the athlete can fit (hours)
    pub max_session_duration_hours: f64,
    /// Equipment access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_access: Option<EquipmentAccess>,
    /// Environmental factors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_factors: Option<EnvironmentalFactors>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            available_training_days: profile_bounds::DEFAULT_TRAINING_DAYS,
            max_session_duration_hours: profile_bounds::DEFAULT_MAX_SESSION_HOURS,
            equipment_access: None,
            environmental_factors: None,
        }
    }
}

/// Scheduling preferences
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Preferred intensity distribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_intensity_distribution: Option<IntensityPreference>,
    /// Preferred long workout day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_workout_day: Option<Weekday>,
    /// Preferred rest day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_day: Option<Weekday>,
}

/// Document bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileMetadata {
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Complete athlete profile supplied per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Athlete identifier (`[a-zA-Z0-9_-]+`)
    pub athlete_id: String,
    /// Date the profile describes
    pub profile_date: NaiveDate,
    /// Current state
    pub current_state: CurrentState,
    /// Training history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_history: Option<TrainingHistory>,
    /// Goals
    pub goals: Goals,
    /// Constraints
    #[serde(default)]
    pub constraints: Constraints,
    /// Preferences
    #[serde(default)]
    pub preferences: Preferences,
    /// Metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProfileMetadata>,
}

/// Patterns stored as Option so a compilation failure degrades to "no match"
static ATHLETE_ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").ok());

static FINISH_TIME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}:\d{2}$").ok());

fn matches(pattern: &LazyLock<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

impl UserProfile {
    /// Years of training, if recorded
    #[must_use]
    pub fn years_training(&self) -> Option<f64> {
        self.training_history
            .as_ref()
            .and_then(|history| history.years_training)
    }

    /// Enforce every schema bound on the profile
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] encountered
    pub fn validate(&self) -> Result<(), SchemaError> {
        if !matches(&ATHLETE_ID_PATTERN, &self.athlete_id) {
            return Err(SchemaError::PatternMismatch {
                field: "athlete_id".into(),
                value: self.athlete_id.clone(),
                pattern: "^[a-zA-Z0-9_-]+$",
            });
        }
        self.validate_current_state()?;
        self.validate_goals()?;
        self.validate_constraints()?;
        if let Some(years) = self.years_training() {
            SchemaError::check_range("training_history.years_training", years, 0.0, 80.0)?;
        }
        if let Some(history) = &self.training_history {
            for race in &history.recent_races {
                if !matches(&FINISH_TIME_PATTERN, &race.finish_time) {
                    return Err(SchemaError::PatternMismatch {
                        field: "training_history.recent_races.finish_time".into(),
                        value: race.finish_time.clone(),
                        pattern: "HH:MM:SS",
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_current_state(&self) -> Result<(), SchemaError> {
        let state = &self.current_state;
        SchemaError::check_range(
            "current_state.sleep_hours",
            state.sleep_hours,
            profile_bounds::SLEEP_HOURS_MIN,
            profile_bounds::SLEEP_HOURS_MAX,
        )?;
        if let Some(consistency) = state.sleep_consistency {
            SchemaError::check_range("current_state.sleep_consistency", consistency, 0.0, 1.0)?;
        }
        SchemaError::check_range(
            "current_state.weekly_volume_hours",
            state.weekly_volume_hours,
            0.0,
            profile_bounds::WEEKLY_VOLUME_MAX,
        )?;
        if let Some(weeks) = state.volume_consistency_weeks {
            SchemaError::check_range(
                "current_state.volume_consistency_weeks",
                f64::from(weeks),
                0.0,
                f64::from(profile_bounds::CONSISTENCY_WEEKS_MAX),
            )?;
        }
        if let Some(rhr) = state.resting_heart_rate {
            SchemaError::check_range(
                "current_state.resting_heart_rate",
                f64::from(rhr),
                f64::from(profile_bounds::RESTING_HR_MIN),
                f64::from(profile_bounds::RESTING_HR_MAX),
            )?;
        }
        Ok(())
    }

    fn validate_goals(&self) -> Result<(), SchemaError> {
        if let Some(weeks) = self.goals.weeks_to_race {
            SchemaError::check_range(
                "goals.weeks_to_race",
                f64::from(weeks),
                f64::from(profile_bounds::WEEKS_TO_RACE_MIN),
                f64::from(profile_bounds::WEEKS_TO_RACE_MAX),
            )?;
        }
        if let Some(finish) = &self.goals.goal_finish_time {
            if !matches(&FINISH_TIME_PATTERN, finish) {
                return Err(SchemaError::PatternMismatch {
                    field: "goals.goal_finish_time".into(),
                    value: finish.clone(),
                    pattern: "H:MM:SS",
                });
            }
        }
        Ok(())
    }

    fn validate_constraints(&self) -> Result<(), SchemaError> {
        SchemaError::check_range(
            "constraints.available_training_days",
            f64::from(self.constraints.available_training_days),
            f64::from(profile_bounds::TRAINING_DAYS_MIN),
            f64::from(profile_bounds::TRAINING_DAYS_MAX),
        )?;
        SchemaError::check_range(
            "constraints.max_session_duration_hours",
            self.constraints.max_session_duration_hours,
            profile_bounds::MAX_SESSION_HOURS_MIN,
            profile_bounds::MAX_SESSION_HOURS_MAX,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> UserProfile {
        serde_json::from_value(json!({
            "athlete_id": "athlete_001",
            "profile_date": "2025-01-06",
            "current_state": {
                "sleep_hours": 7.5,
                "stress_level": "moderate",
                "weekly_volume_hours": 10.0,
                "volume_consistency_weeks": 8,
                "hrv_trend": "stable"
            },
            "goals": {"primary_goal": "race_performance", "race_distance": "70.3", "weeks_to_race": 12}
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_fill_optional_sections() {
        let profile = sample();
        assert_eq!(profile.constraints.available_training_days, 6);
        assert!(profile.preferences.rest_day.is_none());
        assert!(!profile.current_state.injury_status);
        assert_eq!(profile.goals.race_distance, Some(RaceDistance::SeventyThree));
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_sleep_is_rejected() {
        let mut profile = sample();
        profile.current_state.sleep_hours = 13.0;
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, SchemaError::OutOfRange { ref field, .. } if field == "current_state.sleep_hours"));
    }

    #[test]
    fn test_athlete_id_pattern_enforced() {
        let mut profile = sample();
        profile.athlete_id = "bad id!".into();
        assert!(matches!(
            profile.validate(),
            Err(SchemaError::PatternMismatch { .. })
        ));
    }

    #[test]
    fn test_weekday_order_and_parse() {
        assert_eq!(Weekday::Sunday.index(), 6);
        assert_eq!(Weekday::parse("saturday"), Some(Weekday::Saturday));
        assert_eq!(Weekday::parse("someday"), None);
    }
}
