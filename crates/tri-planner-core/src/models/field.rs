// ABOUTME: Allow-listed profile field paths with typed getters and setters
// ABOUTME: Shared by assumption/gate key lookup and what-if field modification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Addressable profile fields
//!
//! Validation rules, safety gates and what-if scenarios all name profile
//! fields by string. Every such name resolves through [`ProfileField`]; any
//! name outside the allow-list is rejected instead of reflected on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::profile::{HrvTrend, StressLevel, TrainingHistory, UserProfile, Weekday};
use crate::errors::SchemaError;

/// A scalar profile value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean flag
    Bool(bool),
    /// Numeric measurement
    Number(f64),
    /// Enumerated or free text value
    Text(String),
}

impl FieldValue {
    /// Numeric view
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean view
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text view
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON scalar; `None` for null, arrays and objects
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Broad type of a profile field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// `true` / `false`
    Bool,
    /// Integer or real number
    Number,
    /// Enumerated text
    Text,
}

/// Every profile field the engine may read by name or modify in a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProfileField {
    /// `current_state.sleep_hours`
    SleepHours,
    /// `current_state.sleep_consistency`
    SleepConsistency,
    /// `current_state.injury_status`
    InjuryStatus,
    /// `current_state.stress_level`
    StressLevel,
    /// `current_state.weekly_volume_hours`
    WeeklyVolumeHours,
    /// `current_state.volume_consistency_weeks`
    VolumeConsistencyWeeks,
    /// `current_state.resting_heart_rate`
    RestingHeartRate,
    /// `current_state.hrv_trend`
    HrvTrend,
    /// `current_state.recent_illness`
    RecentIllness,
    /// `goals.weeks_to_race`
    WeeksToRace,
    /// `constraints.available_training_days`
    AvailableTrainingDays,
    /// `constraints.max_session_duration_hours`
    MaxSessionDurationHours,
    /// `training_history.years_training`
    YearsTraining,
    /// `preferences.long_workout_day`
    LongWorkoutDay,
    /// `preferences.rest_day`
    RestDay,
}

impl ProfileField {
    /// Every allow-listed field
    pub const ALL: [Self; 15] = [
        Self::SleepHours,
        Self::SleepConsistency,
        Self::InjuryStatus,
        Self::StressLevel,
        Self::WeeklyVolumeHours,
        Self::VolumeConsistencyWeeks,
        Self::RestingHeartRate,
        Self::HrvTrend,
        Self::RecentIllness,
        Self::WeeksToRace,
        Self::AvailableTrainingDays,
        Self::MaxSessionDurationHours,
        Self::YearsTraining,
        Self::LongWorkoutDay,
        Self::RestDay,
    ];

    /// Dotted path
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::SleepHours => "current_state.sleep_hours",
            Self::SleepConsistency => "current_state.sleep_consistency",
            Self::InjuryStatus => "current_state.injury_status",
            Self::StressLevel => "current_state.stress_level",
            Self::WeeklyVolumeHours => "current_state.weekly_volume_hours",
            Self::VolumeConsistencyWeeks => "current_state.volume_consistency_weeks",
            Self::RestingHeartRate => "current_state.resting_heart_rate",
            Self::HrvTrend => "current_state.hrv_trend",
            Self::RecentIllness => "current_state.recent_illness",
            Self::WeeksToRace => "goals.weeks_to_race",
            Self::AvailableTrainingDays => "constraints.available_training_days",
            Self::MaxSessionDurationHours => "constraints.max_session_duration_hours",
            Self::YearsTraining => "training_history.years_training",
            Self::LongWorkoutDay => "preferences.long_workout_day",
            Self::RestDay => "preferences.rest_day",
        }
    }

    /// Leaf name used as an assumption or gate key
    #[must_use]
    pub fn key(&self) -> &'static str {
        let path = self.path();
        path.rsplit('.').next().unwrap_or(path)
    }

    /// Resolve an assumption/gate key or a dotted path
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.key() == key || field.path() == key)
    }

    /// Broad type of the field
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::InjuryStatus | Self::RecentIllness => FieldKind::Bool,
            Self::StressLevel | Self::HrvTrend | Self::LongWorkoutDay | Self::RestDay => {
                FieldKind::Text
            }
            _ => FieldKind::Number,
        }
    }

    /// Kind of value the field holds, as shown in type errors
    #[must_use]
    pub const fn expected_kind(&self) -> &'static str {
        match self {
            Self::InjuryStatus | Self::RecentIllness => "a boolean",
            Self::StressLevel => "one of low, moderate, high",
            Self::HrvTrend => "one of increasing, stable, decreasing, unknown",
            Self::LongWorkoutDay | Self::RestDay => "a weekday name",
            Self::VolumeConsistencyWeeks
            | Self::RestingHeartRate
            | Self::WeeksToRace
            | Self::AvailableTrainingDays => "a non-negative integer",
            Self::SleepHours
            | Self::SleepConsistency
            | Self::WeeklyVolumeHours
            | Self::MaxSessionDurationHours
            | Self::YearsTraining => "a number",
        }
    }

    /// Whether the field may be absent from a valid profile
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(
            self,
            Self::SleepConsistency
                | Self::VolumeConsistencyWeeks
                | Self::RestingHeartRate
                | Self::WeeksToRace
                | Self::YearsTraining
                | Self::LongWorkoutDay
                | Self::RestDay
        )
    }

    /// Read the field; `None` when an optional field is absent
    #[must_use]
    pub fn get(&self, profile: &UserProfile) -> Option<FieldValue> {
        let state = &profile.current_state;
        match self {
            Self::SleepHours => Some(state.sleep_hours.into()),
            Self::SleepConsistency => state.sleep_consistency.map(FieldValue::from),
            Self::InjuryStatus => Some(state.injury_status.into()),
            Self::StressLevel => Some(state.stress_level.as_str().into()),
            Self::WeeklyVolumeHours => Some(state.weekly_volume_hours.into()),
            Self::VolumeConsistencyWeeks => state.volume_consistency_weeks.map(FieldValue::from),
            Self::RestingHeartRate => state.resting_heart_rate.map(FieldValue::from),
            Self::HrvTrend => Some(state.hrv_trend.as_str().into()),
            Self::RecentIllness => Some(state.recent_illness.into()),
            Self::WeeksToRace => profile.goals.weeks_to_race.map(FieldValue::from),
            Self::AvailableTrainingDays => Some(
                f64::from(profile.constraints.available_training_days).into(),
            ),
            Self::MaxSessionDurationHours => {
                Some(profile.constraints.max_session_duration_hours.into())
            }
            Self::YearsTraining => profile.years_training().map(FieldValue::from),
            Self::LongWorkoutDay => profile
                .preferences
                .long_workout_day
                .map(|day| day.as_str().into()),
            Self::RestDay => profile.preferences.rest_day.map(|day| day.as_str().into()),
        }
    }

    /// Write the field after checking the value's type
    ///
    /// `None` clears an optional field. Range checks are left to
    /// [`UserProfile::validate`], which callers run on the modified copy.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::TypeMismatch`] when the value has the wrong type,
    /// or when `None` is supplied for a required field
    pub fn set(&self, profile: &mut UserProfile, value: Option<FieldValue>) -> Result<(), SchemaError> {
        let Some(value) = value else {
            return self.clear(profile);
        };
        let state = &mut profile.current_state;
        match self {
            Self::SleepHours => state.sleep_hours = self.number(&value)?,
            Self::SleepConsistency => state.sleep_consistency = Some(self.number(&value)?),
            Self::InjuryStatus => state.injury_status = self.boolean(&value)?,
            Self::StressLevel => {
                state.stress_level = self.text(&value, StressLevel::parse)?;
            }
            Self::WeeklyVolumeHours => state.weekly_volume_hours = self.number(&value)?,
            Self::VolumeConsistencyWeeks => {
                state.volume_consistency_weeks = Some(self.integer(&value)?);
            }
            Self::RestingHeartRate => state.resting_heart_rate = Some(self.integer(&value)?),
            Self::HrvTrend => state.hrv_trend = self.text(&value, HrvTrend::parse)?,
            Self::RecentIllness => state.recent_illness = self.boolean(&value)?,
            Self::WeeksToRace => profile.goals.weeks_to_race = Some(self.integer(&value)?),
            Self::AvailableTrainingDays => {
                let days = self.integer(&value)?;
                profile.constraints.available_training_days =
                    u8::try_from(days).map_err(|_| self.mismatch(&value))?;
            }
            Self::MaxSessionDurationHours => {
                profile.constraints.max_session_duration_hours = self.number(&value)?;
            }
            Self::YearsTraining => {
                let years = self.number(&value)?;
                profile
                    .training_history
                    .get_or_insert_with(TrainingHistory::default)
                    .years_training = Some(years);
            }
            Self::LongWorkoutDay => {
                profile.preferences.long_workout_day = Some(self.text(&value, Weekday::parse)?);
            }
            Self::RestDay => {
                profile.preferences.rest_day = Some(self.text(&value, Weekday::parse)?);
            }
        }
        Ok(())
    }

    fn clear(&self, profile: &mut UserProfile) -> Result<(), SchemaError> {
        match self {
            Self::SleepConsistency => profile.current_state.sleep_consistency = None,
            Self::VolumeConsistencyWeeks => profile.current_state.volume_consistency_weeks = None,
            Self::RestingHeartRate => profile.current_state.resting_heart_rate = None,
            Self::WeeksToRace => profile.goals.weeks_to_race = None,
            Self::YearsTraining => {
                if let Some(history) = profile.training_history.as_mut() {
                    history.years_training = None;
                }
            }
            Self::LongWorkoutDay => profile.preferences.long_workout_day = None,
            Self::RestDay => profile.preferences.rest_day = None,
            _ => {
                return Err(SchemaError::TypeMismatch {
                    field: self.path().to_owned(),
                    expected: self.expected_kind(),
                    actual: "null".into(),
                });
            }
        }
        Ok(())
    }

    fn mismatch(&self, value: &FieldValue) -> SchemaError {
        SchemaError::TypeMismatch {
            field: self.path().to_owned(),
            expected: self.expected_kind(),
            actual: value.to_string(),
        }
    }

    fn number(&self, value: &FieldValue) -> Result<f64, SchemaError> {
        value
            .as_number()
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.mismatch(value))
    }

    fn integer(&self, value: &FieldValue) -> Result<u32, SchemaError> {
        let n = self.number(value)?;
        if n < 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
            return Err(self.mismatch(value));
        }
        Ok(n as u32)
    }

    fn boolean(&self, value: &FieldValue) -> Result<bool, SchemaError> {
        value.as_bool().ok_or_else(|| self.mismatch(value))
    }

    fn text<T>(&self, value: &FieldValue, parse: fn(&str) -> Option<T>) -> Result<T, SchemaError> {
        value
            .as_text()
            .and_then(parse)
            .ok_or_else(|| self.mismatch(value))
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ProfileField {
    type Err = SchemaError;

    /// Parse a dotted path; bare leaf keys are not accepted here
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.path() == path.trim())
            .ok_or_else(|| SchemaError::UnknownField(path.to_owned()))
    }
}

impl TryFrom<String> for ProfileField {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProfileField> for String {
    fn from(field: ProfileField) -> Self {
        field.path().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> UserProfile {
        serde_json::from_value(json!({
            "athlete_id": "athlete_001",
            "profile_date": "2025-01-06",
            "current_state": {
                "sleep_hours": 6.5,
                "stress_level": "moderate",
                "weekly_volume_hours": 10.0,
                "hrv_trend": "stable"
            },
            "goals": {"primary_goal": "race_performance"}
        }))
        .unwrap()
    }

    #[test]
    fn test_path_and_key_resolution() {
        assert_eq!(
            "current_state.sleep_hours".parse::<ProfileField>().unwrap(),
            ProfileField::SleepHours
        );
        assert_eq!(ProfileField::from_key("weeks_to_race"), Some(ProfileField::WeeksToRace));
        assert_eq!(ProfileField::WeeksToRace.key(), "weeks_to_race");
        assert!(matches!(
            "athlete_id".parse::<ProfileField>(),
            Err(SchemaError::UnknownField(_))
        ));
        assert!("current_state.__class__".parse::<ProfileField>().is_err());
    }

    #[test]
    fn test_typed_set_and_get() {
        let mut p = profile();
        ProfileField::SleepHours
            .set(&mut p, Some(FieldValue::Number(7.5)))
            .unwrap();
        assert_eq!(ProfileField::SleepHours.get(&p), Some(FieldValue::Number(7.5)));

        ProfileField::StressLevel
            .set(&mut p, Some("low".into()))
            .unwrap();
        assert_eq!(p.current_state.stress_level, StressLevel::Low);

        ProfileField::YearsTraining
            .set(&mut p, Some(FieldValue::Number(3.0)))
            .unwrap();
        assert_eq!(p.years_training(), Some(3.0));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut p = profile();
        let err = ProfileField::InjuryStatus
            .set(&mut p, Some(FieldValue::Number(1.0)))
            .unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { .. }));

        assert!(ProfileField::VolumeConsistencyWeeks
            .set(&mut p, Some(FieldValue::Number(2.5)))
            .is_err());
        assert!(ProfileField::SleepHours.set(&mut p, None).is_err());
        assert!(ProfileField::WeeksToRace.set(&mut p, None).is_ok());
    }

    #[test]
    fn test_missing_optional_reads_none() {
        let p = profile();
        assert_eq!(ProfileField::VolumeConsistencyWeeks.get(&p), None);
        assert_eq!(ProfileField::WeeksToRace.get(&p), None);
    }
}
