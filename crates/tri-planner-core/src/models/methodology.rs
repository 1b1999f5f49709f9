// ABOUTME: Declarative methodology definition: assumptions, safety gates, risk weights, intensity rules
// ABOUTME: Loaded once per request, never mutated, schema-validated before use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Methodology model card
//!
//! A methodology is a fixed configuration document. The engine evaluates and
//! schedules against it; nothing in the engine writes back to it.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::fragility::FragilityFactor;
use super::plan::{IntensityZone, SessionType, TrainingPhase};
use crate::constants::methodology_bounds;
use crate::errors::SchemaError;

static METHODOLOGY_ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").ok());

static SEMVER_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").ok());

/// Metabolic system a methodology targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetabolicFocus {
    /// Aerobic base
    AerobicBase,
    /// Maximal aerobic capacity
    Vo2max,
    /// Lactate threshold
    LactateThreshold,
    /// Anaerobic capacity
    AnaerobicCapacity,
    /// Neuromuscular power
    NeuromuscularPower,
}

/// How much an assumption matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    /// Nice to have
    Low,
    /// Important
    #[default]
    Medium,
    /// Essential
    High,
}

/// Whether a triggered gate blocks plan generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Refuses plan generation
    Blocking,
    /// Proceeds with a warning
    Warning,
}

/// Methodology philosophy text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Philosophy {
    /// Single sentence summary
    pub one_line_description: String,
    /// How the methodology works
    pub core_logic: String,
    /// Targeted systems
    #[serde(default)]
    pub metabolic_focus: Vec<MetabolicFocus>,
}

/// A documented expectation of the athlete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assumption {
    /// Profile field the assumption reads
    pub key: String,
    /// Human-readable expectation
    pub expectation: String,
    /// Why the methodology needs it
    pub reasoning_justification: String,
    /// How much it matters
    #[serde(default)]
    pub criticality: Criticality,
    /// Predicate, e.g. `user.sleep_hours >= 7.0`
    pub validation_rule: String,
}

/// A safety gate (exclusion criterion)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionCriterion {
    /// Profile field the gate reads
    pub condition: String,
    /// Trigger expression, e.g. `< 6.0` or `true`
    pub threshold: String,
    /// Blocking or warning
    pub severity: Severity,
    /// Human-readable description of the trigger
    pub validation_logic: String,
    /// What the athlete should do
    pub bridge_action: String,
}

/// Safety gate section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyGates {
    /// Gates in evaluation order
    pub exclusion_criteria: Vec<ExclusionCriterion>,
    /// Template rendered for blocking violations
    pub refusal_bridge_template: String,
}

/// Risk section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Base fragility in [0, 1]
    pub fragility_score: f64,
    /// Named sensitivity factors (documentation)
    #[serde(default)]
    pub sensitivity_factors: Vec<String>,
    /// Penalty weight per fragility factor
    #[serde(default)]
    pub fragility_calculation_weights: BTreeMap<FragilityFactor, f64>,
}

impl RiskProfile {
    /// Weight for `factor`, zero when unset
    #[must_use]
    pub fn weight(&self, factor: FragilityFactor) -> f64 {
        self.fragility_calculation_weights
            .get(&factor)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Known way the methodology fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureMode {
    /// Failure condition
    pub condition: String,
    /// Early warning signals
    #[serde(default)]
    pub early_warning_signals: Vec<String>,
    /// Mitigation
    pub mitigation_strategy: String,
}

/// Supporting literature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Citation text
    pub citation: String,
    /// Link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Relevance note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<String>,
}

/// Target share of weekly minutes per intensity category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityDistributionConfig {
    /// Zone 1-2 share
    pub low_intensity_target: f64,
    /// Zone 3 share
    pub threshold_intensity_target: f64,
    /// Zone 4-5 share
    pub high_intensity_target: f64,
    /// Acceptable deviation in percentage points
    pub tolerance_percent: f64,
}

impl IntensityDistributionConfig {
    fn validate(&self) -> Result<(), SchemaError> {
        let field = "intensity_distribution_config";
        SchemaError::check_range(
            "intensity_distribution_config.low_intensity_target",
            self.low_intensity_target,
            0.0,
            1.0,
        )?;
        SchemaError::check_range(
            "intensity_distribution_config.threshold_intensity_target",
            self.threshold_intensity_target,
            0.0,
            1.0,
        )?;
        SchemaError::check_range(
            "intensity_distribution_config.high_intensity_target",
            self.high_intensity_target,
            0.0,
            1.0,
        )?;
        SchemaError::check_range(
            "intensity_distribution_config.tolerance_percent",
            self.tolerance_percent,
            0.0,
            methodology_bounds::MAX_TOLERANCE_PERCENT,
        )?;
        let sum =
            self.low_intensity_target + self.threshold_intensity_target + self.high_intensity_target;
        if (sum - 1.0).abs() > methodology_bounds::DISTRIBUTION_SUM_TOLERANCE {
            return Err(SchemaError::BadSum {
                field: field.into(),
                sum,
                expected: 1.0,
            });
        }
        if self.low_intensity_target <= 0.0 {
            return Err(SchemaError::Invalid {
                field: "intensity_distribution_config.low_intensity_target".into(),
                reason: "low intensity share must be positive".into(),
            });
        }
        Ok(())
    }
}

/// Template for a hard session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiWorkoutTemplate {
    /// Sport (`run`, `bike`, `swim`)
    pub session_type: String,
    /// Zone name (`zone_3`, `threshold`, `vo2max`, ...)
    pub primary_zone: String,
    /// Interval prescription, e.g. `6x800m @ Z4 with 2min recovery`
    pub workout_description: String,
    /// Sport discipline
    pub discipline: String,
    /// Phases the template suits
    #[serde(default)]
    pub recommended_phases: Vec<TrainingPhase>,
}

impl HiWorkoutTemplate {
    /// Parsed sport, if recognized
    #[must_use]
    pub fn sport(&self) -> Option<SessionType> {
        SessionType::parse_sport(&self.session_type)
    }

    /// Parsed zone, if recognized
    #[must_use]
    pub fn zone(&self) -> Option<IntensityZone> {
        IntensityZone::parse_template_zone(&self.primary_zone)
    }
}

/// How hard-session templates are selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    /// Cycle through all templates
    RoundRobin,
    /// Cycle through templates recommended for the current phase
    PhaseSpecific,
    /// Deterministic pseudo-random stride
    Random,
}

/// Hard-session template configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTypeConfig {
    /// Templates (at least one)
    pub hi_workout_templates: Vec<HiWorkoutTemplate>,
    /// Selection strategy
    pub rotation_strategy: RotationStrategy,
    /// Longest run of consecutive hard sessions sharing a sport
    pub max_consecutive_same_type: u8,
}

/// Phase split for one plan-length bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhasePercentages {
    /// Base share
    pub base_percent: f64,
    /// Build share
    pub build_percent: f64,
    /// Peak share
    pub peak_percent: f64,
    /// Taper share
    pub taper_percent: f64,
    /// Minimum base weeks
    pub min_base_weeks: u32,
    /// Minimum build weeks
    pub min_build_weeks: u32,
    /// Minimum peak weeks
    pub min_peak_weeks: u32,
    /// Minimum taper weeks
    pub min_taper_weeks: u32,
}

impl PhasePercentages {
    fn validate(&self, field: &str) -> Result<(), SchemaError> {
        for (name, value) in [
            ("base_percent", self.base_percent),
            ("build_percent", self.build_percent),
            ("peak_percent", self.peak_percent),
            ("taper_percent", self.taper_percent),
        ] {
            SchemaError::check_range(&format!("{field}.{name}"), value, 0.0, 1.0)?;
        }
        let sum = self.base_percent + self.build_percent + self.peak_percent + self.taper_percent;
        if (sum - 1.0).abs() > methodology_bounds::DISTRIBUTION_SUM_TOLERANCE {
            return Err(SchemaError::BadSum {
                field: field.to_owned(),
                sum,
                expected: 1.0,
            });
        }
        for (name, value) in [
            ("min_base_weeks", self.min_base_weeks),
            ("min_build_weeks", self.min_build_weeks),
            ("min_peak_weeks", self.min_peak_weeks),
            ("min_taper_weeks", self.min_taper_weeks),
        ] {
            if value < 1 {
                return Err(SchemaError::out_of_range(
                    format!("{field}.{name}"),
                    f64::from(value),
                    1.0,
                    52.0,
                ));
            }
        }
        Ok(())
    }
}

/// Phase allocation rules by plan length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDistributionConfig {
    /// Plans of at most six weeks
    pub short_plan_phases: PhasePercentages,
    /// Plans of seven to twelve weeks
    pub medium_plan_phases: PhasePercentages,
    /// Longer plans
    pub long_plan_phases: PhasePercentages,
    /// Consistency weeks below which base is extended
    pub volume_consistency_threshold: u32,
    /// Weeks added to base when consistency is insufficient
    pub base_extension_weeks: u32,
}

/// Load weeks followed by recovery weeks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRecoveryRatio {
    /// Consecutive load weeks
    pub load_weeks: u32,
    /// Recovery weeks closing the mesocycle
    pub recovery_weeks: u32,
}

impl LoadRecoveryRatio {
    /// Mesocycle length in weeks
    #[must_use]
    pub const fn mesocycle_length(&self) -> u32 {
        self.load_weeks + self.recovery_weeks
    }
}

/// Deload week parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryWeekConfig {
    /// Volume multiplier at fragility 1.0
    pub volume_multiplier_min: f64,
    /// Volume multiplier at fragility 0.0
    pub volume_multiplier_max: f64,
    /// Hard sessions allowed in a recovery week
    pub max_hi_sessions: u8,
    /// Week note, `{volume_percent}` is substituted
    pub week_note_template: String,
}

impl Default for RecoveryWeekConfig {
    fn default() -> Self {
        Self {
            volume_multiplier_min: 0.5,
            volume_multiplier_max: 0.6,
            max_hi_sessions: 1,
            week_note_template: "RECOVERY WEEK: Volume reduced to {volume_percent}% of normal. \
                                 Prioritize sleep, easy aerobic work and mobility to absorb the previous block."
                .to_owned(),
        }
    }
}

/// Mesocycle rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodizationConfig {
    /// Ratio for robust athletes
    pub default_ratio: LoadRecoveryRatio,
    /// Ratio for fragile or inexperienced athletes
    pub high_fragility_ratio: LoadRecoveryRatio,
    /// Fragility above which the high-fragility ratio applies
    pub fragility_threshold: f64,
    /// Years of training below which the high-fragility ratio applies
    pub experience_threshold_years: f64,
    /// Convert a recovery week directly before the taper into a load week
    pub skip_final_mesocycle_recovery: bool,
    /// Deload parameters
    pub recovery_week_config: RecoveryWeekConfig,
    /// Extra deload per phase, subtracted from the recovery multiplier
    pub phase_deload_adjustments: BTreeMap<TrainingPhase, f64>,
}

impl Default for PeriodizationConfig {
    fn default() -> Self {
        Self {
            default_ratio: LoadRecoveryRatio {
                load_weeks: 3,
                recovery_weeks: 1,
            },
            high_fragility_ratio: LoadRecoveryRatio {
                load_weeks: 2,
                recovery_weeks: 1,
            },
            fragility_threshold: 0.6,
            experience_threshold_years: 2.0,
            skip_final_mesocycle_recovery: true,
            recovery_week_config: RecoveryWeekConfig::default(),
            phase_deload_adjustments: BTreeMap::new(),
        }
    }
}

impl PeriodizationConfig {
    fn validate(&self) -> Result<(), SchemaError> {
        for (name, ratio) in [
            ("default_ratio", self.default_ratio),
            ("high_fragility_ratio", self.high_fragility_ratio),
        ] {
            if ratio.load_weeks < 1 || ratio.mesocycle_length() > 6 {
                return Err(SchemaError::Invalid {
                    field: format!("periodization_config.{name}"),
                    reason: format!(
                        "{}:{} must have at least one load week and at most six weeks",
                        ratio.load_weeks, ratio.recovery_weeks
                    ),
                });
            }
        }
        SchemaError::check_range(
            "periodization_config.fragility_threshold",
            self.fragility_threshold,
            0.0,
            1.0,
        )?;
        SchemaError::check_range(
            "periodization_config.experience_threshold_years",
            self.experience_threshold_years,
            0.0,
            80.0,
        )?;
        let recovery = &self.recovery_week_config;
        SchemaError::check_range(
            "periodization_config.recovery_week_config.volume_multiplier_min",
            recovery.volume_multiplier_min,
            0.1,
            1.0,
        )?;
        SchemaError::check_range(
            "periodization_config.recovery_week_config.volume_multiplier_max",
            recovery.volume_multiplier_max,
            recovery.volume_multiplier_min,
            1.0,
        )?;
        for (phase, adjustment) in &self.phase_deload_adjustments {
            SchemaError::check_range(
                &format!("periodization_config.phase_deload_adjustments.{}", phase.as_str()),
                *adjustment,
                0.0,
                0.5,
            )?;
        }
        Ok(())
    }
}

/// Complete methodology definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodologyConfig {
    /// Identifier (`[a-z0-9_]+`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Semantic version
    pub version: String,
    /// Last update date
    pub last_updated: NaiveDate,
    /// Philosophy text
    pub philosophy: Philosophy,
    /// Ordered assumptions
    pub assumptions: Vec<Assumption>,
    /// Safety gates
    pub safety_gates: SafetyGates,
    /// Risk weights
    pub risk_profile: RiskProfile,
    /// Known failure modes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failure_modes: Vec<FailureMode>,
    /// Literature
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    /// Intensity split
    pub intensity_distribution_config: IntensityDistributionConfig,
    /// Hard-session templates
    pub session_type_config: SessionTypeConfig,
    /// Phase allocation
    pub phase_distribution_config: PhaseDistributionConfig,
    /// Mesocycle rules (defaults applied when absent)
    #[serde(default)]
    pub periodization_config: PeriodizationConfig,
}

impl MethodologyConfig {
    /// Look up an assumption by key
    #[must_use]
    pub fn assumption(&self, key: &str) -> Option<&Assumption> {
        self.assumptions.iter().find(|assumption| assumption.key == key)
    }

    /// Enforce every schema bound on the methodology
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] encountered
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.validate_identity()?;
        self.validate_assumptions()?;
        if self.safety_gates.exclusion_criteria.is_empty() {
            return Err(SchemaError::MissingField(
                "safety_gates.exclusion_criteria".into(),
            ));
        }
        self.validate_risk_profile()?;
        self.intensity_distribution_config.validate()?;
        self.validate_session_types()?;
        let phases = &self.phase_distribution_config;
        phases
            .short_plan_phases
            .validate("phase_distribution_config.short_plan_phases")?;
        phases
            .medium_plan_phases
            .validate("phase_distribution_config.medium_plan_phases")?;
        phases
            .long_plan_phases
            .validate("phase_distribution_config.long_plan_phases")?;
        if phases.volume_consistency_threshold < 1 {
            return Err(SchemaError::out_of_range(
                "phase_distribution_config.volume_consistency_threshold",
                f64::from(phases.volume_consistency_threshold),
                1.0,
                52.0,
            ));
        }
        self.periodization_config.validate()
    }

    fn validate_identity(&self) -> Result<(), SchemaError> {
        if !METHODOLOGY_ID_PATTERN
            .as_ref()
            .is_some_and(|re| re.is_match(&self.id))
        {
            return Err(SchemaError::PatternMismatch {
                field: "id".into(),
                value: self.id.clone(),
                pattern: "^[a-z0-9_]+$",
            });
        }
        if !SEMVER_PATTERN
            .as_ref()
            .is_some_and(|re| re.is_match(&self.version))
        {
            return Err(SchemaError::PatternMismatch {
                field: "version".into(),
                value: self.version.clone(),
                pattern: "MAJOR.MINOR.PATCH",
            });
        }
        if self.name.trim().is_empty() {
            return Err(SchemaError::MissingField("name".into()));
        }
        Ok(())
    }

    fn validate_assumptions(&self) -> Result<(), SchemaError> {
        if self.assumptions.is_empty() {
            return Err(SchemaError::MissingField("assumptions".into()));
        }
        if self.assumptions.len() > methodology_bounds::MAX_ASSUMPTIONS {
            return Err(SchemaError::TooMany {
                field: "assumptions".into(),
                count: self.assumptions.len(),
                max: methodology_bounds::MAX_ASSUMPTIONS,
            });
        }
        let mut seen = HashSet::new();
        for assumption in &self.assumptions {
            if !seen.insert(assumption.key.as_str()) {
                return Err(SchemaError::DuplicateKey {
                    field: "assumptions".into(),
                    key: assumption.key.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_risk_profile(&self) -> Result<(), SchemaError> {
        let risk = &self.risk_profile;
        SchemaError::check_range("risk_profile.fragility_score", risk.fragility_score, 0.0, 1.0)?;
        let mut sum = 0.0;
        for (factor, weight) in &risk.fragility_calculation_weights {
            SchemaError::check_range(
                &format!("risk_profile.fragility_calculation_weights.{}", factor.as_str()),
                *weight,
                0.0,
                1.0,
            )?;
            sum += weight;
        }
        if sum > 1.0 + methodology_bounds::WEIGHT_SUM_TOLERANCE {
            return Err(SchemaError::BadSum {
                field: "risk_profile.fragility_calculation_weights".into(),
                sum,
                expected: 1.0,
            });
        }
        Ok(())
    }

    fn validate_session_types(&self) -> Result<(), SchemaError> {
        let config = &self.session_type_config;
        if config.hi_workout_templates.is_empty() {
            return Err(SchemaError::MissingField(
                "session_type_config.hi_workout_templates".into(),
            ));
        }
        if config.max_consecutive_same_type < 1
            || config.max_consecutive_same_type > methodology_bounds::MAX_CONSECUTIVE_SAME_TYPE
        {
            return Err(SchemaError::out_of_range(
                "session_type_config.max_consecutive_same_type",
                f64::from(config.max_consecutive_same_type),
                1.0,
                f64::from(methodology_bounds::MAX_CONSECUTIVE_SAME_TYPE),
            ));
        }
        for template in &config.hi_workout_templates {
            if template.sport().is_none() {
                return Err(SchemaError::Invalid {
                    field: "session_type_config.hi_workout_templates.session_type".into(),
                    reason: format!("unknown sport '{}'", template.session_type),
                });
            }
            match template.zone() {
                Some(zone) if !zone.is_low_intensity() => {}
                _ => {
                    return Err(SchemaError::Invalid {
                        field: "session_type_config.hi_workout_templates.primary_zone".into(),
                        reason: format!("'{}' is not a hard-session zone", template.primary_zone),
                    });
                }
            }
        }
        Ok(())
    }
}
