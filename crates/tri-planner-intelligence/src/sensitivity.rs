// ABOUTME: What-if sensitivity analysis: re-runs the engine on a modified copy of a baseline profile
// ABOUTME: Reports validation flips, fragility deltas and plan-level shifts without touching the baseline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sensitivity Analysis
//!
//! Each scenario clones the baseline profile, changes exactly one allow-listed
//! field, then runs validation, fragility and (when a baseline plan exists)
//! plan generation on the copy. The analyzer only takes `&self`, so scenarios
//! can run concurrently; [`SensitivityAnalyzer::modify_assumptions`] does so
//! with `rayon`.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use tri_planner_core::errors::{AppError, AppResult};
use tri_planner_core::models::{
    FieldValue, FragilityResult, IntensityDistributionSummary, MethodologyConfig, ProfileField,
    RiskLevel, TrainingPlan, UserProfile, ValidationResult, ValidationStatus,
};

use crate::config::IntelligenceConfig;
use crate::fragility::FragilityCalculator;
use crate::planner::TrainingPlanGenerator;
use crate::validator::MethodologyValidator;

/// Smallest change in average hard sessions per week worth reporting
const HI_SESSIONS_DELTA_EPSILON: f64 = 0.01;

/// Smallest change in average weekly volume worth reporting (hours)
const VOLUME_DELTA_EPSILON: f64 = 0.1;

/// Plan-level differences between the baseline plan and a scenario plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanAdjustmentSummary {
    /// Change in average hard sessions per week, `None` when negligible
    pub hi_sessions_per_week_delta: Option<f64>,
    /// Change in average weekly volume (hours), `None` when negligible
    pub volume_delta_hours: Option<f64>,
    /// Whether the weeks per phase differ
    pub phase_distribution_changed: bool,
    /// Percentage-point change per intensity category
    pub intensity_distribution_delta: IntensityDistributionSummary,
}

impl PlanAdjustmentSummary {
    /// Compare two plans
    #[must_use]
    pub fn between(baseline: &TrainingPlan, scenario: &TrainingPlan) -> Self {
        let hi_delta =
            scenario.average_hi_sessions_per_week() - baseline.average_hi_sessions_per_week();
        let volume_delta = scenario.average_weekly_volume() - baseline.average_weekly_volume();
        let before = baseline.intensity_distribution();
        let after = scenario.intensity_distribution();
        Self {
            hi_sessions_per_week_delta: (hi_delta.abs() > HI_SESSIONS_DELTA_EPSILON)
                .then_some(hi_delta),
            volume_delta_hours: (volume_delta.abs() > VOLUME_DELTA_EPSILON).then_some(volume_delta),
            phase_distribution_changed: baseline.phase_breakdown() != scenario.phase_breakdown(),
            intensity_distribution_delta: IntensityDistributionSummary {
                low_intensity_percent: after.low_intensity_percent - before.low_intensity_percent,
                threshold_percent: after.threshold_percent - before.threshold_percent,
                high_intensity_percent: after.high_intensity_percent
                    - before.high_intensity_percent,
            },
        }
    }
}

/// Outcome of one what-if scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Field that was changed
    pub modified_field: ProfileField,
    /// Baseline value, `None` when the field was unset
    pub original_value: Option<FieldValue>,
    /// Scenario value, `None` when the field was cleared
    pub new_value: Option<FieldValue>,
    /// Baseline decision
    pub original_status: ValidationStatus,
    /// Scenario decision
    pub new_status: ValidationStatus,
    /// Whether the decision changed
    pub validation_changed: bool,
    /// Blocking violations when the scenario is refused
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_violations: Vec<String>,
    /// Baseline fragility, when the baseline was approved
    pub original_fragility: Option<f64>,
    /// Scenario fragility, when the scenario is approved
    pub new_fragility: Option<f64>,
    /// `new - original`, when both exist
    pub fragility_delta: Option<f64>,
    /// Scenario risk bucket
    pub new_risk_level: Option<RiskLevel>,
    /// Plan shifts, when a baseline plan was supplied and both sides are approved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_adjustments: Option<PlanAdjustmentSummary>,
}

/// Runs what-if scenarios against a fixed baseline
#[derive(Debug, Clone)]
pub struct SensitivityAnalyzer {
    validator: MethodologyValidator,
    config: IntelligenceConfig,
    baseline_profile: UserProfile,
    baseline_validation: ValidationResult,
    baseline_fragility: Option<FragilityResult>,
    baseline_plan: Option<TrainingPlan>,
}

impl SensitivityAnalyzer {
    /// Analyzer over a validated baseline
    ///
    /// # Errors
    ///
    /// Returns a schema violation for a malformed methodology, and
    /// `PreconditionFailed` when the validation result belongs to another
    /// athlete or methodology
    pub fn new(
        methodology: &MethodologyConfig,
        baseline_profile: UserProfile,
        baseline_validation: ValidationResult,
    ) -> AppResult<Self> {
        if !baseline_validation.belongs_to(&baseline_profile.athlete_id, &methodology.id) {
            return Err(AppError::precondition_failed(
                "baseline validation does not belong to the baseline profile and methodology",
            )
            .with_athlete_id(&baseline_profile.athlete_id)
            .with_methodology_id(&methodology.id));
        }
        Ok(Self {
            validator: MethodologyValidator::new(methodology)?,
            config: IntelligenceConfig::global().clone(),
            baseline_profile,
            baseline_validation,
            baseline_fragility: None,
            baseline_plan: None,
        })
    }

    /// Use explicit tuning instead of the global configuration
    #[must_use]
    pub fn with_config(mut self, config: IntelligenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Cache the baseline fragility instead of recomputing it
    #[must_use]
    pub fn with_baseline_fragility(mut self, fragility: FragilityResult) -> Self {
        self.baseline_fragility = Some(fragility);
        self
    }

    /// Compare scenario plans against this baseline plan
    #[must_use]
    pub fn with_baseline_plan(mut self, plan: TrainingPlan) -> Self {
        self.baseline_plan = Some(plan);
        self
    }

    /// Baseline profile, never modified by scenarios
    #[must_use]
    pub const fn baseline_profile(&self) -> &UserProfile {
        &self.baseline_profile
    }

    fn baseline_fragility_score(&self) -> AppResult<Option<f64>> {
        if !self.baseline_validation.approved {
            return Ok(None);
        }
        if let Some(fragility) = &self.baseline_fragility {
            return Ok(Some(fragility.score));
        }
        if let Some(score) = self.baseline_validation.trace.fragility_score {
            return Ok(Some(score));
        }
        let calculator =
            FragilityCalculator::with_config(self.validator.methodology(), &self.config.fragility);
        Ok(Some(
            calculator
                .calculate(&self.baseline_profile, &self.baseline_validation)?
                .score,
        ))
    }

    /// Change one field on a copy of the baseline and re-run the engine
    ///
    /// `value` must be a JSON boolean, number or string; `null` clears an
    /// optional field.
    ///
    /// # Errors
    ///
    /// Returns a schema violation for a path outside the allow-list, a value of
    /// the wrong type, or a value outside the profile schema bounds
    pub fn modify_assumption(&self, path: &str, value: Value) -> AppResult<ScenarioResult> {
        let field: ProfileField = path.parse()?;
        let new_value = if value.is_null() {
            None
        } else {
            Some(FieldValue::from_json(&value).ok_or_else(|| {
                AppError::invalid_input(format!(
                    "value for '{path}' must be a boolean, number or string, got {value}"
                ))
            })?)
        };

        let mut profile = self.baseline_profile.clone();
        field.set(&mut profile, new_value.clone())?;
        profile
            .validate()
            .map_err(|e| AppError::from(e).with_athlete_id(&profile.athlete_id))?;

        let validation = self
            .validator
            .validate_at(&profile, self.baseline_validation.trace.timestamp)?;

        let new_violations: Vec<String> = if validation.approved {
            Vec::new()
        } else {
            validation
                .trace
                .blocking_violations()
                .map(|gate| format!("{}: {}", gate.condition, gate.reasoning))
                .collect()
        };

        let methodology = self.validator.methodology();
        let new_fragility = if validation.approved {
            Some(
                FragilityCalculator::with_config(methodology, &self.config.fragility)
                    .calculate(&profile, &validation)?,
            )
        } else {
            None
        };
        let original_fragility = self.baseline_fragility_score()?;
        let fragility_delta = original_fragility
            .zip(new_fragility.as_ref())
            .map(|(before, after)| after.score - before);

        let plan_adjustments = match (&self.baseline_plan, &new_fragility) {
            (Some(baseline_plan), Some(fragility)) if self.baseline_validation.approved => {
                let scenario_plan =
                    TrainingPlanGenerator::with_config(methodology, &self.config.planning)
                        .with_start_date(baseline_plan.start_date)
                        .with_created_at(baseline_plan.created_at)
                        .generate(&profile, &validation, fragility)?;
                Some(PlanAdjustmentSummary::between(baseline_plan, &scenario_plan))
            }
            _ => None,
        };

        let result = ScenarioResult {
            modified_field: field,
            original_value: field.get(&self.baseline_profile),
            new_value,
            original_status: self.baseline_validation.status,
            new_status: validation.status,
            validation_changed: self.baseline_validation.status != validation.status,
            new_violations,
            original_fragility,
            new_fragility: new_fragility.as_ref().map(|f| f.score),
            fragility_delta,
            new_risk_level: new_fragility.as_ref().map(|f| f.risk_level),
            plan_adjustments,
        };

        info!(
            athlete_id = %self.baseline_profile.athlete_id,
            field = field.path(),
            status = %result.new_status,
            validation_changed = result.validation_changed,
            fragility_delta = ?result.fragility_delta,
            "Scenario evaluated"
        );
        Ok(result)
    }

    /// Evaluate independent scenarios in parallel, preserving input order
    #[must_use]
    pub fn modify_assumptions(&self, changes: &[(String, Value)]) -> Vec<AppResult<ScenarioResult>> {
        changes
            .par_iter()
            .map(|(path, value)| self.modify_assumption(path, value.clone()))
            .collect()
    }
}
