// ABOUTME: End-to-end pipeline: validate, score fragility, generate a plan for one athlete
// ABOUTME: Owns a compiled methodology and hands out sensitivity analyzers seeded with its results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Pipeline
//!
//! Chains the engine stages for one methodology. A refused profile stops after
//! validation; an approved one continues through fragility and planning, and
//! the fragility score is attached to the returned trace.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use tri_planner_core::errors::AppResult;
use tri_planner_core::models::{
    FragilityResult, MethodologyConfig, TrainingPlan, UserProfile, ValidationResult,
};
use tri_planner_intelligence::{
    FragilityCalculator, IntelligenceConfig, MethodologyValidator, SensitivityAnalyzer,
    TraceReport, TrainingPlanGenerator,
};

use crate::config::load_methodology;

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Validation decision and trace
    pub validation: ValidationResult,
    /// Present when validation approved
    pub fragility: Option<FragilityResult>,
    /// Present when validation approved
    pub plan: Option<TrainingPlan>,
}

impl PipelineOutcome {
    /// Whether a plan was produced
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        self.validation.approved
    }

    /// Audit report over this run
    #[must_use]
    pub fn report(&self) -> TraceReport<'_> {
        let mut report = TraceReport::new(&self.validation.trace);
        if let Some(fragility) = &self.fragility {
            report = report.with_fragility(fragility);
        }
        if let Some(plan) = &self.plan {
            report = report.with_plan_decisions(&plan.plan_decisions);
        }
        report
    }
}

/// Validator, fragility calculator and planner bound to one methodology
#[derive(Debug, Clone)]
pub struct Pipeline {
    validator: MethodologyValidator,
    config: IntelligenceConfig,
    start_date: Option<NaiveDate>,
}

impl Pipeline {
    /// Compile `methodology` using the global tunables
    ///
    /// # Errors
    ///
    /// Returns a schema violation when the methodology is malformed
    pub fn new(methodology: &MethodologyConfig) -> AppResult<Self> {
        Ok(Self {
            validator: MethodologyValidator::new(methodology)?,
            config: IntelligenceConfig::global().clone(),
            start_date: None,
        })
    }

    /// Load and compile a methodology document
    ///
    /// # Errors
    ///
    /// Returns the loader's errors, or a schema violation from compilation
    pub fn from_path(path: &Path) -> AppResult<Self> {
        Self::new(&load_methodology(path)?)
    }

    /// Use explicit tunables
    #[must_use]
    pub fn with_config(mut self, config: IntelligenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Fix the first day of generated plans
    #[must_use]
    pub const fn with_start_date(mut self, start_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self
    }

    /// Methodology in use
    #[must_use]
    pub const fn methodology(&self) -> &MethodologyConfig {
        self.validator.methodology()
    }

    /// Compiled validator
    #[must_use]
    pub const fn validator(&self) -> &MethodologyValidator {
        &self.validator
    }

    /// Run the chain stamped with the current time
    ///
    /// # Errors
    ///
    /// Returns a schema violation for an invalid profile. A refusal is not an
    /// error; it is reported in the outcome.
    pub fn evaluate(&self, profile: &UserProfile) -> AppResult<PipelineOutcome> {
        self.evaluate_at(profile, Utc::now())
    }

    /// Run the chain with a fixed timestamp
    ///
    /// # Errors
    ///
    /// Returns a schema violation for an invalid profile
    pub fn evaluate_at(
        &self,
        profile: &UserProfile,
        timestamp: DateTime<Utc>,
    ) -> AppResult<PipelineOutcome> {
        let mut validation = self.validator.validate_at(profile, timestamp)?;
        if !validation.approved {
            info!(
                athlete_id = %profile.athlete_id,
                methodology_id = %self.methodology().id,
                "Pipeline stopped at validation"
            );
            return Ok(PipelineOutcome {
                validation,
                fragility: None,
                plan: None,
            });
        }

        let methodology = self.methodology();
        let fragility = FragilityCalculator::with_config(methodology, &self.config.fragility)
            .calculate(profile, &validation)?;
        validation.trace = validation.trace.with_fragility_score(fragility.score);

        let mut generator = TrainingPlanGenerator::with_config(methodology, &self.config.planning)
            .with_created_at(timestamp);
        if let Some(start_date) = self.start_date {
            generator = generator.with_start_date(start_date);
        }
        let plan = generator.generate(profile, &validation, &fragility)?;

        info!(
            athlete_id = %profile.athlete_id,
            methodology_id = %methodology.id,
            status = %validation.status,
            score = fragility.score,
            weeks = plan.duration_weeks,
            "Pipeline completed"
        );
        Ok(PipelineOutcome {
            validation,
            fragility: Some(fragility),
            plan: Some(plan),
        })
    }

    /// What-if analyzer seeded with a finished run
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` when `outcome` was produced for another
    /// athlete or methodology
    pub fn sensitivity(
        &self,
        profile: &UserProfile,
        outcome: &PipelineOutcome,
    ) -> AppResult<SensitivityAnalyzer> {
        let mut analyzer =
            SensitivityAnalyzer::new(self.methodology(), profile.clone(), outcome.validation.clone())?
                .with_config(self.config.clone());
        if let Some(fragility) = &outcome.fragility {
            analyzer = analyzer.with_baseline_fragility(fragility.clone());
        }
        if let Some(plan) = &outcome.plan {
            analyzer = analyzer.with_baseline_plan(plan.clone());
        }
        Ok(analyzer)
    }
}
