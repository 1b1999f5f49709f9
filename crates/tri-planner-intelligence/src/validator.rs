// ABOUTME: Methodology validator: checks every assumption and safety gate against an athlete profile
// ABOUTME: Produces an approval decision with a complete reasoning trace and rendered refusal bridges
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Methodology Validation
//!
//! The validator is the first stage of the engine. It decides whether a
//! methodology may be applied to an athlete at all:
//!
//! - every assumption is checked and recorded, pass or fail
//! - every safety gate is evaluated and recorded, triggered or not
//! - a triggered **blocking** gate refuses plan generation
//! - a triggered **warning** gate lets the plan proceed with a warning
//!
//! Evaluation is exhaustive so the trace always shows the complete picture.
//! Rules are compiled once in [`MethodologyValidator::new`]; a methodology with
//! a malformed rule is rejected there rather than at evaluation time.

use std::iter;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use tri_planner_core::errors::{AppError, AppResult, SchemaError};
use tri_planner_core::models::{
    Assumption, AssumptionCheck, ExclusionCriterion, FieldValue, GateEvaluation,
    MethodologyConfig, ProfileField, ReasoningTrace, RefusalResponse, Severity, UserProfile,
    ValidationResult, ValidationStatus,
};

use crate::bridge::{render_refusal_bridge, BridgeFields};
use crate::expression::{compile_rule, compile_threshold, CompiledRule, Predicate};

const REPORT_RULE_WIDTH: usize = 70;

/// A safety gate with its threshold compiled
#[derive(Debug, Clone)]
struct CompiledGate {
    field: ProfileField,
    predicate: Predicate,
}

/// Evaluates athlete profiles against one methodology
#[derive(Debug, Clone)]
pub struct MethodologyValidator {
    methodology: MethodologyConfig,
    rules: Vec<CompiledRule>,
    gates: Vec<CompiledGate>,
}

impl MethodologyValidator {
    /// Schema-check the methodology and compile its rules and gate thresholds
    ///
    /// # Errors
    ///
    /// Returns a schema violation when the methodology breaks a schema bound,
    /// when a rule or threshold cannot be parsed, or when a key names a field
    /// outside the profile allow-list
    pub fn new(methodology: &MethodologyConfig) -> AppResult<Self> {
        methodology.validate()?;

        let rules = methodology
            .assumptions
            .iter()
            .enumerate()
            .map(|(index, assumption)| compile_assumption(index, assumption))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::from(e).with_methodology_id(&methodology.id))?;

        let gates = methodology
            .safety_gates
            .exclusion_criteria
            .iter()
            .enumerate()
            .map(|(index, criterion)| compile_gate(index, criterion))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::from(e).with_methodology_id(&methodology.id))?;

        debug!(
            methodology_id = %methodology.id,
            assumptions = rules.len(),
            gates = gates.len(),
            "Compiled methodology rules"
        );

        Ok(Self {
            methodology: methodology.clone(),
            rules,
            gates,
        })
    }

    /// Methodology this validator evaluates against
    #[must_use]
    pub const fn methodology(&self) -> &MethodologyConfig {
        &self.methodology
    }

    /// Validate a profile, stamping the trace with the current time
    ///
    /// # Errors
    ///
    /// Returns a schema violation when the profile breaks a schema bound
    pub fn validate(&self, profile: &UserProfile) -> AppResult<ValidationResult> {
        self.validate_at(profile, Utc::now())
    }

    /// Validate a profile with an explicit trace timestamp
    ///
    /// The result is a pure function of the profile, the methodology and the
    /// timestamp.
    ///
    /// # Errors
    ///
    /// Returns a schema violation when the profile breaks a schema bound
    pub fn validate_at(
        &self,
        profile: &UserProfile,
        timestamp: DateTime<Utc>,
    ) -> AppResult<ValidationResult> {
        profile
            .validate()
            .map_err(|e| AppError::from(e).with_athlete_id(&profile.athlete_id))?;

        let checks: Vec<AssumptionCheck> = self
            .methodology
            .assumptions
            .iter()
            .zip(&self.rules)
            .map(|(assumption, rule)| Self::check_assumption(assumption, rule, profile))
            .collect();

        let gate_evaluations: Vec<GateEvaluation> = self
            .methodology
            .safety_gates
            .exclusion_criteria
            .iter()
            .zip(&self.gates)
            .map(|(criterion, gate)| self.evaluate_gate(criterion, gate, profile))
            .collect();

        let blocking = gate_evaluations
            .iter()
            .filter(|gate| gate.is_blocking_violation())
            .count();
        let warnings: Vec<String> = gate_evaluations
            .iter()
            .filter(|gate| gate.is_warning())
            .map(|gate| {
                format!(
                    "⚠️ {}: {}",
                    gate.condition,
                    gate.recommendation.as_deref().unwrap_or_default()
                )
            })
            .collect();

        let status = if blocking > 0 {
            ValidationStatus::Refused
        } else if warnings.is_empty() {
            ValidationStatus::Approved
        } else {
            ValidationStatus::ApprovedWithWarnings
        };

        let trace = ReasoningTrace {
            timestamp,
            methodology_id: self.methodology.id.clone(),
            methodology_version: self.methodology.version.clone(),
            athlete_id: profile.athlete_id.clone(),
            checks,
            gate_evaluations,
            result: status,
            fragility_score: None,
        };

        let refusal = (status == ValidationStatus::Refused).then(|| RefusalResponse {
            message: format!(
                "⛔ Cannot generate training plan - {blocking} blocking condition(s) detected"
            ),
            violations: trace.violations().into_iter().cloned().collect(),
        });

        info!(
            athlete_id = %profile.athlete_id,
            methodology_id = %self.methodology.id,
            status = %status,
            failed_assumptions = trace.failed_checks().count(),
            blocking_violations = blocking,
            warnings = warnings.len(),
            "Validation complete"
        );

        Ok(ValidationResult {
            approved: status.is_approved(),
            status,
            trace,
            warnings,
            refusal,
        })
    }

    fn check_assumption(
        assumption: &Assumption,
        rule: &CompiledRule,
        profile: &UserProfile,
    ) -> AssumptionCheck {
        let user_value = rule.field.get(profile);
        let (passed, reasoning) = match &user_value {
            Some(value) if rule.predicate.evaluate(value) => (
                true,
                format!(
                    "{} - Satisfied. {}",
                    assumption.expectation, assumption.reasoning_justification
                ),
            ),
            Some(_) => (
                false,
                format!(
                    "{} - NOT satisfied. {}",
                    assumption.expectation, assumption.reasoning_justification
                ),
            ),
            None => (
                false,
                format!(
                    "{} - NOT satisfied (missing data: {} not provided). {}",
                    assumption.expectation, assumption.key, assumption.reasoning_justification
                ),
            ),
        };

        debug!(
            assumption = %assumption.key,
            passed,
            user_value = ?user_value,
            "Assumption checked"
        );

        AssumptionCheck {
            assumption_key: assumption.key.clone(),
            criticality: assumption.criticality,
            passed,
            user_value,
            expected: rule.predicate.to_string(),
            reasoning,
        }
    }

    fn evaluate_gate(
        &self,
        criterion: &ExclusionCriterion,
        gate: &CompiledGate,
        profile: &UserProfile,
    ) -> GateEvaluation {
        let user_value = gate.field.get(profile);
        let triggered = user_value
            .as_ref()
            .is_some_and(|value| gate.predicate.evaluate(value));
        let reasoning = gate_reasoning(criterion, user_value.as_ref(), triggered);
        let assumption = self.methodology.assumption(&criterion.condition);

        let mut evaluation = GateEvaluation {
            condition: criterion.condition.clone(),
            threshold: criterion.threshold.clone(),
            severity: criterion.severity,
            triggered,
            user_value,
            reasoning,
            recommendation: triggered.then(|| criterion.bridge_action.clone()),
            assumption_expectation: assumption.map(|a| a.expectation.clone()),
            reasoning_justification: assumption.map(|a| a.reasoning_justification.clone()),
            rendered_bridge: None,
        };
        if evaluation.is_blocking_violation() {
            evaluation.rendered_bridge = Some(render_refusal_bridge(
                &self.methodology.safety_gates.refusal_bridge_template,
                &BridgeFields::from_gate(&evaluation),
            ));
        }

        debug!(
            condition = %criterion.condition,
            severity = ?criterion.severity,
            triggered,
            "Safety gate evaluated"
        );

        evaluation
    }

    /// Plain-text validation report for terminal display
    #[must_use]
    pub fn summary_report(&self, result: &ValidationResult) -> String {
        let rule = "=".repeat(REPORT_RULE_WIDTH);
        let thin_rule = "─".repeat(REPORT_RULE_WIDTH);
        let mut lines = vec![
            rule.clone(),
            format!("VALIDATION REPORT: {}", self.methodology.name),
            rule.clone(),
            String::new(),
        ];

        match result.status {
            ValidationStatus::Approved => {
                lines.push("✅ STATUS: APPROVED".to_owned());
                lines.push(String::new());
                lines.push(
                    "All safety gates passed. Methodology is appropriate for current athlete state."
                        .to_owned(),
                );
            }
            ValidationStatus::ApprovedWithWarnings => {
                lines.push("⚠️  STATUS: APPROVED WITH WARNINGS".to_owned());
                lines.push(String::new());
                lines.push("Plan can proceed, but consider these warnings:".to_owned());
                lines.extend(result.warnings.iter().map(|w| format!("  • {w}")));
            }
            ValidationStatus::Refused => {
                lines.push("⛔ STATUS: REFUSED".to_owned());
                lines.push(String::new());
                if let Some(refusal) = &result.refusal {
                    lines.push(refusal.message.clone());
                    lines.push(String::new());
                    for (number, violation) in iter::zip(1.., &refusal.violations) {
                        if violation.severity != Severity::Blocking {
                            continue;
                        }
                        lines.push(format!("\n{thin_rule}"));
                        lines.push(format!("BLOCKING VIOLATION #{number}"));
                        lines.push(thin_rule.clone());
                        lines.push(violation.rendered_bridge.clone().unwrap_or_else(|| {
                            render_refusal_bridge(
                                &self.methodology.safety_gates.refusal_bridge_template,
                                &BridgeFields::from_gate(violation),
                            )
                        }));
                    }
                }
            }
        }

        lines.push(String::new());
        lines.push(rule.clone());
        lines.push(format!(
            "Timestamp: {}",
            result.trace.timestamp.format("%Y-%m-%d %H:%M:%S")
        ));
        lines.push(format!("Methodology: {}", result.trace.methodology_id));
        lines.push(format!("Athlete: {}", result.trace.athlete_id));
        lines.push(rule);
        lines.join("\n")
    }
}

fn compile_assumption(index: usize, assumption: &Assumption) -> Result<CompiledRule, SchemaError> {
    let location = format!("assumptions[{index}].validation_rule");
    let rule = compile_rule(&assumption.validation_rule, &location)?;
    if ProfileField::from_key(&assumption.key) != Some(rule.field) {
        return Err(SchemaError::InvalidExpression {
            field: location,
            expression: assumption.validation_rule.clone(),
            reason: format!(
                "rule reads '{}' but the assumption key is '{}'",
                rule.field.key(),
                assumption.key
            ),
        });
    }
    Ok(rule)
}

fn compile_gate(index: usize, criterion: &ExclusionCriterion) -> Result<CompiledGate, SchemaError> {
    let location = format!("safety_gates.exclusion_criteria[{index}]");
    let field = ProfileField::from_key(&criterion.condition).ok_or_else(|| {
        SchemaError::InvalidExpression {
            field: format!("{location}.condition"),
            expression: criterion.condition.clone(),
            reason: format!("unknown profile field '{}'", criterion.condition),
        }
    })?;
    let predicate = compile_threshold(&criterion.threshold, field, &format!("{location}.threshold"))?;
    Ok(CompiledGate { field, predicate })
}

fn gate_reasoning(
    criterion: &ExclusionCriterion,
    user_value: Option<&FieldValue>,
    triggered: bool,
) -> String {
    match user_value {
        None => format!(
            "Not evaluated (missing data: {} not provided). Gate '{}' cannot trigger without a value.",
            criterion.condition, criterion.validation_logic
        ),
        Some(value) if triggered => format!(
            "Triggered: {} = {value} meets '{}'. {}",
            criterion.condition, criterion.threshold, criterion.validation_logic
        ),
        Some(value) => format!(
            "Passed: {} = {value} does not meet '{}'.",
            criterion.condition, criterion.threshold
        ),
    }
}
