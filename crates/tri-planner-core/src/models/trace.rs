// ABOUTME: Reasoning trace model: assumption checks, gate evaluations and the validation outcome
// ABOUTME: Produced fresh per validation call and serialized verbatim for audit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::field::FieldValue;
use super::methodology::{Criticality, Severity};

/// Overall validation decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Every gate passed
    Approved,
    /// Only warning gates fired
    ApprovedWithWarnings,
    /// At least one blocking gate fired
    Refused,
}

impl ValidationStatus {
    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::ApprovedWithWarnings => "approved_with_warnings",
            Self::Refused => "refused",
        }
    }

    /// Whether a plan may be generated
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        !matches!(self, Self::Refused)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one assumption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumptionCheck {
    /// Assumption key
    pub assumption_key: String,
    /// Assumption criticality
    pub criticality: Criticality,
    /// Whether the predicate held
    pub passed: bool,
    /// Value read from the profile, `None` when missing
    pub user_value: Option<FieldValue>,
    /// Expected value as written in the rule
    pub expected: String,
    /// Explanation
    pub reasoning: String,
}

/// Result of evaluating one safety gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateEvaluation {
    /// Profile field the gate reads
    pub condition: String,
    /// Trigger expression
    pub threshold: String,
    /// Blocking or warning
    pub severity: Severity,
    /// Whether the gate fired
    pub triggered: bool,
    /// Value read from the profile
    pub user_value: Option<FieldValue>,
    /// Explanation
    pub reasoning: String,
    /// Bridge action, set when triggered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Expectation of the assumption sharing this key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumption_expectation: Option<String>,
    /// Justification of the assumption sharing this key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_justification: Option<String>,
    /// Rendered refusal bridge, set for triggered blocking gates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_bridge: Option<String>,
}

impl GateEvaluation {
    /// Triggered with blocking severity
    #[must_use]
    pub fn is_blocking_violation(&self) -> bool {
        self.triggered && self.severity == Severity::Blocking
    }

    /// Triggered with warning severity
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.triggered && self.severity == Severity::Warning
    }
}

/// Complete record of one validation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningTrace {
    /// When validation ran
    pub timestamp: DateTime<Utc>,
    /// Methodology evaluated against
    pub methodology_id: String,
    /// Methodology version
    pub methodology_version: String,
    /// Athlete evaluated
    pub athlete_id: String,
    /// One entry per assumption, in configuration order
    pub checks: Vec<AssumptionCheck>,
    /// One entry per gate, in configuration order
    pub gate_evaluations: Vec<GateEvaluation>,
    /// Decision
    pub result: ValidationStatus,
    /// Attached once fragility has been computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragility_score: Option<f64>,
}

impl ReasoningTrace {
    /// Checks that held
    pub fn passed_checks(&self) -> impl Iterator<Item = &AssumptionCheck> {
        self.checks.iter().filter(|check| check.passed)
    }

    /// Checks that did not hold
    pub fn failed_checks(&self) -> impl Iterator<Item = &AssumptionCheck> {
        self.checks.iter().filter(|check| !check.passed)
    }

    /// Triggered gates, blocking first then warnings, otherwise in configuration order
    #[must_use]
    pub fn violations(&self) -> Vec<&GateEvaluation> {
        let mut violations: Vec<_> = self
            .gate_evaluations
            .iter()
            .filter(|gate| gate.triggered)
            .collect();
        violations.sort_by_key(|gate| gate.severity);
        violations
    }

    /// Triggered blocking gates
    pub fn blocking_violations(&self) -> impl Iterator<Item = &GateEvaluation> {
        self.gate_evaluations
            .iter()
            .filter(|gate| gate.is_blocking_violation())
    }

    /// Triggered warning gates
    pub fn warnings(&self) -> impl Iterator<Item = &GateEvaluation> {
        self.gate_evaluations.iter().filter(|gate| gate.is_warning())
    }

    /// Gates that did not fire
    pub fn passed_gates(&self) -> impl Iterator<Item = &GateEvaluation> {
        self.gate_evaluations.iter().filter(|gate| !gate.triggered)
    }

    /// Copy of the trace with the fragility score attached
    #[must_use]
    pub fn with_fragility_score(mut self, score: f64) -> Self {
        self.fragility_score = Some(score);
        self
    }
}

/// Structured refusal returned alongside a refused trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefusalResponse {
    /// Summary line
    pub message: String,
    /// Every triggered gate, blocking first
    pub violations: Vec<GateEvaluation>,
}

/// Outcome of a validation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether a plan may be generated
    pub approved: bool,
    /// Decision
    pub status: ValidationStatus,
    /// Full trace
    pub trace: ReasoningTrace,
    /// Formatted warning lines
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Present when refused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<RefusalResponse>,
}

impl ValidationResult {
    /// Whether this result belongs to `athlete_id` under `methodology_id`
    #[must_use]
    pub fn belongs_to(&self, athlete_id: &str, methodology_id: &str) -> bool {
        self.trace.athlete_id == athlete_id && self.trace.methodology_id == methodology_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(condition: &str, severity: Severity, triggered: bool) -> GateEvaluation {
        GateEvaluation {
            condition: condition.to_owned(),
            threshold: "true".to_owned(),
            severity,
            triggered,
            user_value: Some(FieldValue::Bool(triggered)),
            reasoning: String::new(),
            recommendation: None,
            assumption_expectation: None,
            reasoning_justification: None,
            rendered_bridge: None,
        }
    }

    #[test]
    fn test_violations_put_blocking_first() {
        let trace = ReasoningTrace {
            timestamp: Utc::now(),
            methodology_id: "polarized".into(),
            methodology_version: "1.0.0".into(),
            athlete_id: "athlete_001".into(),
            checks: Vec::new(),
            gate_evaluations: vec![
                gate("recent_illness", Severity::Warning, true),
                gate("sleep_hours", Severity::Blocking, false),
                gate("injury_status", Severity::Blocking, true),
            ],
            result: ValidationStatus::Refused,
            fragility_score: None,
        };
        let conditions: Vec<_> = trace
            .violations()
            .iter()
            .map(|gate| gate.condition.as_str())
            .collect();
        assert_eq!(conditions, vec!["injury_status", "recent_illness"]);
        assert_eq!(trace.blocking_violations().count(), 1);
        assert_eq!(trace.warnings().count(), 1);
        assert_eq!(trace.passed_gates().count(), 1);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ValidationStatus::ApprovedWithWarnings).unwrap(),
            "\"approved_with_warnings\""
        );
        assert!(!ValidationStatus::Refused.is_approved());
    }
}
