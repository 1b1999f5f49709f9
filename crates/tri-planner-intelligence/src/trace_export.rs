// ABOUTME: Reasoning trace export to JSON and human-readable Markdown audit reports
// ABOUTME: Bundles a validation trace with optional fragility details and plan decisions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::Write;

use serde::Serialize;
use tri_planner_core::errors::AppResult;
use tri_planner_core::models::{
    AssumptionCheck, FieldValue, FragilityFactor, FragilityResult, GateEvaluation, PlanDecision,
    ReasoningTrace, ValidationStatus,
};

/// Audit view over one engine run
///
/// JSON output is the trace itself with `fragility_details` and
/// `plan_decisions` added alongside, so a saved report still deserializes as a
/// [`ReasoningTrace`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TraceReport<'a> {
    #[serde(flatten)]
    trace: &'a ReasoningTrace,
    #[serde(skip_serializing_if = "Option::is_none")]
    fragility_details: Option<&'a FragilityResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan_decisions: Option<&'a [PlanDecision]>,
}

impl<'a> TraceReport<'a> {
    /// Report over a bare validation trace
    #[must_use]
    pub const fn new(trace: &'a ReasoningTrace) -> Self {
        Self {
            trace,
            fragility_details: None,
            plan_decisions: None,
        }
    }

    /// Include the fragility calculation
    #[must_use]
    pub const fn with_fragility(mut self, fragility: &'a FragilityResult) -> Self {
        self.fragility_details = Some(fragility);
        self
    }

    /// Include plan generation decisions
    #[must_use]
    pub const fn with_plan_decisions(mut self, decisions: &'a [PlanDecision]) -> Self {
        if !decisions.is_empty() {
            self.plan_decisions = Some(decisions);
        }
        self
    }

    /// Trace being reported
    #[must_use]
    pub const fn trace(&self) -> &'a ReasoningTrace {
        self.trace
    }

    fn fragility_score(&self) -> Option<f64> {
        self.trace
            .fragility_score
            .or_else(|| self.fragility_details.map(|f| f.score))
    }

    /// Compact JSON
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the report cannot be encoded
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the report cannot be encoded
    pub fn to_json_pretty(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Markdown audit report
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        self.write_header(&mut out);
        self.write_assumptions(&mut out);
        self.write_gates(&mut out);
        self.write_decision(&mut out);
        self.write_fragility(&mut out);
        self.write_plan_decisions(&mut out);
        out.push_str("*This trace provides full transparency into the validation decision process.*");
        out
    }

    fn write_header(&self, out: &mut String) {
        let trace = self.trace;
        let _ = writeln!(out, "# Reasoning Trace\n");
        let _ = writeln!(
            out,
            "**Timestamp:** {}",
            trace.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(out, "**Methodology:** `{}`", trace.methodology_id);
        let _ = writeln!(out, "**Athlete:** `{}`", trace.athlete_id);
        let _ = writeln!(
            out,
            "**Result:** **{}**",
            trace.result.as_str().to_uppercase()
        );
        if let Some(score) = self.fragility_score() {
            let _ = writeln!(out, "**Fragility Score:** {score:.2}");
        }
        section_break(out);
    }

    fn write_assumptions(&self, out: &mut String) {
        let _ = writeln!(out, "## Assumption Validation\n");
        let checks = &self.trace.checks;
        if checks.is_empty() {
            let _ = writeln!(out, "*No assumption checks performed*");
        } else {
            let passed: Vec<_> = self.trace.passed_checks().collect();
            let failed: Vec<_> = self.trace.failed_checks().collect();
            let _ = writeln!(
                out,
                "**Summary:** {}/{} assumptions satisfied\n",
                passed.len(),
                checks.len()
            );
            if !failed.is_empty() {
                let _ = writeln!(out, "### ❌ Failed Checks\n");
                failed.iter().for_each(|check| write_check(out, check));
            }
            if !passed.is_empty() {
                let _ = writeln!(out, "### ✅ Passed Checks\n");
                passed.iter().for_each(|check| write_check(out, check));
            }
        }
        section_break(out);
    }

    fn write_gates(&self, out: &mut String) {
        let _ = writeln!(out, "## Safety Gate Evaluation\n");
        let blocking: Vec<_> = self.trace.blocking_violations().collect();
        let warnings: Vec<_> = self.trace.warnings().collect();

        if blocking.is_empty() && warnings.is_empty() {
            let _ = writeln!(out, "✅ **No safety gate violations detected**\n");
        } else {
            let _ = writeln!(
                out,
                "**Violations:** {} blocking, {} warnings\n",
                blocking.len(),
                warnings.len()
            );
        }

        if !blocking.is_empty() {
            let _ = writeln!(out, "### ⛔ Blocking Violations\n");
            for (number, gate) in (1..).zip(&blocking) {
                write_gate_heading(out, number, gate);
                if let Some(justification) = &gate.reasoning_justification {
                    let _ = writeln!(out, "- **Why It Matters:** {justification}");
                }
                let _ = writeln!(out, "- **Path Forward:** {}\n", recommendation(gate));
            }
        }

        if !warnings.is_empty() {
            let _ = writeln!(out, "### ⚠️ Warnings\n");
            for (number, gate) in (1..).zip(&warnings) {
                write_gate_heading(out, number, gate);
                let _ = writeln!(out, "- **Recommendation:** {}\n", recommendation(gate));
            }
        }

        let passed: Vec<_> = self.trace.passed_gates().collect();
        if !passed.is_empty() {
            let _ = writeln!(out, "### ✅ Passed Gates\n");
            for gate in passed {
                let _ = writeln!(
                    out,
                    "- `{} {}`: {}",
                    gate.condition, gate.threshold, gate.reasoning
                );
            }
            out.push('\n');
        }
        section_break(out);
    }

    fn write_decision(&self, out: &mut String) {
        let _ = writeln!(out, "## Final Decision\n");
        let (banner, detail) = match self.trace.result {
            ValidationStatus::Approved => (
                "✅ **APPROVED**",
                "All safety gates passed. The methodology is appropriate for the athlete's current state.",
            ),
            ValidationStatus::ApprovedWithWarnings => (
                "⚠️ **APPROVED WITH WARNINGS**",
                "Plan can proceed, but non-critical warnings were identified. Review recommendations above.",
            ),
            ValidationStatus::Refused => (
                "⛔ **REFUSED**",
                "Plan generation refused due to safety gate violations. Address blocking conditions before proceeding.",
            ),
        };
        let _ = writeln!(out, "{banner}\n\n{detail}\n");
        section_break(out);
    }

    fn write_fragility(&self, out: &mut String) {
        let Some(details) = self.fragility_details else {
            return;
        };
        let _ = writeln!(out, "## Fragility Score Calculation\n");
        let _ = writeln!(
            out,
            "**Base Fragility:** {:.3} (from methodology)\n",
            details.base_fragility
        );
        let _ = writeln!(out, "| Sensitivity Factor | Penalty | Contribution | Weighted Impact |");
        let _ = writeln!(out, "|--------------------|---------|--------------|-----------------|");
        for (factor, contribution) in &details.breakdown {
            let penalty = details.penalties.get(factor).copied().unwrap_or(0.0);
            let _ = writeln!(
                out,
                "| {} | {penalty:.3} | {contribution:+.4} | {:+.2}% |",
                factor_display(*factor),
                contribution * 100.0
            );
        }
        let score = self.fragility_score().unwrap_or(details.score);
        let _ = writeln!(
            out,
            "\n**Final F-Score:** {score:.3} → **{}**\n",
            details.interpretation
        );
        if !details.recommendations.is_empty() {
            let _ = writeln!(out, "**Recommendations:**");
            for (number, text) in (1..).zip(&details.recommendations) {
                let _ = writeln!(out, "{number}. {text}");
            }
            out.push('\n');
        }
        section_break(out);
    }

    fn write_plan_decisions(&self, out: &mut String) {
        let Some(decisions) = self.plan_decisions else {
            return;
        };
        let _ = writeln!(out, "## Plan Generation Decisions\n");
        for (number, decision) in (1..).zip(decisions) {
            let _ = writeln!(out, "### Decision {number}: {}\n", decision.decision_point);
            let _ = writeln!(
                out,
                "**Input Factors:** {}\n",
                decision.input_factors.join(", ")
            );
            let _ = writeln!(out, "**Reasoning:** {}\n", decision.reasoning);
            let _ = writeln!(out, "**Outcome:** {}\n", decision.outcome);
        }
        section_break(out);
    }
}

fn section_break(out: &mut String) {
    out.push_str("\n---\n\n");
}

fn display_value(value: Option<&FieldValue>) -> String {
    value.map_or_else(|| "N/A".to_owned(), ToString::to_string)
}

fn write_check(out: &mut String, check: &AssumptionCheck) {
    let _ = writeln!(out, "#### `{}`", check.assumption_key);
    let _ = writeln!(
        out,
        "- **User Value:** `{}`",
        display_value(check.user_value.as_ref())
    );
    let _ = writeln!(out, "- **Required:** `{}`", check.expected);
    let _ = writeln!(out, "- **Reasoning:** {}\n", check.reasoning);
}

fn write_gate_heading(out: &mut String, number: usize, gate: &GateEvaluation) {
    let _ = writeln!(out, "#### {number}. {}", gate.condition);
    let _ = writeln!(
        out,
        "- **Condition:** `{} {}` (value: `{}`)",
        gate.condition,
        gate.threshold,
        display_value(gate.user_value.as_ref())
    );
    if let Some(expectation) = &gate.assumption_expectation {
        let _ = writeln!(out, "- **Violated Assumption:** {expectation}");
    }
}

fn recommendation(gate: &GateEvaluation) -> &str {
    gate.recommendation.as_deref().unwrap_or(&gate.reasoning)
}

/// `sleep_deviation` -> `Sleep Deviation`
fn factor_display(factor: FragilityFactor) -> String {
    factor
        .as_str()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use tri_planner_core::models::{Criticality, RiskLevel, Severity};

    use super::*;

    fn trace(result: ValidationStatus) -> ReasoningTrace {
        ReasoningTrace {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
            methodology_id: "polarized_80_20_v1".to_owned(),
            methodology_version: "1.0.0".to_owned(),
            athlete_id: "athlete_001".to_owned(),
            checks: vec![
                AssumptionCheck {
                    assumption_key: "sleep_hours".to_owned(),
                    criticality: Criticality::High,
                    passed: true,
                    user_value: Some(FieldValue::Number(7.5)),
                    expected: "sleep_hours >= 7.0".to_owned(),
                    reasoning: "Adequate sleep - Satisfied.".to_owned(),
                },
                AssumptionCheck {
                    assumption_key: "weekly_volume_hours".to_owned(),
                    criticality: Criticality::Medium,
                    passed: false,
                    user_value: None,
                    expected: "weekly_volume_hours >= 6".to_owned(),
                    reasoning: "Volume - NOT satisfied (missing data).".to_owned(),
                },
            ],
            gate_evaluations: vec![GateEvaluation {
                condition: "current_injury".to_owned(),
                threshold: "true".to_owned(),
                severity: Severity::Blocking,
                triggered: result == ValidationStatus::Refused,
                user_value: Some(FieldValue::Bool(result == ValidationStatus::Refused)),
                reasoning: "Injury gate".to_owned(),
                recommendation: Some("See a physio first".to_owned()),
                assumption_expectation: None,
                reasoning_justification: Some("Training through injury compounds damage".to_owned()),
                rendered_bridge: None,
            }],
            result,
            fragility_score: None,
        }
    }

    #[test]
    fn test_markdown_lists_failed_checks_first() {
        let trace = trace(ValidationStatus::Approved);
        let markdown = TraceReport::new(&trace).to_markdown();
        let failed = markdown.find("### ❌ Failed Checks").unwrap();
        let passed = markdown.find("### ✅ Passed Checks").unwrap();
        assert!(failed < passed);
        assert!(markdown.contains("**Summary:** 1/2 assumptions satisfied"));
        assert!(markdown.contains("- **User Value:** `N/A`"));
        assert!(markdown.contains("✅ **No safety gate violations detected**"));
        assert!(markdown.contains("**Result:** **APPROVED**"));
        assert!(markdown
            .ends_with("*This trace provides full transparency into the validation decision process.*"));
    }

    #[test]
    fn test_markdown_refusal_shows_path_forward() {
        let trace = trace(ValidationStatus::Refused);
        let markdown = TraceReport::new(&trace).to_markdown();
        assert!(markdown.contains("**Violations:** 1 blocking, 0 warnings"));
        assert!(markdown.contains("- **Path Forward:** See a physio first"));
        assert!(markdown.contains("⛔ **REFUSED**"));
        assert!(!markdown.contains("## Fragility Score Calculation"));
    }

    #[test]
    fn test_markdown_fragility_and_decisions() {
        let trace = trace(ValidationStatus::Approved).with_fragility_score(0.5237);
        let breakdown = BTreeMap::from([(FragilityFactor::SleepDeviation, 0.0625)]);
        let fragility = FragilityResult {
            athlete_id: "athlete_001".to_owned(),
            methodology_id: "polarized_80_20_v1".to_owned(),
            score: 0.5237,
            base_fragility: 0.4,
            risk_level: RiskLevel::Moderate,
            interpretation: "Moderate Risk".to_owned(),
            penalties: BTreeMap::from([(FragilityFactor::SleepDeviation, 0.25)]),
            breakdown,
            recommendations: vec!["Sleep more".to_owned()],
        };
        let decisions = vec![PlanDecision {
            decision_point: "Training Phase Distribution".to_owned(),
            input_factors: vec!["total_weeks=12".to_owned(), "has_race=true".to_owned()],
            reasoning: "Medium plan".to_owned(),
            outcome: "4wk base, 6wk build, 1wk peak, 1wk taper".to_owned(),
        }];
        let markdown = TraceReport::new(&trace)
            .with_fragility(&fragility)
            .with_plan_decisions(&decisions)
            .to_markdown();
        assert!(markdown.contains("**Fragility Score:** 0.52"));
        assert!(markdown.contains("| Sleep Deviation | 0.250 | +0.0625 | +6.25% |"));
        assert!(markdown.contains("**Final F-Score:** 0.524 → **Moderate Risk**"));
        assert!(markdown.contains("### Decision 1: Training Phase Distribution"));
        assert!(markdown.contains("**Input Factors:** total_weeks=12, has_race=true"));
    }

    #[test]
    fn test_json_still_reads_as_trace() {
        let trace = trace(ValidationStatus::Refused);
        let decisions = vec![PlanDecision {
            decision_point: "x".to_owned(),
            input_factors: Vec::new(),
            reasoning: "y".to_owned(),
            outcome: "z".to_owned(),
        }];
        let json = TraceReport::new(&trace)
            .with_plan_decisions(&decisions)
            .to_json_pretty()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["plan_decisions"][0]["outcome"], "z");
        let reloaded: ReasoningTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, trace);
    }
}
