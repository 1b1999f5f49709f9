// ABOUTME: Refusal bridge rendering: fills the methodology's template for a blocking violation
// ABOUTME: Fixed five-placeholder substitution, absent values render as N/A
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tri_planner_core::constants::trace::MISSING_PLACEHOLDER;
use tri_planner_core::models::GateEvaluation;

/// Values substituted into a refusal bridge template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeFields<'a> {
    /// Gate condition (`{condition}`)
    pub condition: &'a str,
    /// Gate threshold (`{threshold}`)
    pub threshold: &'a str,
    /// Expectation of the matching assumption (`{assumption_expectation}`)
    pub assumption_expectation: Option<&'a str>,
    /// Justification of the matching assumption (`{reasoning_justification}`)
    pub reasoning_justification: Option<&'a str>,
    /// What the athlete should do (`{bridge_action}`)
    pub bridge_action: Option<&'a str>,
}

impl<'a> BridgeFields<'a> {
    /// Fields of an evaluated gate
    #[must_use]
    pub fn from_gate(gate: &'a GateEvaluation) -> Self {
        Self {
            condition: &gate.condition,
            threshold: &gate.threshold,
            assumption_expectation: gate.assumption_expectation.as_deref(),
            reasoning_justification: gate.reasoning_justification.as_deref(),
            bridge_action: gate.recommendation.as_deref(),
        }
    }
}

/// Substitute the five named placeholders in one left-to-right pass; any
/// other text, including placeholders inside substituted values, is left untouched
#[must_use]
pub fn render_refusal_bridge(template: &str, fields: &BridgeFields<'_>) -> String {
    let placeholders: [(&str, &str); 5] = [
        ("{condition}", fields.condition),
        ("{threshold}", fields.threshold),
        (
            "{assumption_expectation}",
            fields.assumption_expectation.unwrap_or(MISSING_PLACEHOLDER),
        ),
        (
            "{reasoning_justification}",
            fields.reasoning_justification.unwrap_or(MISSING_PLACEHOLDER),
        ),
        (
            "{bridge_action}",
            fields.bridge_action.unwrap_or(MISSING_PLACEHOLDER),
        ),
    ];

    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some((placeholder, value)) = placeholders
            .iter()
            .find(|(placeholder, _)| tail.starts_with(*placeholder))
        {
            rendered.push_str(value);
            rest = &tail[placeholder.len()..];
        } else {
            rendered.push('{');
            rest = &tail[1..];
        }
    }
    rendered.push_str(rest);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "Condition: {condition} ({threshold})\nExpected: {assumption_expectation}\n\
                            Why: {reasoning_justification}\nAction: {bridge_action}";

    #[test]
    fn test_all_placeholders_substituted() {
        let rendered = render_refusal_bridge(
            TEMPLATE,
            &BridgeFields {
                condition: "sleep_hours",
                threshold: "< 6.0",
                assumption_expectation: Some("Athlete sleeps 7+ hours"),
                reasoning_justification: Some("Recovery depends on sleep"),
                bridge_action: Some("Extend sleep before starting"),
            },
        );
        assert!(rendered.contains("Condition: sleep_hours (< 6.0)"));
        assert!(rendered.contains("Expected: Athlete sleeps 7+ hours"));
        assert!(rendered.contains("Action: Extend sleep before starting"));
        assert!(!rendered.contains('{'));
    }

    #[test]
    fn test_absent_values_render_placeholder() {
        let rendered = render_refusal_bridge(
            TEMPLATE,
            &BridgeFields {
                condition: "injury_status",
                threshold: "true",
                assumption_expectation: None,
                reasoning_justification: None,
                bridge_action: Some("See a physio"),
            },
        );
        assert!(rendered.contains("Expected: N/A"));
        assert!(rendered.contains("Why: N/A"));
    }

    #[test]
    fn test_unknown_braces_left_alone() {
        let rendered = render_refusal_bridge(
            "{condition} {unknown}",
            &BridgeFields {
                condition: "c",
                threshold: "t",
                assumption_expectation: None,
                reasoning_justification: None,
                bridge_action: None,
            },
        );
        assert_eq!(rendered, "c {unknown}");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let rendered = render_refusal_bridge(
            TEMPLATE,
            &BridgeFields {
                condition: "stress_level",
                threshold: "== 'high'",
                assumption_expectation: Some("Stress stays {threshold}"),
                reasoning_justification: Some("Quoting {bridge_action} literally"),
                bridge_action: Some("Reduce {condition} load"),
            },
        );
        assert!(rendered.contains("Expected: Stress stays {threshold}"));
        assert!(rendered.contains("Why: Quoting {bridge_action} literally"));
        assert!(rendered.contains("Action: Reduce {condition} load"));
        assert!(rendered.starts_with("Condition: stress_level (== 'high')"));
    }
}
