// ABOUTME: Compiles methodology validation rules and gate thresholds into typed predicates
// ABOUTME: Small closed grammar: comparisons, inclusive ranges, equality, membership and OR
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Rule and threshold expressions
//!
//! Assumption rules name their field (`user.sleep_hours >= 7.0`); gate
//! thresholds do not (`< 6.0`, `true`, `< 4.0 OR > 25.0`) because the field
//! comes from the gate's `condition`. Both compile to a [`Predicate`] once,
//! when the validator is built, so evaluation never re-parses text.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tri_planner_core::errors::SchemaError;
use tri_planner_core::models::{FieldKind, FieldValue, ProfileField};

static RANGE_RULE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+(?:\.\d+)?)\s*<=\s*([a-z_]+)\s*<=\s*(-?\d+(?:\.\d+)?)$").ok()
});

static MEMBERSHIP_RULE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([a-z_]+)\s+in\s+\[(.*)\]$").ok());

static COMPARISON_RULE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([a-z_]+)\s*(<=|>=|==|<|>)\s*(.+)$").ok());

static THRESHOLD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(<=|>=|==|<|>)\s*(.+)$").ok());

/// Numeric comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Comparison {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn holds(self, actual: f64, bound: f64) -> bool {
        match self {
            Self::Lt => actual < bound,
            Self::Le => actual <= bound,
            Self::Gt => actual > bound,
            Self::Ge => actual >= bound,
        }
    }
}

/// A compiled condition over one profile value
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `value <op> bound`
    Compare {
        /// Operator
        op: Comparison,
        /// Right-hand side
        bound: f64,
    },
    /// `lower <= value <= upper`
    Between {
        /// Inclusive lower bound
        lower: f64,
        /// Inclusive upper bound
        upper: f64,
    },
    /// `value == true|false`
    IsBool(bool),
    /// `value == 'text'`
    IsText(String),
    /// `value in ['a', 'b']`
    OneOf(Vec<String>),
    /// Any alternative holds
    Any(Vec<Self>),
}

impl Predicate {
    /// Evaluate against a present value
    #[must_use]
    pub fn evaluate(&self, value: &FieldValue) -> bool {
        match self {
            Self::Compare { op, bound } => value
                .as_number()
                .is_some_and(|actual| op.holds(actual, *bound)),
            Self::Between { lower, upper } => value
                .as_number()
                .is_some_and(|actual| *lower <= actual && actual <= *upper),
            Self::IsBool(expected) => value.as_bool() == Some(*expected),
            Self::IsText(expected) => value.to_string() == *expected,
            Self::OneOf(options) => value
                .as_text()
                .is_some_and(|actual| options.iter().any(|option| option == actual)),
            Self::Any(alternatives) => alternatives.iter().any(|p| p.evaluate(value)),
        }
    }

    /// Whether the predicate can ever hold for a field of `kind`
    fn accepts(&self, kind: FieldKind) -> bool {
        match self {
            Self::Compare { .. } | Self::Between { .. } => kind == FieldKind::Number,
            Self::IsBool(_) => kind == FieldKind::Bool,
            Self::IsText(_) | Self::OneOf(_) => kind == FieldKind::Text,
            Self::Any(alternatives) => alternatives.iter().all(|p| p.accepts(kind)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { op, bound } => write!(f, "{} {bound}", op.symbol()),
            Self::Between { lower, upper } => write!(f, "{lower}-{upper}"),
            Self::IsBool(expected) => write!(f, "{expected}"),
            Self::IsText(expected) => f.write_str(expected),
            Self::OneOf(options) => {
                let quoted: Vec<String> = options.iter().map(|o| format!("'{o}'")).collect();
                write!(f, "[{}]", quoted.join(", "))
            }
            Self::Any(alternatives) => {
                let parts: Vec<String> = alternatives.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(" OR "))
            }
        }
    }
}

/// A compiled assumption rule: field plus predicate
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    /// Field the rule reads
    pub field: ProfileField,
    /// Condition the value must satisfy
    pub predicate: Predicate,
}

fn invalid(field: &str, expression: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::InvalidExpression {
        field: field.to_owned(),
        expression: expression.to_owned(),
        reason: reason.into(),
    }
}

fn captures<'t>(pattern: &LazyLock<Option<Regex>>, text: &'t str) -> Option<Captures<'t>> {
    pattern.as_ref().and_then(|re| re.captures(text))
}

fn parse_number(text: &str, field: &str, expression: &str) -> Result<f64, SchemaError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| invalid(field, expression, format!("'{}' is not a number", text.trim())))
}

fn unquote(text: &str) -> Option<&str> {
    let text = text.trim();
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .or_else(|| text.strip_prefix('"').and_then(|t| t.strip_suffix('"')))?;
    Some(inner)
}

/// Right-hand side of `==`: boolean literal or quoted text
fn parse_equality(rhs: &str, field: &str, expression: &str) -> Result<Predicate, SchemaError> {
    let rhs = rhs.trim();
    if rhs.eq_ignore_ascii_case("true") {
        return Ok(Predicate::IsBool(true));
    }
    if rhs.eq_ignore_ascii_case("false") {
        return Ok(Predicate::IsBool(false));
    }
    unquote(rhs)
        .map(|text| Predicate::IsText(text.to_owned()))
        .ok_or_else(|| invalid(field, expression, "equality needs true, false or a quoted value"))
}

fn parse_operator(op: &str, rhs: &str, field: &str, expression: &str) -> Result<Predicate, SchemaError> {
    if op == "==" {
        return parse_equality(rhs, field, expression);
    }
    let op = Comparison::parse(op)
        .ok_or_else(|| invalid(field, expression, format!("unsupported operator '{op}'")))?;
    Ok(Predicate::Compare {
        op,
        bound: parse_number(rhs, field, expression)?,
    })
}

fn resolve_field(key: &str, field: &str, expression: &str) -> Result<ProfileField, SchemaError> {
    ProfileField::from_key(key)
        .ok_or_else(|| invalid(field, expression, format!("unknown profile field '{key}'")))
}

fn check_kind(
    profile_field: ProfileField,
    predicate: &Predicate,
    field: &str,
    expression: &str,
) -> Result<(), SchemaError> {
    if predicate.accepts(profile_field.kind()) {
        Ok(())
    } else {
        Err(invalid(
            field,
            expression,
            format!(
                "'{}' holds {} and cannot be compared this way",
                profile_field.key(),
                profile_field.expected_kind()
            ),
        ))
    }
}

/// Compile an assumption `validation_rule`
///
/// `field` names the document location for error reporting.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidExpression`] when the rule is outside the
/// grammar, names a field outside the allow-list, or compares a field with a
/// value of the wrong kind
pub fn compile_rule(rule: &str, field: &str) -> Result<CompiledRule, SchemaError> {
    let text = rule.trim().replace("user.", "");

    let (key, predicate) = if let Some(caps) = captures(&RANGE_RULE, &text) {
        let lower = parse_number(&caps[1], field, rule)?;
        let upper = parse_number(&caps[3], field, rule)?;
        if lower > upper {
            return Err(invalid(field, rule, "range lower bound exceeds upper bound"));
        }
        (caps[2].to_owned(), Predicate::Between { lower, upper })
    } else if let Some(caps) = captures(&MEMBERSHIP_RULE, &text) {
        let options: Vec<String> = caps[2]
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| unquote(item).unwrap_or(item).to_owned())
            .collect();
        if options.is_empty() {
            return Err(invalid(field, rule, "membership list is empty"));
        }
        (caps[1].to_owned(), Predicate::OneOf(options))
    } else if let Some(caps) = captures(&COMPARISON_RULE, &text) {
        (
            caps[1].to_owned(),
            parse_operator(&caps[2], &caps[3], field, rule)?,
        )
    } else {
        return Err(invalid(field, rule, "unrecognized rule"));
    };

    let profile_field = resolve_field(&key, field, rule)?;
    check_kind(profile_field, &predicate, field, rule)?;
    Ok(CompiledRule {
        field: profile_field,
        predicate,
    })
}

/// Compile a gate `threshold` for the field named by the gate's condition
///
/// # Errors
///
/// Returns [`SchemaError::InvalidExpression`] when any alternative is outside
/// the grammar or does not fit the field's kind
pub fn compile_threshold(
    threshold: &str,
    profile_field: ProfileField,
    field: &str,
) -> Result<Predicate, SchemaError> {
    let predicate = parse_threshold(threshold.trim(), field, threshold)?;
    check_kind(profile_field, &predicate, field, threshold)?;
    Ok(predicate)
}

fn parse_threshold(text: &str, field: &str, expression: &str) -> Result<Predicate, SchemaError> {
    if text.contains(" OR ") {
        let alternatives = text
            .split(" OR ")
            .map(|part| parse_threshold(part.trim(), field, expression))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Predicate::Any(alternatives));
    }
    if text.eq_ignore_ascii_case("true") {
        return Ok(Predicate::IsBool(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Ok(Predicate::IsBool(false));
    }
    let caps = captures(&THRESHOLD, text)
        .ok_or_else(|| invalid(field, expression, "unrecognized threshold"))?;
    parse_operator(&caps[1], &caps[2], field, expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_rule_with_user_prefix() {
        let rule = compile_rule("user.sleep_hours >= 7.0", "assumptions[0]").unwrap();
        assert_eq!(rule.field, ProfileField::SleepHours);
        assert!(rule.predicate.evaluate(&FieldValue::Number(7.0)));
        assert!(!rule.predicate.evaluate(&FieldValue::Number(6.9)));
        assert_eq!(rule.predicate.to_string(), ">= 7");
    }

    #[test]
    fn test_range_rule_is_inclusive() {
        let rule = compile_rule("6.0 <= user.weekly_volume_hours <= 20.0", "a").unwrap();
        assert_eq!(rule.field, ProfileField::WeeklyVolumeHours);
        assert!(rule.predicate.evaluate(&FieldValue::Number(6.0)));
        assert!(rule.predicate.evaluate(&FieldValue::Number(20.0)));
        assert!(!rule.predicate.evaluate(&FieldValue::Number(20.5)));
        assert_eq!(rule.predicate.to_string(), "6-20");
    }

    #[test]
    fn test_membership_and_equality_rules() {
        let rule = compile_rule("user.stress_level in ['low', 'moderate']", "a").unwrap();
        assert!(rule.predicate.evaluate(&FieldValue::from("moderate")));
        assert!(!rule.predicate.evaluate(&FieldValue::from("high")));

        let rule = compile_rule("user.injury_status == false", "a").unwrap();
        assert!(rule.predicate.evaluate(&FieldValue::Bool(false)));
        assert!(!rule.predicate.evaluate(&FieldValue::Bool(true)));
    }

    #[test]
    fn test_unknown_field_and_kind_mismatch_rejected() {
        assert!(matches!(
            compile_rule("user.favourite_color == 'blue'", "a"),
            Err(SchemaError::InvalidExpression { .. })
        ));
        assert!(compile_rule("user.stress_level >= 3", "a").is_err());
        assert!(compile_rule("user.sleep_hours", "a").is_err());
    }

    #[test]
    fn test_compound_threshold() {
        let gate =
            compile_threshold("< 4.0 OR > 25.0", ProfileField::WeeklyVolumeHours, "g").unwrap();
        assert!(gate.evaluate(&FieldValue::Number(3.0)));
        assert!(gate.evaluate(&FieldValue::Number(26.0)));
        assert!(!gate.evaluate(&FieldValue::Number(10.0)));
        assert_eq!(gate.to_string(), "< 4 OR > 25");
    }

    #[test]
    fn test_text_and_bool_thresholds() {
        let gate = compile_threshold("== 'high'", ProfileField::StressLevel, "g").unwrap();
        assert!(gate.evaluate(&FieldValue::from("high")));
        let gate = compile_threshold("true", ProfileField::InjuryStatus, "g").unwrap();
        assert!(gate.evaluate(&FieldValue::Bool(true)));
        assert!(compile_threshold("true", ProfileField::SleepHours, "g").is_err());
        assert!(compile_threshold("about six", ProfileField::SleepHours, "g").is_err());
    }
}
