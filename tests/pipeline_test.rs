// ABOUTME: End-to-end tests for the validate, fragility and planning chain
// ABOUTME: Uses the bundled polarized methodology and athlete fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    fixed_start_date, fixed_timestamp, high_fragility_athlete, low_fragility_athlete,
    moderate_athlete, polarized_methodology, refused_athlete, threshold_methodology,
};
use tri_planner::pipeline::Pipeline;
use tri_planner_core::errors::ErrorCode;
use tri_planner_core::models::{
    ExclusionCriterion, FragilityFactor, HrvTrend, RiskLevel, Severity, StressLevel, TrainingPhase, TrainingPlan,
    ValidationStatus, WeekType,
};
use tri_planner_intelligence::{FragilityCalculator, IntelligenceConfig, MethodologyValidator};

fn pipeline() -> Pipeline {
    Pipeline::new(&polarized_methodology())
        .unwrap()
        .with_config(IntelligenceConfig::default())
        .with_start_date(Some(fixed_start_date()))
}

#[test]
fn test_moderate_athlete_gets_plan() {
    let outcome = pipeline()
        .evaluate_at(&moderate_athlete(), fixed_timestamp())
        .unwrap();

    assert!(outcome.is_approved());
    assert_eq!(outcome.validation.status, ValidationStatus::Approved);
    assert!(outcome.validation.warnings.is_empty());
    assert!(outcome.validation.refusal.is_none());

    let fragility = outcome.fragility.as_ref().unwrap();
    // 0.315 + 0.28*0.3125 + 0.12*0.3 + 0.2*0.2 + 0.2*0.21
    assert!((fragility.score - 0.5205).abs() < 1e-9);
    assert_eq!(fragility.risk_level, RiskLevel::Moderate);
    assert_eq!(outcome.validation.trace.fragility_score, Some(fragility.score));

    let plan = outcome.plan.as_ref().unwrap();
    assert_eq!(plan.duration_weeks, 12);
    assert_eq!(plan.weeks.len(), 12);
    assert_eq!(plan.start_date, fixed_start_date());
    assert_eq!(plan.created_at, fixed_timestamp());
    assert!(plan.validate().is_ok());
    assert_eq!(
        plan.weeks.last().map(|week| week.phase),
        Some(TrainingPhase::Taper)
    );
    for week in &plan.weeks {
        assert!(week.high_intensity_session_count() <= 2);
        assert!(week.sessions.len() <= 6);
    }
}

#[test]
fn test_sleep_assumption_fails_without_refusal() {
    let outcome = pipeline()
        .evaluate_at(&moderate_athlete(), fixed_timestamp())
        .unwrap();
    let trace = &outcome.validation.trace;

    let sleep = trace
        .checks
        .iter()
        .find(|check| check.assumption_key == "sleep_hours")
        .unwrap();
    assert!(!sleep.passed);
    assert!(sleep.reasoning.contains("NOT satisfied"));
    assert_eq!(trace.blocking_violations().count(), 0);
    assert_eq!(trace.gate_evaluations.len(), 5);
}

#[test]
fn test_missing_optional_field_fails_assumption() {
    let mut athlete = moderate_athlete();
    athlete.current_state.volume_consistency_weeks = None;

    let validation = MethodologyValidator::new(&polarized_methodology())
        .unwrap()
        .validate_at(&athlete, fixed_timestamp())
        .unwrap();

    let consistency = validation
        .trace
        .checks
        .iter()
        .find(|check| check.assumption_key == "volume_consistency_weeks")
        .unwrap();
    assert!(!consistency.passed);
    assert!(consistency.user_value.is_none());
    assert!(consistency
        .reasoning
        .contains("missing data: volume_consistency_weeks not provided"));
    assert_eq!(validation.status, ValidationStatus::Approved);
}

#[test]
fn test_gate_on_missing_field_never_triggers() {
    let mut methodology = polarized_methodology();
    methodology
        .safety_gates
        .exclusion_criteria
        .push(ExclusionCriterion {
            condition: "volume_consistency_weeks".to_owned(),
            threshold: "< 2".to_owned(),
            severity: Severity::Blocking,
            validation_logic: "Fewer than two consistent training weeks".to_owned(),
            bridge_action: "Build two weeks of consistent volume".to_owned(),
        });
    let validator = MethodologyValidator::new(&methodology).unwrap();

    let mut athlete = moderate_athlete();
    athlete.current_state.volume_consistency_weeks = None;
    let validation = validator.validate_at(&athlete, fixed_timestamp()).unwrap();
    let gate = validation
        .trace
        .gate_evaluations
        .iter()
        .find(|gate| gate.condition == "volume_consistency_weeks")
        .unwrap();
    assert!(!gate.triggered);
    assert!(gate.user_value.is_none());
    assert!(gate.reasoning.contains("missing data"));
    assert!(gate.recommendation.is_none());
    assert_eq!(validation.status, ValidationStatus::Approved);

    athlete.current_state.volume_consistency_weeks = Some(1);
    let validation = validator.validate_at(&athlete, fixed_timestamp()).unwrap();
    assert_eq!(validation.status, ValidationStatus::Refused);
    assert_eq!(validation.trace.blocking_violations().count(), 1);
}

#[test]
fn test_refused_athlete_stops_at_validation() {
    let outcome = pipeline()
        .evaluate_at(&refused_athlete(), fixed_timestamp())
        .unwrap();

    assert!(!outcome.is_approved());
    assert_eq!(outcome.validation.status, ValidationStatus::Refused);
    assert!(outcome.fragility.is_none());
    assert!(outcome.plan.is_none());
    assert!(outcome.validation.trace.fragility_score.is_none());

    let refusal = outcome.validation.refusal.as_ref().unwrap();
    assert_eq!(
        refusal.message,
        "⛔ Cannot generate training plan - 2 blocking condition(s) detected"
    );
    assert_eq!(refusal.violations.len(), 3);
    assert_eq!(refusal.violations[0].severity, Severity::Blocking);
    assert_eq!(refusal.violations[1].severity, Severity::Blocking);
    assert_eq!(refusal.violations[2].severity, Severity::Warning);

    let injury = refusal
        .violations
        .iter()
        .find(|gate| gate.condition == "injury_status")
        .unwrap();
    let bridge = injury.rendered_bridge.as_deref().unwrap();
    assert!(bridge.contains("medical clearance"));
    assert!(bridge.contains("injury_status"));
}

#[test]
fn test_high_fragility_athlete_gets_conservative_plan() {
    let outcome = pipeline()
        .evaluate_at(&high_fragility_athlete(), fixed_timestamp())
        .unwrap();

    let fragility = outcome.fragility.as_ref().unwrap();
    assert_eq!(fragility.risk_level, RiskLevel::High);
    assert!((fragility.score - 0.638).abs() < 1e-9);
    assert_eq!(
        fragility.ranked_contributors().first().map(|(f, _)| *f),
        Some(FragilityFactor::SleepDeviation)
    );

    let plan = outcome.plan.as_ref().unwrap();
    assert_eq!(plan.duration_weeks, 8);
    for week in &plan.weeks {
        assert!(week.high_intensity_session_count() <= 1);
    }
    assert!(plan
        .plan_decisions
        .iter()
        .any(|decision| decision.decision_point == "Load:Recovery Ratio Selection"
            && decision.outcome.contains("2:1")));
}

#[test]
fn test_low_fragility_athlete_uses_three_to_one() {
    let outcome = pipeline()
        .evaluate_at(&low_fragility_athlete(), fixed_timestamp())
        .unwrap();

    let fragility = outcome.fragility.as_ref().unwrap();
    assert_eq!(fragility.risk_level, RiskLevel::Low);
    assert!((fragility.score - 0.329).abs() < 1e-9);

    let plan = outcome.plan.as_ref().unwrap();
    assert_eq!(plan.duration_weeks, 16);
    assert!(plan
        .weeks
        .iter()
        .any(|week| week.week_type == WeekType::Recovery));
    for week in plan.weeks.iter().filter(|w| w.week_type == WeekType::Recovery) {
        assert!(week.high_intensity_session_count() <= 1);
        assert!(week.notes.as_deref().unwrap_or_default().contains("RECOVERY WEEK"));
    }
}

#[test]
fn test_fragility_requires_approval() {
    let methodology = polarized_methodology();
    let validator = MethodologyValidator::new(&methodology).unwrap();
    let athlete = refused_athlete();
    let refused = validator.validate_at(&athlete, fixed_timestamp()).unwrap();

    let err = FragilityCalculator::new(&methodology)
        .calculate(&athlete, &refused)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PreconditionFailed);
}

#[test]
fn test_validation_is_reproducible_with_fixed_timestamp() {
    let methodology = polarized_methodology();
    let validator = MethodologyValidator::new(&methodology).unwrap();
    let athlete = moderate_athlete();

    let first = validator.validate_at(&athlete, fixed_timestamp()).unwrap();
    let second = validator.validate_at(&athlete, fixed_timestamp()).unwrap();
    assert_eq!(first.trace, second.trace);
}

#[test]
fn test_invalid_profile_is_schema_violation() {
    let mut athlete = moderate_athlete();
    athlete.current_state.sleep_hours = 13.0;

    let err = pipeline().evaluate(&athlete).unwrap_err();
    assert_eq!(err.code, ErrorCode::SchemaViolation);
}

#[test]
fn test_trace_is_exhaustive_even_when_refused() {
    let methodology = polarized_methodology();
    let validator = MethodologyValidator::new(&methodology).unwrap();

    for athlete in [moderate_athlete(), refused_athlete(), low_fragility_athlete()] {
        let result = validator.validate_at(&athlete, fixed_timestamp()).unwrap();
        assert_eq!(result.trace.checks.len(), methodology.assumptions.len());
        assert_eq!(
            result.trace.gate_evaluations.len(),
            methodology.safety_gates.exclusion_criteria.len()
        );
    }
}

#[test]
fn test_moderate_bucket_gets_two_hard_sessions() {
    let mut athlete = moderate_athlete();
    athlete.current_state.sleep_hours = 7.5;
    let outcome = pipeline()
        .evaluate_at(&athlete, fixed_timestamp())
        .unwrap();

    let fragility = outcome.fragility.as_ref().unwrap();
    assert!((fragility.score - 0.4505).abs() < 1e-9);
    assert_eq!(fragility.risk_level, RiskLevel::Moderate);

    let plan = outcome.plan.as_ref().unwrap();
    let first = plan.first_non_taper_week().unwrap();
    assert_eq!(first.week_type, WeekType::Load);
    assert_eq!(first.high_intensity_session_count(), 2);
}

fn assert_hard_sessions_spaced(plan: &TrainingPlan) {
    let mut hard_days: Vec<u32> = plan
        .weeks
        .iter()
        .flat_map(|week| {
            week.hard_days()
                .into_iter()
                .map(move |day| (week.week_number - 1) * 7 + u32::from(day.index()))
        })
        .collect();
    hard_days.sort_unstable();
    for pair in hard_days.windows(2) {
        assert!(
            pair[1] - pair[0] >= 2,
            "hard sessions on plan days {} and {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_four_week_plan_tapers_and_spaces_hard_sessions() {
    for methodology in [polarized_methodology(), threshold_methodology()] {
        for mut athlete in [moderate_athlete(), low_fragility_athlete()] {
            athlete.goals.weeks_to_race = Some(4);
            let outcome = Pipeline::new(&methodology)
                .unwrap()
                .with_config(IntelligenceConfig::default())
                .with_start_date(Some(fixed_start_date()))
                .evaluate_at(&athlete, fixed_timestamp())
                .unwrap();

            let plan = outcome.plan.as_ref().unwrap();
            assert_eq!(plan.weeks.len(), 4);
            assert_eq!(
                plan.weeks.last().map(|week| week.phase),
                Some(TrainingPhase::Taper)
            );
            assert_hard_sessions_spaced(plan);
        }
    }
}

#[test]
fn test_extreme_profile_is_clamped_to_critical() {
    let mut methodology = polarized_methodology();
    methodology
        .safety_gates
        .exclusion_criteria
        .retain(|gate| gate.condition != "sleep_hours");

    let mut athlete = moderate_athlete();
    athlete.current_state.sleep_hours = 4.0;
    athlete.current_state.stress_level = StressLevel::High;
    athlete.current_state.hrv_trend = HrvTrend::Decreasing;
    athlete.current_state.recent_illness = true;
    athlete.current_state.weekly_volume_hours = 2.0;
    athlete.current_state.volume_consistency_weeks = Some(0);
    athlete.goals.weeks_to_race = Some(4);

    let outcome = Pipeline::new(&methodology)
        .unwrap()
        .with_config(IntelligenceConfig::default())
        .with_start_date(Some(fixed_start_date()))
        .evaluate_at(&athlete, fixed_timestamp())
        .unwrap();

    assert_eq!(
        outcome.validation.status,
        ValidationStatus::ApprovedWithWarnings
    );
    let fragility = outcome.fragility.as_ref().unwrap();
    assert!((fragility.score - 1.0).abs() < f64::EPSILON);
    assert_eq!(fragility.risk_level, RiskLevel::Critical);

    let plan = outcome.plan.as_ref().unwrap();
    for week in &plan.weeks {
        assert_eq!(week.high_intensity_session_count(), 0);
    }
}
