// ABOUTME: Output formatting helpers for tri-planner-cli
// ABOUTME: Prints fragility breakdowns, plan overviews and what-if scenario summaries to stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tri_planner_core::models::{
    zone_display, FragilityResult, TrainingPlan, TrainingWeek, WeekType,
};
use tri_planner_intelligence::recovery_guidance::recovery_guidance;
use tri_planner_intelligence::ScenarioResult;

const RULE_WIDTH: usize = 70;

/// Display fragility score, per-factor contributions and recovery guidance
pub fn display_fragility(result: &FragilityResult) {
    println!("\nFRAGILITY ASSESSMENT");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!(
        "   Score: {:.2} ({})  base {:.2} from methodology",
        result.score, result.interpretation, result.base_fragility
    );
    println!("   Contributions:");
    for (factor, contribution) in result.ranked_contributors() {
        println!("     {:<22} {contribution:+.4}", factor.as_str());
    }

    if !result.recommendations.is_empty() {
        println!("\n   Recommendations:");
        for (number, text) in (1..).zip(&result.recommendations) {
            println!("     {number}. {text}");
        }
    }

    println!("\n   Recovery guidance ({}):", result.risk_level);
    for line in recovery_guidance(result.risk_level) {
        println!("     • {line}");
    }
}

fn display_week(week: &TrainingWeek) {
    let recovery = if week.week_type == WeekType::Recovery {
        " recovery"
    } else {
        ""
    };
    println!(
        "\nWeek {:>2} [{}{recovery}]  target {:.1} h, scheduled {:.1} h",
        week.week_number,
        week.phase,
        week.target_volume_hours,
        week.total_volume_hours()
    );
    if let Some(notes) = &week.notes {
        println!("   {notes}");
    }
    for session in &week.sessions {
        println!(
            "   {}  {:<5} {:>4} min  {}",
            session.day,
            session.session_type.as_str(),
            session.duration_minutes,
            zone_display(session.session_type, session.primary_zone)
        );
        if let Some(details) = &session.workout_details {
            println!("                     {details}");
        }
    }
    for relaxation in &week.relaxations {
        println!("   ! {}", relaxation.detail);
    }
}

/// Display the plan header, phase layout and every week
pub fn display_plan(plan: &TrainingPlan) {
    println!("\nTRAINING PLAN");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("   Athlete: {}", plan.athlete_id);
    println!("   Methodology: {}", plan.methodology_id);
    println!(
        "   Weeks: {} starting {}",
        plan.duration_weeks, plan.start_date
    );
    if let Some(race_date) = plan.race_date {
        println!("   Race date: {race_date}");
    }
    let phases: Vec<String> = plan
        .phase_breakdown()
        .iter()
        .map(|(phase, weeks)| format!("{phase} {weeks}"))
        .collect();
    println!("   Phases: {}", phases.join(", "));
    let distribution = plan.intensity_distribution();
    println!(
        "   Intensity: {:.0}% low / {:.0}% threshold / {:.0}% high",
        distribution.low_intensity_percent,
        distribution.threshold_percent,
        distribution.high_intensity_percent
    );
    println!(
        "   Average: {:.1} h/week, {:.1} hard sessions/week",
        plan.average_weekly_volume(),
        plan.average_hi_sessions_per_week()
    );

    plan.weeks.iter().for_each(display_week);
}

/// Display one what-if scenario
pub fn display_scenario(result: &ScenarioResult) {
    let from = result
        .original_value
        .as_ref()
        .map_or_else(|| "unset".to_owned(), ToString::to_string);
    let to = result
        .new_value
        .as_ref()
        .map_or_else(|| "unset".to_owned(), ToString::to_string);
    println!("\n{}: {from} -> {to}", result.modified_field);

    if result.validation_changed {
        println!(
            "   Validation: {} -> {}",
            result.original_status, result.new_status
        );
    } else {
        println!("   Validation: {} (unchanged)", result.new_status);
    }
    for violation in &result.new_violations {
        println!("   ⛔ {violation}");
    }

    match (result.original_fragility, result.new_fragility) {
        (Some(before), Some(after)) => println!(
            "   Fragility: {before:.3} -> {after:.3} ({:+.3})",
            after - before
        ),
        (None, Some(after)) => println!("   Fragility: n/a -> {after:.3}"),
        (Some(before), None) => println!("   Fragility: {before:.3} -> n/a"),
        (None, None) => {}
    }
    if let Some(level) = result.new_risk_level {
        println!("   Risk level: {level}");
    }

    if let Some(adjustments) = &result.plan_adjustments {
        if let Some(delta) = adjustments.hi_sessions_per_week_delta {
            println!("   Hard sessions/week: {delta:+.2}");
        }
        if let Some(delta) = adjustments.volume_delta_hours {
            println!("   Weekly volume: {delta:+.1} h");
        }
        if adjustments.phase_distribution_changed {
            println!("   Phase distribution changed");
        }
        let shift = adjustments.intensity_distribution_delta;
        println!(
            "   Intensity shift: {:+.1} low / {:+.1} threshold / {:+.1} high (points)",
            shift.low_intensity_percent, shift.threshold_percent, shift.high_intensity_percent
        );
    }
}
