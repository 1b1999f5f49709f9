// ABOUTME: Training plan generator: periodized weeks with fragility-capped hard sessions
// ABOUTME: Chains phase allocation, mesocycles, template selection and weekly scheduling into a TrainingPlan
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Generation
//!
//! The fragility bucket, not raw fitness, caps weekly hard sessions:
//! Low 3, Moderate 2, High 1, Critical 0. Recovery weeks are further limited
//! by the methodology's recovery-week cap.
//!
//! ## Module Structure
//!
//! - `phases` - Base/build/peak/taper allocation
//! - `periodization` - Load:recovery ratio, mesocycles, volume multipliers, notes
//! - `workouts` - Hard-session template rotation and interval progression
//! - `scheduler` - Day placement and session sizing for one week

pub mod periodization;
pub mod phases;
pub mod scheduler;
pub mod workouts;

pub use phases::{PhaseAllocation, PlanLength};
pub use scheduler::{available_days, ScheduledWeek, WeekRequest, WeekScheduler};
pub use workouts::{apply_progression, SelectedWorkout, SportStreak, WeekSelection, WorkoutSelector};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use tri_planner_core::errors::{AppError, AppResult};
use tri_planner_core::models::{
    FragilityResult, MethodologyConfig, PlanDecision, RiskLevel, TrainingPlan, TrainingWeek,
    UserProfile, ValidationResult, WeekType,
};
use uuid::Uuid;

use crate::config::{IntelligenceConfig, PlanningTuning};
use periodization::WeekSlot;

/// Generates periodized plans for approved profiles
#[derive(Debug, Clone)]
pub struct TrainingPlanGenerator<'a> {
    methodology: &'a MethodologyConfig,
    tuning: &'a PlanningTuning,
    start_date: Option<NaiveDate>,
    created_at: Option<DateTime<Utc>>,
}

impl<'a> TrainingPlanGenerator<'a> {
    /// Generator using the global planning tuning
    #[must_use]
    pub fn new(methodology: &'a MethodologyConfig) -> Self {
        Self::with_config(methodology, &IntelligenceConfig::global().planning)
    }

    /// Generator with explicit tuning
    #[must_use]
    pub const fn with_config(methodology: &'a MethodologyConfig, tuning: &'a PlanningTuning) -> Self {
        Self {
            methodology,
            tuning,
            start_date: None,
            created_at: None,
        }
    }

    /// Fix the plan start date instead of using today
    #[must_use]
    pub const fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Fix the creation timestamp instead of using the clock
    #[must_use]
    pub const fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    fn check_preconditions(
        &self,
        profile: &UserProfile,
        validation: &ValidationResult,
        fragility: &FragilityResult,
    ) -> AppResult<()> {
        let methodology_id = &self.methodology.id;
        if !validation.approved {
            return Err(AppError::precondition_failed(
                "cannot generate a plan for a refused profile; validation must approve first",
            )
            .with_athlete_id(&profile.athlete_id)
            .with_methodology_id(methodology_id));
        }
        if !validation.belongs_to(&profile.athlete_id, methodology_id) {
            return Err(AppError::precondition_failed(format!(
                "validation result is for athlete '{}' under '{}', not '{}' under '{methodology_id}'",
                validation.trace.athlete_id, validation.trace.methodology_id, profile.athlete_id
            ))
            .with_athlete_id(&profile.athlete_id));
        }
        if fragility.athlete_id != profile.athlete_id || &fragility.methodology_id != methodology_id
        {
            return Err(AppError::precondition_failed(format!(
                "fragility result is for athlete '{}' under '{}', not '{}' under '{methodology_id}'",
                fragility.athlete_id, fragility.methodology_id, profile.athlete_id
            ))
            .with_athlete_id(&profile.athlete_id));
        }
        Ok(())
    }

    /// Build the plan
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` when the validation was refused or either
    /// input belongs to a different athlete or methodology, and `Internal` if
    /// the finished plan fails its structural checks
    pub fn generate(
        &self,
        profile: &UserProfile,
        validation: &ValidationResult,
        fragility: &FragilityResult,
    ) -> AppResult<TrainingPlan> {
        self.check_preconditions(profile, validation, fragility)?;

        let methodology = self.methodology;
        let periodization = &methodology.periodization_config;
        let state = &profile.current_state;
        let weeks_to_race = profile.goals.weeks_to_race;
        let total_weeks = weeks_to_race.unwrap_or(self.tuning.default_plan_weeks);

        let allocation = phases::allocate(
            total_weeks,
            weeks_to_race.is_some(),
            state.volume_consistency_weeks,
            &methodology.phase_distribution_config,
        );
        let mut decisions = vec![phases::phase_decision(
            &allocation,
            weeks_to_race,
            state.volume_consistency_weeks,
            &methodology.phase_distribution_config,
        )];

        let hi_cap = self.tuning.hi_sessions_for(fragility.risk_level);
        decisions.push(hi_frequency_decision(fragility, hi_cap, weeks_to_race));

        let years_training = profile.years_training().unwrap_or(0.0);
        let (ratio, ratio_decision) =
            periodization::select_ratio(fragility.score, years_training, periodization);
        decisions.push(ratio_decision);

        let (slots, structure_decision) =
            periodization::build_structure(&allocation, ratio, periodization);
        decisions.push(structure_decision);

        let weeks = self.schedule_weeks(profile, fragility, &allocation, &slots, hi_cap);

        if let Some(decision) = relaxation_decision(profile, &weeks, hi_cap) {
            decisions.push(decision);
        }

        let plan = TrainingPlan {
            plan_id: Uuid::new_v4(),
            athlete_id: profile.athlete_id.clone(),
            methodology_id: methodology.id.clone(),
            start_date: self
                .start_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            duration_weeks: total_weeks,
            race_date: profile.goals.race_date,
            race_distance: profile.goals.race_distance,
            fragility_score: fragility.score,
            weeks,
            plan_decisions: decisions,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        };
        plan.validate().map_err(|e| {
            AppError::internal(format!("generated plan failed structural checks: {e}"))
                .with_athlete_id(&profile.athlete_id)
        })?;

        info!(
            athlete_id = %plan.athlete_id,
            methodology_id = %plan.methodology_id,
            weeks = plan.duration_weeks,
            hi_sessions_per_week = hi_cap,
            fragility_score = plan.fragility_score,
            "Training plan generated"
        );
        Ok(plan)
    }

    fn schedule_weeks(
        &self,
        profile: &UserProfile,
        fragility: &FragilityResult,
        allocation: &PhaseAllocation,
        slots: &[WeekSlot],
        hi_cap: u8,
    ) -> Vec<TrainingWeek> {
        let methodology = self.methodology;
        let periodization = &methodology.periodization_config;
        let days = available_days(
            profile.constraints.available_training_days,
            profile.preferences.rest_day,
        );
        let max_session_minutes =
            (profile.constraints.max_session_duration_hours * 60.0).round() as u32;
        let planning_volume = profile
            .current_state
            .weekly_volume_hours
            .max(self.tuning.min_planning_volume_hours);

        let selector = WorkoutSelector::new(
            &methodology.session_type_config,
            &methodology.intensity_distribution_config,
        );
        let scheduler = WeekScheduler::new(self.tuning, &methodology.intensity_distribution_config);

        let mut streak = SportStreak::default();
        let mut previous_hard_day = None;
        let mut weeks = Vec::with_capacity(slots.len());

        for slot in slots {
            let volume_multiplier = periodization::week_volume_multiplier(
                slot,
                allocation,
                fragility.score,
                periodization,
                self.tuning,
            );
            let hard_sessions = if slot.week_type == WeekType::Recovery {
                hi_cap.min(periodization.recovery_week_config.max_hi_sessions)
            } else {
                hi_cap
            };
            let selection = selector.select_week(
                slot.phase,
                slot.week_number,
                usize::from(hard_sessions),
                &mut streak,
            );
            let target_volume_hours = planning_volume * volume_multiplier;

            let mut scheduled = scheduler.schedule(WeekRequest {
                week_number: slot.week_number,
                phase: slot.phase,
                target_volume_hours,
                available_days: &days,
                long_workout_day: profile.preferences.long_workout_day,
                max_session_minutes,
                hard_workouts: selection.workouts.clone(),
                previous_hard_day,
            });
            previous_hard_day = scheduled.last_hard_day;

            let placed = scheduled
                .sessions
                .iter()
                .filter(|s| s.primary_zone.is_hard())
                .count();
            if let Some(relaxation) = selection.streak_relaxation(
                placed,
                methodology.session_type_config.max_consecutive_same_type,
            ) {
                warn!(week = slot.week_number, "{}", relaxation.detail);
                scheduled.relaxations.push(relaxation);
            }

            debug!(
                week = slot.week_number,
                phase = %slot.phase,
                sessions = scheduled.sessions.len(),
                volume_multiplier,
                "Week scheduled"
            );

            weeks.push(TrainingWeek {
                week_number: slot.week_number,
                phase: slot.phase,
                week_type: slot.week_type,
                mesocycle_number: slot.mesocycle_number,
                mesocycle_week: slot.mesocycle_week,
                volume_multiplier,
                target_volume_hours,
                sessions: scheduled.sessions,
                notes: periodization::week_notes(slot, volume_multiplier, periodization),
                relaxations: scheduled.relaxations,
            });
        }
        weeks
    }
}

fn hi_frequency_decision(
    fragility: &FragilityResult,
    hi_cap: u8,
    weeks_to_race: Option<u32>,
) -> PlanDecision {
    let score = fragility.score;
    let bucket = fragility.risk_level.as_str();
    let reasoning = match fragility.risk_level {
        RiskLevel::Low => format!(
            "F-Score of {score:.2} indicates {bucket} fragility. Can safely program standard {hi_cap} HI sessions per week."
        ),
        RiskLevel::Critical => format!(
            "F-Score of {score:.2} indicates {bucket} fragility. No high-intensity sessions are programmed; every session stays aerobic until recovery markers improve."
        ),
        RiskLevel::Moderate | RiskLevel::High => format!(
            "F-Score of {score:.2} indicates {bucket} fragility. Reducing HI frequency to {hi_cap}/week to preserve recovery capacity and minimize injury risk."
        ),
    };
    PlanDecision {
        decision_point: "High-Intensity Session Frequency".to_owned(),
        input_factors: vec![
            format!("fragility_score={score:.2}"),
            format!(
                "weeks_to_race={}",
                weeks_to_race.map_or_else(|| "unknown".to_owned(), |w| w.to_string())
            ),
        ],
        reasoning,
        outcome: format!("{hi_cap} high-intensity sessions per week"),
    }
}

fn relaxation_decision(
    profile: &UserProfile,
    weeks: &[TrainingWeek],
    hi_cap: u8,
) -> Option<PlanDecision> {
    let affected: Vec<&TrainingWeek> = weeks.iter().filter(|w| !w.relaxations.is_empty()).collect();
    if affected.is_empty() {
        return None;
    }
    let total: usize = affected.iter().map(|w| w.relaxations.len()).sum();
    let mut kinds: Vec<&'static str> = affected
        .iter()
        .flat_map(|w| w.relaxations.iter().map(|r| r.constraint.as_str()))
        .collect();
    kinds.sort_unstable();
    kinds.dedup();
    let week_numbers: Vec<String> = affected.iter().map(|w| w.week_number.to_string()).collect();

    Some(PlanDecision {
        decision_point: "Scheduling Constraint Relaxation".to_owned(),
        input_factors: vec![
            format!(
                "available_training_days={}",
                profile.constraints.available_training_days
            ),
            format!(
                "rest_day={}",
                profile
                    .preferences
                    .rest_day
                    .map_or_else(|| "none".to_owned(), |d| d.to_string())
            ),
            format!("hi_sessions_per_week={hi_cap}"),
        ],
        reasoning: "Not every weekly constraint could be met with the available days and \
                    templates. Sport minimums are relaxed first, then the hard-session count; \
                    spacing between hard sessions is always kept."
            .to_owned(),
        outcome: format!(
            "{total} relaxation(s) in week(s) {}: {}",
            week_numbers.join(", "),
            kinds.join(", ")
        ),
    })
}
