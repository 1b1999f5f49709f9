// ABOUTME: Weekly session scheduler: long workout, spaced hard sessions, then easy sessions meeting sport minimums
// ABOUTME: Over-constrained weeks relax sport minimums before hard-session count; spacing is never relaxed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Weekly Scheduling
//!
//! Placement is deterministic and runs in a fixed order:
//!
//! 1. The long workout day is the preferred day, else Saturday, else the last available day
//! 2. Hard sessions go greedily on the earliest days at least `min_hard_session_gap_days`
//!    apart, counting the gap from the previous week's last hard day
//! 3. The long workout sport follows the bike/run rotation unless the other one is
//!    needed to reach the sport minimums
//! 4. Remaining days get easy sessions, meeting per-sport minimums first
//!
//! Durations are then sized so the week's low/threshold/high minutes track the
//! methodology's intensity targets.

use std::collections::BTreeMap;

use tracing::warn;
use tri_planner_core::constants::planning::{MAX_SESSION_MINUTES, MIN_SESSION_MINUTES};
use tri_planner_core::models::{
    zone_display, ConstraintRelaxation, IntensityDistributionConfig, IntensityZone,
    RelaxedConstraint, SessionType, TrainingPhase, TrainingSession, Weekday, ZoneCategory,
};

use super::workouts::SelectedWorkout;
use crate::config::PlanningTuning;

/// Sports of the long workout, indexed by `week_number % 3`
const LONG_WORKOUT_ROTATION: [SessionType; 3] = [SessionType::Bike, SessionType::Run, SessionType::Bike];

/// Sports with weekly minimums, in fill order
const SPORTS: [SessionType; 3] = [SessionType::Run, SessionType::Bike, SessionType::Swim];

/// Days preferred for a single hard session
const MIDWEEK_DAYS: [Weekday; 3] = [Weekday::Tuesday, Weekday::Wednesday, Weekday::Thursday];

/// Training days: weekday order without the rest day, truncated to the requested count
#[must_use]
pub fn available_days(training_days: u8, rest_day: Option<Weekday>) -> Vec<Weekday> {
    Weekday::ALL
        .into_iter()
        .filter(|day| Some(*day) != rest_day)
        .take(usize::from(training_days))
        .collect()
}

fn count_of(counts: &BTreeMap<SessionType, u8>, sport: SessionType) -> u8 {
    counts.get(&sport).copied().unwrap_or(0)
}

/// Calendar days from `earlier` to `later`, where `earlier` may be in the previous week
const fn gap_days(earlier: Weekday, later: Weekday, across_weeks: bool) -> u8 {
    if across_weeks {
        7 - earlier.index() + later.index()
    } else {
        later.index().saturating_sub(earlier.index())
    }
}

/// Inputs for one week
#[derive(Debug, Clone)]
pub struct WeekRequest<'a> {
    /// 1-based week number
    pub week_number: u32,
    /// Phase
    pub phase: TrainingPhase,
    /// Volume to schedule (hours)
    pub target_volume_hours: f64,
    /// Days the athlete can train, in calendar order
    pub available_days: &'a [Weekday],
    /// Preferred long-workout day
    pub long_workout_day: Option<Weekday>,
    /// Longest single session (minutes)
    pub max_session_minutes: u32,
    /// Hard sessions to place, already chosen and in order
    pub hard_workouts: Vec<SelectedWorkout>,
    /// Last hard day of the previous week
    pub previous_hard_day: Option<Weekday>,
}

/// Scheduler output for one week
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledWeek {
    /// Sessions in calendar order
    pub sessions: Vec<TrainingSession>,
    /// Constraints loosened for this week
    pub relaxations: Vec<ConstraintRelaxation>,
    /// Last hard day, carried into the next week
    pub last_hard_day: Option<Weekday>,
}

/// Session kinds before durations are assigned
#[derive(Debug, Clone)]
enum Slot {
    Long(SessionType),
    Hard(SelectedWorkout),
    Easy(SessionType),
}

/// Deterministic weekly scheduler
#[derive(Debug, Clone, Copy)]
pub struct WeekScheduler<'a> {
    tuning: &'a PlanningTuning,
    distribution: &'a IntensityDistributionConfig,
}

impl<'a> WeekScheduler<'a> {
    /// Scheduler with the given tuning and intensity targets
    #[must_use]
    pub const fn new(tuning: &'a PlanningTuning, distribution: &'a IntensityDistributionConfig) -> Self {
        Self {
            tuning,
            distribution,
        }
    }

    /// Schedule one week
    #[must_use]
    pub fn schedule(&self, request: WeekRequest<'_>) -> ScheduledWeek {
        let mut relaxations = Vec::new();
        let mut slots: BTreeMap<Weekday, Slot> = BTreeMap::new();
        let mut free: Vec<Weekday> = request.available_days.to_vec();

        let long_day = Self::long_workout_day(&request, &mut relaxations);
        if let Some(day) = long_day {
            free.retain(|d| *d != day);
        }

        let requested = request.hard_workouts.len();
        let hard_days = self.hard_days(&free, requested, request.previous_hard_day);
        if hard_days.len() < requested {
            let detail = format!(
                "Placed {} of {requested} hard session(s): only {} free day(s) keep {}+ days between hard sessions",
                hard_days.len(),
                free.len(),
                self.tuning.min_hard_session_gap_days
            );
            warn!(week = request.week_number, "{detail}");
            relaxations.push(ConstraintRelaxation {
                constraint: RelaxedConstraint::HighIntensityCount,
                detail,
            });
        }
        for (day, workout) in hard_days.iter().zip(request.hard_workouts.iter().cloned()) {
            slots.insert(*day, Slot::Hard(workout));
            free.retain(|d| d != day);
        }

        if let Some(day) = long_day {
            let sport = self.long_workout_sport(&slots, free.len(), request.week_number);
            slots.insert(day, Slot::Long(sport));
        }

        self.fill_easy_days(&free, &mut slots, request.week_number, &mut relaxations);

        let sessions = self.size_sessions(&slots, &request, &mut relaxations);
        ScheduledWeek {
            sessions,
            relaxations,
            last_hard_day: hard_days.last().copied(),
        }
    }

    fn long_workout_day(
        request: &WeekRequest<'_>,
        relaxations: &mut Vec<ConstraintRelaxation>,
    ) -> Option<Weekday> {
        let days = request.available_days;
        if let Some(preferred) = request.long_workout_day {
            if days.contains(&preferred) {
                return Some(preferred);
            }
            let fallback = days
                .iter()
                .copied()
                .find(|d| *d == Weekday::Saturday)
                .or_else(|| days.last().copied())?;
            relaxations.push(ConstraintRelaxation {
                constraint: RelaxedConstraint::LongWorkoutDay,
                detail: format!(
                    "Preferred long-workout day {preferred} is not a training day; using {fallback}"
                ),
            });
            return Some(fallback);
        }
        days.iter()
            .copied()
            .find(|d| *d == Weekday::Saturday)
            .or_else(|| days.last().copied())
    }

    fn spaced_from(&self, day: Weekday, placed: &[Weekday], previous: Option<Weekday>) -> bool {
        let gap = self.tuning.min_hard_session_gap_days;
        let from_previous = previous.is_none_or(|prev| gap_days(prev, day, true) >= gap);
        let from_placed = placed.iter().all(|other| {
            let (first, second) = if other.index() <= day.index() {
                (*other, day)
            } else {
                (day, *other)
            };
            gap_days(first, second, false) >= gap
        });
        from_previous && from_placed
    }

    fn hard_days(&self, free: &[Weekday], count: usize, previous: Option<Weekday>) -> Vec<Weekday> {
        if count == 0 {
            return Vec::new();
        }
        if count == 1 {
            let midweek = MIDWEEK_DAYS
                .into_iter()
                .find(|d| free.contains(d) && self.spaced_from(*d, &[], previous));
            let earliest = || {
                free.iter()
                    .copied()
                    .find(|d| self.spaced_from(*d, &[], previous))
            };
            return midweek.or_else(earliest).into_iter().collect();
        }

        let mut placed: Vec<Weekday> = Vec::with_capacity(count);
        for day in free {
            if placed.len() == count {
                break;
            }
            if self.spaced_from(*day, &placed, previous) {
                placed.push(*day);
            }
        }
        placed
    }

    fn minimum_for(&self, sport: SessionType) -> u8 {
        match sport {
            SessionType::Run => self.tuning.min_run_sessions,
            SessionType::Bike => self.tuning.min_bike_sessions,
            SessionType::Swim => self.tuning.min_swim_sessions,
            SessionType::Brick | SessionType::Strength | SessionType::Rest => 0,
        }
    }

    fn sport_counts(slots: &BTreeMap<Weekday, Slot>) -> BTreeMap<SessionType, u8> {
        let mut counts: BTreeMap<SessionType, u8> = SPORTS.iter().map(|s| (*s, 0)).collect();
        for slot in slots.values() {
            let sport = match slot {
                Slot::Long(sport) | Slot::Easy(sport) => *sport,
                Slot::Hard(workout) => workout.sport,
            };
            if let Some(count) = counts.get_mut(&sport) {
                *count += 1;
            }
        }
        counts
    }

    /// Rotation sport, unless the easy days left cannot cover the sport
    /// minimums and only the other long-workout sport is still short
    fn long_workout_sport(
        &self,
        slots: &BTreeMap<Weekday, Slot>,
        easy_days: usize,
        week_number: u32,
    ) -> SessionType {
        let rotation = LONG_WORKOUT_ROTATION[week_number as usize % LONG_WORKOUT_ROTATION.len()];
        let counts = Self::sport_counts(slots);
        let shortfall = |sport: SessionType| {
            usize::from(self.minimum_for(sport).saturating_sub(count_of(&counts, sport)))
        };
        let total: usize = SPORTS.into_iter().map(shortfall).sum();
        if total <= easy_days || shortfall(rotation) > 0 {
            return rotation;
        }
        let alternate = if rotation == SessionType::Bike {
            SessionType::Run
        } else {
            SessionType::Bike
        };
        if shortfall(alternate) > 0 {
            alternate
        } else {
            rotation
        }
    }

    fn fill_easy_days(
        &self,
        free: &[Weekday],
        slots: &mut BTreeMap<Weekday, Slot>,
        week_number: u32,
        relaxations: &mut Vec<ConstraintRelaxation>,
    ) {
        let mut counts = Self::sport_counts(slots);
        for day in free {
            let below_minimum = SPORTS
                .into_iter()
                .find(|sport| count_of(&counts, *sport) < self.minimum_for(*sport));
            let sport = below_minimum.unwrap_or_else(|| {
                SPORTS
                    .into_iter()
                    .min_by_key(|sport| count_of(&counts, *sport))
                    .unwrap_or(SessionType::Run)
            });
            if let Some(count) = counts.get_mut(&sport) {
                *count += 1;
            }
            slots.insert(*day, Slot::Easy(sport));
        }

        let unmet: Vec<String> = SPORTS
            .into_iter()
            .filter(|sport| count_of(&counts, *sport) < self.minimum_for(*sport))
            .map(|sport| {
                format!(
                    "{sport} {}/{}",
                    count_of(&counts, sport),
                    self.minimum_for(sport)
                )
            })
            .collect();
        if !unmet.is_empty() {
            let detail = format!(
                "Not enough training days for weekly sport minimums ({})",
                unmet.join(", ")
            );
            warn!(week = week_number, "{detail}");
            relaxations.push(ConstraintRelaxation {
                constraint: RelaxedConstraint::SportFrequencyMinimum,
                detail,
            });
        }
    }

    fn clamp_minutes(minutes: f64, cap: u32) -> u32 {
        (minutes.round().max(0.0) as u32).clamp(MIN_SESSION_MINUTES, cap)
    }

    // Long function: Sizes low-intensity sessions first, then derives hard minutes per category
    #[allow(clippy::too_many_lines)]
    fn size_sessions(
        &self,
        slots: &BTreeMap<Weekday, Slot>,
        request: &WeekRequest<'_>,
        relaxations: &mut Vec<ConstraintRelaxation>,
    ) -> Vec<TrainingSession> {
        let cap = request
            .max_session_minutes
            .clamp(MIN_SESSION_MINUTES, MAX_SESSION_MINUTES);
        let week_minutes = request.target_volume_hours * 60.0;

        let hard_count = slots.values().filter(|s| matches!(s, Slot::Hard(_))).count();
        let easy_count = slots.values().filter(|s| matches!(s, Slot::Easy(_))).count();
        let has_long = slots.values().any(|s| matches!(s, Slot::Long(_)));

        let low_share = self.distribution.low_intensity_target;
        let low_budget = if hard_count > 0 {
            week_minutes * low_share
        } else {
            week_minutes
        };
        let long_minutes = Self::clamp_minutes(week_minutes * self.tuning.long_workout_fraction, cap);
        let easy_budget = if has_long {
            low_budget - f64::from(long_minutes)
        } else {
            low_budget
        };
        let easy_minutes = if easy_count > 0 {
            Self::clamp_minutes(easy_budget / easy_count as f64, cap)
        } else {
            0
        };

        let low_actual = if has_long { f64::from(long_minutes) } else { 0.0 }
            + f64::from(easy_minutes) * easy_count as f64;
        let hard_total = if low_share > 0.0 {
            low_actual * (1.0 - low_share) / low_share
        } else {
            week_minutes
        };

        let threshold_count = slots
            .values()
            .filter(|s| matches!(s, Slot::Hard(w) if w.category() == ZoneCategory::Threshold))
            .count();
        let high_count = hard_count - threshold_count;
        let hard_targets = self.distribution.threshold_intensity_target
            + self.distribution.high_intensity_target;
        let (mut threshold_minutes, mut high_minutes) = if hard_targets > 0.0 {
            (
                hard_total * self.distribution.threshold_intensity_target / hard_targets,
                hard_total * self.distribution.high_intensity_target / hard_targets,
            )
        } else {
            (0.0, hard_total)
        };
        if threshold_count == 0 {
            high_minutes += threshold_minutes;
            threshold_minutes = 0.0;
        }
        if high_count == 0 {
            threshold_minutes += high_minutes;
            high_minutes = 0.0;
        }
        let threshold_each = if threshold_count > 0 {
            Self::clamp_minutes(threshold_minutes / threshold_count as f64, cap)
        } else {
            0
        };
        let high_each = if high_count > 0 {
            Self::clamp_minutes(high_minutes / high_count as f64, cap)
        } else {
            0
        };

        let sessions: Vec<TrainingSession> = slots
            .iter()
            .map(|(day, slot)| match slot {
                Slot::Long(sport) => {
                    let zone = IntensityZone::Endurance;
                    TrainingSession {
                        day: *day,
                        session_type: *sport,
                        primary_zone: zone,
                        duration_minutes: long_minutes,
                        description: format!(
                            "Long aerobic {sport} - {}hr {}min @ {}",
                            long_minutes / 60,
                            long_minutes % 60,
                            zone_display(*sport, zone)
                        ),
                        workout_details: None,
                    }
                }
                Slot::Hard(workout) => {
                    let (label, minutes) = if workout.category() == ZoneCategory::Threshold {
                        ("Threshold", threshold_each)
                    } else {
                        ("High-intensity", high_each)
                    };
                    TrainingSession {
                        day: *day,
                        session_type: workout.sport,
                        primary_zone: workout.zone,
                        duration_minutes: minutes,
                        description: format!(
                            "{label} {} - {}",
                            workout.sport,
                            zone_display(workout.sport, workout.zone)
                        ),
                        workout_details: Some(workout.details.clone()),
                    }
                }
                Slot::Easy(sport) => {
                    let zone = IntensityZone::Endurance;
                    TrainingSession {
                        day: *day,
                        session_type: *sport,
                        primary_zone: zone,
                        duration_minutes: easy_minutes,
                        description: format!(
                            "Easy aerobic {sport} - {easy_minutes}min @ {}",
                            zone_display(*sport, zone)
                        ),
                        workout_details: None,
                    }
                }
            })
            .collect();

        if hard_count > 0 {
            self.check_distribution(&sessions, request.week_number, relaxations);
        }
        sessions
    }

    fn check_distribution(
        &self,
        sessions: &[TrainingSession],
        week_number: u32,
        relaxations: &mut Vec<ConstraintRelaxation>,
    ) {
        let total: u32 = sessions.iter().map(|s| s.duration_minutes).sum();
        if total == 0 {
            return;
        }
        let low: u32 = sessions
            .iter()
            .filter(|s| s.primary_zone.is_low_intensity())
            .map(|s| s.duration_minutes)
            .sum();
        let low_percent = f64::from(low) / f64::from(total) * 100.0;
        let target_percent = self.distribution.low_intensity_target * 100.0;
        if (low_percent - target_percent).abs() > self.distribution.tolerance_percent {
            let detail = format!(
                "Low-intensity share {low_percent:.0}% is outside {target_percent:.0}% ± {:.0}% after session duration limits",
                self.distribution.tolerance_percent
            );
            warn!(week = week_number, "{detail}");
            relaxations.push(ConstraintRelaxation {
                constraint: RelaxedConstraint::IntensityDistribution,
                detail,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polarized() -> IntensityDistributionConfig {
        IntensityDistributionConfig {
            low_intensity_target: 0.8,
            threshold_intensity_target: 0.0,
            high_intensity_target: 0.2,
            tolerance_percent: 5.0,
        }
    }

    fn vo2(sport: SessionType) -> SelectedWorkout {
        SelectedWorkout {
            sport,
            zone: IntensityZone::Vo2max,
            details: "5x4min".to_owned(),
        }
    }

    fn request(days: &[Weekday], hard: usize, previous: Option<Weekday>) -> WeekRequest<'_> {
        WeekRequest {
            week_number: 1,
            phase: TrainingPhase::Base,
            target_volume_hours: 10.0,
            available_days: days,
            long_workout_day: None,
            max_session_minutes: 180,
            hard_workouts: (0..hard).map(|_| vo2(SessionType::Run)).collect(),
            previous_hard_day: previous,
        }
    }

    #[test]
    fn test_available_days_skip_rest_day() {
        assert_eq!(
            available_days(3, Some(Weekday::Monday)),
            vec![Weekday::Tuesday, Weekday::Wednesday, Weekday::Thursday]
        );
        assert_eq!(available_days(7, Some(Weekday::Sunday)).len(), 6);
    }

    #[test]
    fn test_hard_sessions_are_spaced() {
        let tuning = PlanningTuning::default();
        let targets = polarized();
        let scheduler = WeekScheduler::new(&tuning, &targets);
        let days = available_days(6, None);
        let week = scheduler.schedule(request(&days, 3, None));
        let hard: Vec<Weekday> = week
            .sessions
            .iter()
            .filter(|s| s.primary_zone.is_hard())
            .map(|s| s.day)
            .collect();
        assert_eq!(hard, vec![Weekday::Monday, Weekday::Wednesday, Weekday::Friday]);
        assert_eq!(week.last_hard_day, Some(Weekday::Friday));
        assert!(!week
            .relaxations
            .iter()
            .any(|r| r.constraint == RelaxedConstraint::HighIntensityCount));
    }

    #[test]
    fn test_previous_week_gap_is_respected() {
        let tuning = PlanningTuning::default();
        let targets = polarized();
        let scheduler = WeekScheduler::new(&tuning, &targets);
        let days = available_days(7, None);
        let week = scheduler.schedule(request(&days, 2, Some(Weekday::Sunday)));
        let first_hard = week
            .sessions
            .iter()
            .find(|s| s.primary_zone.is_hard())
            .map(|s| s.day);
        assert_eq!(first_hard, Some(Weekday::Tuesday));
    }

    #[test]
    fn test_single_hard_session_prefers_midweek() {
        let tuning = PlanningTuning::default();
        let targets = polarized();
        let scheduler = WeekScheduler::new(&tuning, &targets);
        let days = available_days(6, None);
        let week = scheduler.schedule(request(&days, 1, None));
        assert_eq!(week.last_hard_day, Some(Weekday::Tuesday));
    }

    #[test]
    fn test_few_days_relax_minimums_before_hard_count() {
        let tuning = PlanningTuning::default();
        let targets = polarized();
        let scheduler = WeekScheduler::new(&tuning, &targets);
        let days = [Weekday::Monday, Weekday::Wednesday, Weekday::Friday, Weekday::Saturday];
        let week = scheduler.schedule(request(&days, 2, None));
        let kinds: Vec<RelaxedConstraint> = week.relaxations.iter().map(|r| r.constraint).collect();
        assert!(kinds.contains(&RelaxedConstraint::SportFrequencyMinimum));
        assert!(!kinds.contains(&RelaxedConstraint::HighIntensityCount));
        assert_eq!(week.sessions.iter().filter(|s| s.primary_zone.is_hard()).count(), 2);
    }

    #[test]
    fn test_two_days_reduce_hard_count() {
        let tuning = PlanningTuning::default();
        let targets = polarized();
        let scheduler = WeekScheduler::new(&tuning, &targets);
        let days = [Weekday::Monday, Weekday::Tuesday, Weekday::Saturday];
        let week = scheduler.schedule(request(&days, 2, None));
        assert!(week
            .relaxations
            .iter()
            .any(|r| r.constraint == RelaxedConstraint::HighIntensityCount));
        assert_eq!(week.sessions.iter().filter(|s| s.primary_zone.is_hard()).count(), 1);
    }

    #[test]
    fn test_long_workout_sport_covers_unmet_minimum() {
        let tuning = PlanningTuning::default();
        let targets = polarized();
        let scheduler = WeekScheduler::new(&tuning, &targets);
        let days = available_days(6, Some(Weekday::Monday));
        let mut taper_week = request(&days, 0, None);
        taper_week.week_number = 15;
        taper_week.phase = TrainingPhase::Taper;
        taper_week.long_workout_day = Some(Weekday::Sunday);
        taper_week.hard_workouts = (0..3).map(|_| vo2(SessionType::Bike)).collect();

        let week = scheduler.schedule(taper_week);
        let long = week
            .sessions
            .iter()
            .find(|s| s.day == Weekday::Sunday)
            .map(|s| s.session_type);
        assert_eq!(long, Some(SessionType::Run));

        let count = |sport| week.sessions.iter().filter(|s| s.session_type == sport).count();
        assert_eq!(count(SessionType::Run), 2);
        assert_eq!(count(SessionType::Bike), 3);
        assert_eq!(count(SessionType::Swim), 1);
        assert!(!week
            .relaxations
            .iter()
            .any(|r| r.constraint == RelaxedConstraint::SportFrequencyMinimum));
    }

    #[test]
    fn test_long_workout_keeps_rotation_when_days_suffice() {
        let tuning = PlanningTuning::default();
        let targets = polarized();
        let scheduler = WeekScheduler::new(&tuning, &targets);
        let days = available_days(7, None);
        let mut base_week = request(&days, 0, None);
        base_week.week_number = 3;
        base_week.hard_workouts = (0..2).map(|_| vo2(SessionType::Bike)).collect();

        let week = scheduler.schedule(base_week);
        let long = week
            .sessions
            .iter()
            .find(|s| s.day == Weekday::Saturday)
            .map(|s| s.session_type);
        assert_eq!(long, Some(SessionType::Bike));
    }

    #[test]
    fn test_durations_track_distribution() {
        let tuning = PlanningTuning::default();
        let targets = polarized();
        let scheduler = WeekScheduler::new(&tuning, &targets);
        let days = available_days(6, None);
        let week = scheduler.schedule(request(&days, 2, None));
        let total: u32 = week.sessions.iter().map(|s| s.duration_minutes).sum();
        let low: u32 = week
            .sessions
            .iter()
            .filter(|s| s.primary_zone.is_low_intensity())
            .map(|s| s.duration_minutes)
            .sum();
        let low_percent = f64::from(low) / f64::from(total) * 100.0;
        assert!((low_percent - 80.0).abs() <= 5.0);
        assert!(week.sessions.iter().all(|s| s.duration_minutes <= 180));
    }
}
