// ABOUTME: Hard-session template selection with rotation strategies and interval progression
// ABOUTME: Splits sessions between threshold and high-intensity templates in proportion to methodology targets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tri_planner_core::models::{
    ConstraintRelaxation, HiWorkoutTemplate, IntensityDistributionConfig, IntensityZone,
    RelaxedConstraint, RotationStrategy, SessionType, SessionTypeConfig, TrainingPhase,
    ZoneCategory,
};

/// Interval prescriptions such as `6x800m`, `4x10min` or `8x30sec`
static INTERVAL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+)x(\d+)(m|min|sec)").ok());

/// Stride used by the `random` rotation strategy
const RANDOM_STRIDE: usize = 3;

/// Offset applied per week by the `random` rotation strategy
const RANDOM_WEEK_OFFSET: usize = 7;

/// A resolved hard-session prescription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedWorkout {
    /// Sport
    pub sport: SessionType,
    /// Zone
    pub zone: IntensityZone,
    /// Interval prescription with progression applied
    pub details: String,
}

impl SelectedWorkout {
    /// Threshold or high intensity
    #[must_use]
    pub fn category(&self) -> ZoneCategory {
        self.zone.category().unwrap_or(ZoneCategory::High)
    }
}

/// Hard sessions chosen for one week
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekSelection {
    /// Sessions in placement order
    pub workouts: Vec<SelectedWorkout>,
    /// Positions in `workouts` that extend a same-sport streak past the limit
    pub streak_overruns: Vec<usize>,
}

impl WeekSelection {
    /// Relaxation covering the overruns among the first `placed` sessions
    #[must_use]
    pub fn streak_relaxation(
        &self,
        placed: usize,
        max_consecutive: u8,
    ) -> Option<ConstraintRelaxation> {
        let overruns: Vec<&SelectedWorkout> = self
            .streak_overruns
            .iter()
            .filter(|position| **position < placed)
            .filter_map(|position| self.workouts.get(*position))
            .collect();
        let first = overruns.first()?;
        Some(ConstraintRelaxation {
            constraint: RelaxedConstraint::ConsecutiveSessionType,
            detail: format!(
                "{} hard session(s) extend a {} streak past {max_consecutive} in a row; no other template fits this phase",
                overruns.len(),
                first.sport
            ),
        })
    }
}

/// Run of consecutive hard sessions sharing a sport, carried across weeks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SportStreak {
    sport: Option<SessionType>,
    length: u8,
}

impl SportStreak {
    fn would_exceed(&self, sport: SessionType, max: u8) -> bool {
        self.sport == Some(sport) && self.length >= max
    }

    fn push(&mut self, sport: SessionType) {
        if self.sport == Some(sport) {
            self.length = self.length.saturating_add(1);
        } else {
            self.sport = Some(sport);
            self.length = 1;
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    template: &'a HiWorkoutTemplate,
    sport: SessionType,
    zone: IntensityZone,
}

/// Picks hard-session templates for a week
#[derive(Debug, Clone, Copy)]
pub struct WorkoutSelector<'a> {
    sessions: &'a SessionTypeConfig,
    distribution: &'a IntensityDistributionConfig,
}

impl<'a> WorkoutSelector<'a> {
    /// Selector over the methodology's templates and intensity targets
    #[must_use]
    pub const fn new(
        sessions: &'a SessionTypeConfig,
        distribution: &'a IntensityDistributionConfig,
    ) -> Self {
        Self {
            sessions,
            distribution,
        }
    }

    fn pool(&self, phase: TrainingPhase) -> Vec<Candidate<'a>> {
        let resolved: Vec<Candidate<'a>> = self
            .sessions
            .hi_workout_templates
            .iter()
            .filter_map(|template| {
                let zone = template.zone().filter(IntensityZone::is_hard)?;
                Some(Candidate {
                    template,
                    sport: template.sport()?,
                    zone,
                })
            })
            .collect();

        if self.sessions.rotation_strategy == RotationStrategy::PhaseSpecific {
            let for_phase: Vec<Candidate<'a>> = resolved
                .iter()
                .filter(|c| c.template.recommended_phases.contains(&phase))
                .copied()
                .collect();
            if !for_phase.is_empty() {
                return for_phase;
            }
        }
        resolved
    }

    fn rotation_index(&self, position: usize, week_number: u32, len: usize) -> usize {
        let week = week_number as usize;
        match self.sessions.rotation_strategy {
            RotationStrategy::Random => {
                (position * RANDOM_STRIDE + week * RANDOM_WEEK_OFFSET) % len
            }
            RotationStrategy::RoundRobin | RotationStrategy::PhaseSpecific => {
                (position + week) % len
            }
        }
    }

    /// Pick from `list` starting at the rotation index, skipping templates that
    /// would extend the same-sport streak past the methodology limit.
    ///
    /// The flag is set when every template overruns the streak and the
    /// rotation choice is used anyway.
    fn pick(
        &self,
        list: &[Candidate<'a>],
        position: usize,
        week_number: u32,
        streak: &SportStreak,
    ) -> Option<(Candidate<'a>, bool)> {
        if list.is_empty() {
            return None;
        }
        let start = self.rotation_index(position, week_number, list.len());
        let max = self.sessions.max_consecutive_same_type;
        (0..list.len())
            .map(|offset| list[(start + offset) % list.len()])
            .find(|candidate| !streak.would_exceed(candidate.sport, max))
            .map(|candidate| (candidate, false))
            .or(Some((list[start], true)))
    }

    /// Select `count` hard sessions for one week
    #[must_use]
    pub fn select_week(
        &self,
        phase: TrainingPhase,
        week_number: u32,
        count: usize,
        streak: &mut SportStreak,
    ) -> WeekSelection {
        let pool = self.pool(phase);
        if pool.is_empty() || count == 0 {
            return WeekSelection::default();
        }

        let threshold_target = self.distribution.threshold_intensity_target;
        let high_target = self.distribution.high_intensity_target;
        let split = threshold_target > 0.0 && high_target > 0.0;
        let threshold_sessions = if split {
            (threshold_target / (threshold_target + high_target) * count as f64).round() as usize
        } else {
            0
        };
        let (threshold_pool, high_pool): (Vec<_>, Vec<_>) = pool
            .iter()
            .copied()
            .partition(|c| c.zone.category() == Some(ZoneCategory::Threshold));

        let mut selection = WeekSelection {
            workouts: Vec::with_capacity(count),
            streak_overruns: Vec::new(),
        };
        for position in 0..count {
            let choice = if split {
                if position < threshold_sessions && !threshold_pool.is_empty() {
                    self.pick(&threshold_pool, position, week_number, streak)
                } else if high_pool.is_empty() {
                    self.pick(&pool, position, week_number, streak)
                } else {
                    let high_position = position.saturating_sub(threshold_sessions);
                    self.pick(&high_pool, high_position, week_number, streak)
                }
            } else {
                self.pick(&pool, position, week_number, streak)
            };

            if let Some((candidate, overrun)) = choice {
                if overrun {
                    selection.streak_overruns.push(selection.workouts.len());
                }
                streak.push(candidate.sport);
                selection.workouts.push(SelectedWorkout {
                    sport: candidate.sport,
                    zone: candidate.zone,
                    details: apply_progression(
                        &candidate.template.workout_description,
                        week_number,
                        phase,
                    ),
                });
            }
        }
        selection
    }
}

/// Add `(week - 1) mod 3` reps to every interval set in build and peak weeks
#[must_use]
pub fn apply_progression(description: &str, week_number: u32, phase: TrainingPhase) -> String {
    if !matches!(phase, TrainingPhase::Build | TrainingPhase::Peak) {
        return description.to_owned();
    }
    let Some(pattern) = INTERVAL_PATTERN.as_ref() else {
        return description.to_owned();
    };
    let progression = week_number.saturating_sub(1) % 3;
    if progression == 0 {
        return description.to_owned();
    }

    let progressed = pattern.replace_all(description, |caps: &Captures<'_>| {
        let reps = caps[1].parse::<u32>().map_or(0, |reps| reps + progression);
        format!("{reps}x{}{}", &caps[2], &caps[3])
    });
    if progressed == description {
        return description.to_owned();
    }
    format!("{progressed} (Week {} progression)", progression + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(sport: &str, zone: &str, description: &str, phases: &[TrainingPhase]) -> HiWorkoutTemplate {
        HiWorkoutTemplate {
            session_type: sport.to_owned(),
            primary_zone: zone.to_owned(),
            workout_description: description.to_owned(),
            discipline: sport.to_owned(),
            recommended_phases: phases.to_vec(),
        }
    }

    fn distribution(low: f64, threshold: f64, high: f64) -> IntensityDistributionConfig {
        IntensityDistributionConfig {
            low_intensity_target: low,
            threshold_intensity_target: threshold,
            high_intensity_target: high,
            tolerance_percent: 5.0,
        }
    }

    #[test]
    fn test_progression_only_in_build_and_peak() {
        let text = "6x800m @ Z4 with 2min recovery";
        assert_eq!(apply_progression(text, 2, TrainingPhase::Base), text);
        assert_eq!(
            apply_progression(text, 2, TrainingPhase::Build),
            "7x800m @ Z4 with 2min recovery (Week 2 progression)"
        );
        assert_eq!(
            apply_progression("4x10min threshold", 6, TrainingPhase::Peak),
            "6x10min threshold (Week 3 progression)"
        );
        assert_eq!(apply_progression(text, 4, TrainingPhase::Build), text);
    }

    #[test]
    fn test_split_follows_distribution() {
        let config = SessionTypeConfig {
            hi_workout_templates: vec![
                template("bike", "threshold", "3x12min @ FTP", &[]),
                template("run", "vo2max", "5x1000m", &[]),
            ],
            rotation_strategy: RotationStrategy::RoundRobin,
            max_consecutive_same_type: 2,
        };
        let targets = distribution(0.7, 0.2, 0.1);
        let selector = WorkoutSelector::new(&config, &targets);
        let picks = selector
            .select_week(TrainingPhase::Base, 1, 3, &mut SportStreak::default())
            .workouts;
        let threshold = picks
            .iter()
            .filter(|p| p.category() == ZoneCategory::Threshold)
            .count();
        assert_eq!(picks.len(), 3);
        assert_eq!(threshold, 2);
    }

    #[test]
    fn test_phase_specific_filters_templates() {
        let config = SessionTypeConfig {
            hi_workout_templates: vec![
                template("bike", "vo2max", "5x4min", &[TrainingPhase::Base]),
                template("run", "vo2max", "6x800m", &[TrainingPhase::Peak]),
            ],
            rotation_strategy: RotationStrategy::PhaseSpecific,
            max_consecutive_same_type: 3,
        };
        let targets = distribution(0.8, 0.0, 0.2);
        let selector = WorkoutSelector::new(&config, &targets);
        let picks = selector
            .select_week(TrainingPhase::Peak, 1, 2, &mut SportStreak::default())
            .workouts;
        assert!(picks.iter().all(|p| p.sport == SessionType::Run));
    }

    #[test]
    fn test_same_sport_streak_is_broken() {
        let config = SessionTypeConfig {
            hi_workout_templates: vec![
                template("bike", "vo2max", "5x4min", &[]),
                template("bike", "anaerobic", "8x30sec", &[]),
                template("run", "vo2max", "6x800m", &[]),
            ],
            rotation_strategy: RotationStrategy::RoundRobin,
            max_consecutive_same_type: 1,
        };
        let targets = distribution(0.8, 0.0, 0.2);
        let selector = WorkoutSelector::new(&config, &targets);
        let mut streak = SportStreak::default();
        let selection = selector.select_week(TrainingPhase::Base, 3, 3, &mut streak);
        for pair in selection.workouts.windows(2) {
            assert_ne!(pair[0].sport, pair[1].sport);
        }
        assert!(selection.streak_overruns.is_empty());
        assert!(selection.streak_relaxation(3, 1).is_none());
    }

    #[test]
    fn test_single_sport_pool_records_streak_overrun() {
        let config = SessionTypeConfig {
            hi_workout_templates: vec![
                template("bike", "anaerobic", "8x30sec", &[TrainingPhase::Taper]),
                template("run", "vo2max", "6x800m", &[TrainingPhase::Build]),
            ],
            rotation_strategy: RotationStrategy::PhaseSpecific,
            max_consecutive_same_type: 2,
        };
        let targets = distribution(0.8, 0.0, 0.2);
        let selector = WorkoutSelector::new(&config, &targets);
        let mut streak = SportStreak::default();
        let selection = selector.select_week(TrainingPhase::Taper, 15, 3, &mut streak);

        assert_eq!(selection.workouts.len(), 3);
        assert!(selection
            .workouts
            .iter()
            .all(|w| w.sport == SessionType::Bike));
        assert_eq!(selection.streak_overruns, vec![2]);

        let relaxation = selection.streak_relaxation(3, 2).unwrap();
        assert_eq!(relaxation.constraint, RelaxedConstraint::ConsecutiveSessionType);
        assert!(relaxation.detail.starts_with("1 hard session(s)"));
        // only two of the three were placed, so nothing overran
        assert!(selection.streak_relaxation(2, 2).is_none());
    }
}
