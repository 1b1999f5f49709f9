// ABOUTME: Mesocycle periodization: load:recovery ratio, week typing, volume multipliers and week notes
// ABOUTME: Recovery weeks close each mesocycle; the taper runs its own volume reduction outside mesocycles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tri_planner_core::models::{
    LoadRecoveryRatio, PeriodizationConfig, PlanDecision, TrainingPhase, WeekType,
};

use super::phases::PhaseAllocation;
use crate::config::PlanningTuning;

/// Structural position of one week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekSlot {
    /// 1-based week number
    pub week_number: u32,
    /// Phase
    pub phase: TrainingPhase,
    /// Load or recovery
    pub week_type: WeekType,
    /// Mesocycle, `None` in the taper
    pub mesocycle_number: Option<u32>,
    /// Position inside the mesocycle, `None` in the taper
    pub mesocycle_week: Option<u32>,
}

/// Pick the load:recovery ratio from fragility and training age
#[must_use]
pub fn select_ratio(
    fragility_score: f64,
    years_training: f64,
    config: &PeriodizationConfig,
) -> (LoadRecoveryRatio, PlanDecision) {
    let high_fragility = fragility_score > config.fragility_threshold;
    let beginner = years_training < config.experience_threshold_years;

    let (ratio, reason) = match (high_fragility, beginner) {
        (true, true) => (
            config.high_fragility_ratio,
            format!(
                "high fragility AND beginner (<{} years)",
                config.experience_threshold_years
            ),
        ),
        (true, false) => (
            config.high_fragility_ratio,
            format!("high fragility (>{})", config.fragility_threshold),
        ),
        (false, true) => (
            config.high_fragility_ratio,
            format!(
                "beginner (<{} years training)",
                config.experience_threshold_years
            ),
        ),
        (false, false) => (
            config.default_ratio,
            "experienced athlete with moderate/low fragility".to_owned(),
        ),
    };

    let decision = PlanDecision {
        decision_point: "Load:Recovery Ratio Selection".to_owned(),
        input_factors: vec![
            format!("fragility_score={fragility_score:.2}"),
            format!("years_training={years_training:.1}"),
            format!("fragility_threshold={}", config.fragility_threshold),
            format!("experience_threshold={}", config.experience_threshold_years),
        ],
        reasoning: format!(
            "Selected {}:{} ratio due to {reason}. Mesocycle length: {} weeks. \
             Recovery weeks allow adaptation and prevent overtraining.",
            ratio.load_weeks,
            ratio.recovery_weeks,
            ratio.mesocycle_length()
        ),
        outcome: format!(
            "{}:{} load:recovery ratio ({}-week mesocycles)",
            ratio.load_weeks,
            ratio.recovery_weeks,
            ratio.mesocycle_length()
        ),
    };
    (ratio, decision)
}

/// Lay mesocycles over the non-taper weeks
#[must_use]
pub fn build_structure(
    allocation: &PhaseAllocation,
    ratio: LoadRecoveryRatio,
    config: &PeriodizationConfig,
) -> (Vec<WeekSlot>, PlanDecision) {
    let total = allocation.total();
    let taper_start = allocation.taper_start();
    let mesocycle_length = ratio.mesocycle_length().max(1);

    let mut slots = Vec::with_capacity(total as usize);
    let mut mesocycle = 1;
    let mut position = 1;

    for week_number in 1..=total {
        let phase = allocation.phase_for_week(week_number);
        if phase == TrainingPhase::Taper {
            slots.push(WeekSlot {
                week_number,
                phase,
                week_type: WeekType::Load,
                mesocycle_number: None,
                mesocycle_week: None,
            });
            continue;
        }

        let mut recovery = position > ratio.load_weeks;
        if recovery
            && config.skip_final_mesocycle_recovery
            && allocation.taper > 0
            && week_number + 1 >= taper_start
        {
            recovery = false;
        }

        slots.push(WeekSlot {
            week_number,
            phase,
            week_type: if recovery {
                WeekType::Recovery
            } else {
                WeekType::Load
            },
            mesocycle_number: Some(mesocycle),
            mesocycle_week: Some(position),
        });

        position += 1;
        if position > mesocycle_length {
            position = 1;
            mesocycle += 1;
        }
    }

    let recovery_count = slots
        .iter()
        .filter(|slot| slot.week_type == WeekType::Recovery)
        .count();
    let load_count = slots.len() - recovery_count;
    let mesocycles = slots
        .iter()
        .filter_map(|slot| slot.mesocycle_number)
        .max()
        .unwrap_or(0);

    let decision = PlanDecision {
        decision_point: "Mesocycle Structure".to_owned(),
        input_factors: vec![
            format!("total_weeks={total}"),
            format!("mesocycle_length={mesocycle_length}"),
            format!("taper_start_week={taper_start}"),
            format!("load_weeks_per_cycle={}", ratio.load_weeks),
        ],
        reasoning: format!(
            "Built mesocycle structure with {mesocycles} mesocycle(s). Recovery weeks close each \
             mesocycle to allow physiological adaptation and prevent cumulative fatigue."
        ),
        outcome: format!("{load_count} load weeks, {recovery_count} recovery weeks"),
    };
    (slots, decision)
}

/// Recovery-week multiplier: interpolated by fragility, minus the phase deload, clamped
#[must_use]
pub fn recovery_volume_multiplier(
    fragility_score: f64,
    phase: TrainingPhase,
    config: &PeriodizationConfig,
) -> f64 {
    let recovery = &config.recovery_week_config;
    let span = recovery.volume_multiplier_max - recovery.volume_multiplier_min;
    let interpolated = span.mul_add(-fragility_score, recovery.volume_multiplier_max);
    let adjustment = config
        .phase_deload_adjustments
        .get(&phase)
        .copied()
        .unwrap_or(0.0);
    (interpolated - adjustment).clamp(
        recovery.volume_multiplier_min,
        recovery.volume_multiplier_max,
    )
}

/// Volume multiplier applied to the athlete's base volume for one week
#[must_use]
pub fn week_volume_multiplier(
    slot: &WeekSlot,
    allocation: &PhaseAllocation,
    fragility_score: f64,
    config: &PeriodizationConfig,
    tuning: &PlanningTuning,
) -> f64 {
    if slot.week_type == WeekType::Recovery {
        return recovery_volume_multiplier(fragility_score, slot.phase, config);
    }
    match slot.phase {
        TrainingPhase::Taper => {
            let [last, second_to_last, earlier] = tuning.taper_multipliers;
            let position = allocation.taper_week(slot.week_number).unwrap_or(1);
            if position == allocation.taper {
                last
            } else if position + 1 == allocation.taper {
                second_to_last
            } else {
                earlier
            }
        }
        TrainingPhase::Build => tuning.build_volume_multiplier,
        TrainingPhase::Base | TrainingPhase::Peak => 1.0,
    }
}

/// Coach note for a week, if any
#[must_use]
pub fn week_notes(
    slot: &WeekSlot,
    volume_multiplier: f64,
    config: &PeriodizationConfig,
) -> Option<String> {
    if slot.week_type == WeekType::Recovery {
        let percent = (volume_multiplier * 100.0).round() as u32;
        return Some(
            config
                .recovery_week_config
                .week_note_template
                .replace("{volume_percent}", &percent.to_string()),
        );
    }
    match slot.phase {
        TrainingPhase::Taper => Some(
            "TAPER WEEK: Prioritize rest and recovery. Maintain intensity but reduce volume significantly."
                .to_owned(),
        ),
        TrainingPhase::Peak => Some(
            "PEAK WEEK: Maximum intensity focus. Ensure adequate recovery between sessions."
                .to_owned(),
        ),
        TrainingPhase::Base | TrainingPhase::Build => {
            (slot.mesocycle_week == Some(1)).then(|| {
                format!(
                    "Mesocycle {} begins. Progressive loading phase - build fitness systematically.",
                    slot.mesocycle_number.unwrap_or(1)
                )
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocation() -> PhaseAllocation {
        PhaseAllocation {
            base: 4,
            build: 6,
            peak: 1,
            taper: 1,
        }
    }

    #[test]
    fn test_three_to_one_structure() {
        let config = PeriodizationConfig::default();
        let (slots, decision) = build_structure(&allocation(), config.default_ratio, &config);
        assert_eq!(slots.len(), 12);
        let recovery: Vec<u32> = slots
            .iter()
            .filter(|slot| slot.week_type == WeekType::Recovery)
            .map(|slot| slot.week_number)
            .collect();
        assert_eq!(recovery, vec![4, 8]);
        assert_eq!(slots[11].mesocycle_number, None);
        assert_eq!(slots[11].week_type, WeekType::Load);
        assert_eq!(decision.outcome, "10 load weeks, 2 recovery weeks");
    }

    #[test]
    fn test_recovery_before_taper_becomes_load() {
        let config = PeriodizationConfig::default();
        let (slots, _) = build_structure(&allocation(), config.high_fragility_ratio, &config);
        // 2:1 puts recovery on weeks 3, 6, 9 and would put one on week 12 if it were not the taper
        assert_eq!(slots[8].week_type, WeekType::Recovery);

        let short = PhaseAllocation {
            base: 1,
            build: 1,
            peak: 1,
            taper: 1,
        };
        let (slots, _) = build_structure(&short, config.high_fragility_ratio, &config);
        assert_eq!(slots[2].week_type, WeekType::Load);
    }

    #[test]
    fn test_ratio_selection() {
        let config = PeriodizationConfig::default();
        let (ratio, decision) = select_ratio(0.72, 5.0, &config);
        assert_eq!(ratio.load_weeks, 2);
        assert_eq!(
            decision.outcome,
            "2:1 load:recovery ratio (3-week mesocycles)"
        );
        let (ratio, _) = select_ratio(0.45, 5.0, &config);
        assert_eq!(ratio.load_weeks, 3);
        let (ratio, _) = select_ratio(0.45, 1.0, &config);
        assert_eq!(ratio.load_weeks, 2);
    }

    #[test]
    fn test_recovery_multiplier_tracks_fragility() {
        let config = PeriodizationConfig::default();
        let robust = recovery_volume_multiplier(0.0, TrainingPhase::Base, &config);
        let fragile = recovery_volume_multiplier(1.0, TrainingPhase::Base, &config);
        assert!((robust - 0.6).abs() < 1e-12);
        assert!((fragile - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_taper_multipliers_count_back_from_race() {
        let config = PeriodizationConfig::default();
        let tuning = PlanningTuning::default();
        let allocation = PhaseAllocation {
            base: 6,
            build: 5,
            peak: 3,
            taper: 2,
        };
        let taper_slot = |week_number| WeekSlot {
            week_number,
            phase: TrainingPhase::Taper,
            week_type: WeekType::Load,
            mesocycle_number: None,
            mesocycle_week: None,
        };
        let first = week_volume_multiplier(&taper_slot(15), &allocation, 0.5, &config, &tuning);
        let last = week_volume_multiplier(&taper_slot(16), &allocation, 0.5, &config, &tuning);
        assert!((first - 0.6).abs() < 1e-12);
        assert!((last - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_week_notes() {
        let config = PeriodizationConfig::default();
        let slot = WeekSlot {
            week_number: 4,
            phase: TrainingPhase::Base,
            week_type: WeekType::Recovery,
            mesocycle_number: Some(1),
            mesocycle_week: Some(4),
        };
        let note = week_notes(&slot, 0.55, &config).unwrap();
        assert!(note.contains("55%"));

        let start = WeekSlot {
            week_type: WeekType::Load,
            week_number: 5,
            mesocycle_number: Some(2),
            mesocycle_week: Some(1),
            ..slot
        };
        assert_eq!(
            week_notes(&start, 1.0, &config).as_deref(),
            Some("Mesocycle 2 begins. Progressive loading phase - build fitness systematically.")
        );
    }
}
