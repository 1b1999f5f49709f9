// ABOUTME: Phase allocation: splits the plan length into base, build, peak and taper blocks
// ABOUTME: Uses the methodology's plan-length buckets with minimums, base extension and a fixed-position taper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tri_planner_core::constants::planning::{
    MAX_TAPER_WEEKS, MEDIUM_PLAN_MAX_WEEKS, SHORT_PLAN_MAX_WEEKS,
};
use tri_planner_core::models::{PhaseDistributionConfig, PhasePercentages, PlanDecision, TrainingPhase};

/// Plan-length bucket selecting the phase percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanLength {
    /// Up to six weeks
    Short,
    /// Seven to twelve weeks
    Medium,
    /// Longer than twelve weeks
    Long,
}

impl PlanLength {
    /// Bucket for a plan of `weeks` weeks
    #[must_use]
    pub const fn for_weeks(weeks: u32) -> Self {
        if weeks <= SHORT_PLAN_MAX_WEEKS {
            Self::Short
        } else if weeks <= MEDIUM_PLAN_MAX_WEEKS {
            Self::Medium
        } else {
            Self::Long
        }
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    const fn percentages(self, config: &PhaseDistributionConfig) -> &PhasePercentages {
        match self {
            Self::Short => &config.short_plan_phases,
            Self::Medium => &config.medium_plan_phases,
            Self::Long => &config.long_plan_phases,
        }
    }
}

/// Weeks assigned to each phase, in plan order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseAllocation {
    /// Base weeks
    pub base: u32,
    /// Build weeks
    pub build: u32,
    /// Peak weeks
    pub peak: u32,
    /// Taper weeks (always last)
    pub taper: u32,
}

impl PhaseAllocation {
    /// Total weeks
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.base + self.build + self.peak + self.taper
    }

    /// First taper week, or one past the end when there is no taper
    #[must_use]
    pub const fn taper_start(&self) -> u32 {
        self.base + self.build + self.peak + 1
    }

    /// Phase of a 1-based week
    #[must_use]
    pub const fn phase_for_week(&self, week_number: u32) -> TrainingPhase {
        if week_number <= self.base {
            TrainingPhase::Base
        } else if week_number <= self.base + self.build {
            TrainingPhase::Build
        } else if week_number <= self.base + self.build + self.peak {
            TrainingPhase::Peak
        } else {
            TrainingPhase::Taper
        }
    }

    /// 1-based position inside the taper, `None` outside it
    #[must_use]
    pub const fn taper_week(&self, week_number: u32) -> Option<u32> {
        let start = self.taper_start();
        if self.taper > 0 && week_number >= start {
            Some(week_number - start + 1)
        } else {
            None
        }
    }
}

fn share(total_weeks: u32, percent: f64, minimum: u32) -> u32 {
    let weeks = (f64::from(total_weeks) * percent).floor() as u32;
    weeks.max(minimum)
}

/// Split `total_weeks` into phases
///
/// The taper is 1-2 weeks and only exists when a race is scheduled. Base is
/// extended when the athlete's volume consistency is below the methodology
/// threshold. Any excess is trimmed from peak, then build, then base; any
/// shortfall goes to build.
#[must_use]
pub fn allocate(
    total_weeks: u32,
    has_race: bool,
    volume_consistency_weeks: Option<u32>,
    config: &PhaseDistributionConfig,
) -> PhaseAllocation {
    let percentages = PlanLength::for_weeks(total_weeks).percentages(config);

    let taper = if has_race {
        let wanted = share(
            total_weeks,
            percentages.taper_percent,
            percentages.min_taper_weeks,
        )
        .clamp(1, MAX_TAPER_WEEKS);
        if total_weeks > 1 {
            wanted.min(total_weeks - 1)
        } else {
            total_weeks
        }
    } else {
        0
    };
    let remaining = total_weeks - taper;

    let mut base = share(total_weeks, percentages.base_percent, percentages.min_base_weeks);
    let mut build = share(
        total_weeks,
        percentages.build_percent,
        percentages.min_build_weeks,
    );
    let mut peak = share(total_weeks, percentages.peak_percent, percentages.min_peak_weeks);

    if volume_consistency_weeks.unwrap_or(0) < config.volume_consistency_threshold {
        base += config.base_extension_weeks;
        build = build.saturating_sub(config.base_extension_weeks).max(1);
    }

    let assigned = base + build + peak;
    if assigned > remaining {
        let mut excess = assigned - remaining;
        for phase_weeks in [&mut peak, &mut build, &mut base] {
            let cut = excess.min(*phase_weeks);
            *phase_weeks -= cut;
            excess -= cut;
        }
    } else {
        build += remaining - assigned;
    }

    PhaseAllocation {
        base,
        build,
        peak,
        taper,
    }
}

/// Decision record for the phase split
#[must_use]
pub fn phase_decision(
    allocation: &PhaseAllocation,
    weeks_to_race: Option<u32>,
    volume_consistency_weeks: Option<u32>,
    config: &PhaseDistributionConfig,
) -> PlanDecision {
    let total = allocation.total();
    let consistency = volume_consistency_weeks.unwrap_or(0);
    let timeline = weeks_to_race.map_or_else(
        || format!("No race scheduled; planning a {total}-week block without taper."),
        |weeks| format!("Allocated {weeks} weeks across phases based on timeline."),
    );
    let base_note = if consistency < config.volume_consistency_threshold {
        format!(
            " Extended base phase by {} week(s) due to low volume consistency (<{} weeks).",
            config.base_extension_weeks, config.volume_consistency_threshold
        )
    } else {
        " Standard phase distribution for well-established base.".to_owned()
    };

    PlanDecision {
        decision_point: "Training Phase Distribution".to_owned(),
        input_factors: vec![
            format!(
                "weeks_to_race={}",
                weeks_to_race.map_or_else(|| "unknown".to_owned(), |w| w.to_string())
            ),
            format!("volume_consistency_weeks={consistency}"),
            format!("plan_length={}", PlanLength::for_weeks(total).as_str()),
        ],
        reasoning: format!("{timeline}{base_note}"),
        outcome: format!(
            "{}wk base, {}wk build, {}wk peak, {}wk taper",
            allocation.base, allocation.build, allocation.peak, allocation.taper
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percentages(base: f64, build: f64, peak: f64, taper: f64, mins: [u32; 4]) -> PhasePercentages {
        PhasePercentages {
            base_percent: base,
            build_percent: build,
            peak_percent: peak,
            taper_percent: taper,
            min_base_weeks: mins[0],
            min_build_weeks: mins[1],
            min_peak_weeks: mins[2],
            min_taper_weeks: mins[3],
        }
    }

    fn config() -> PhaseDistributionConfig {
        PhaseDistributionConfig {
            short_plan_phases: percentages(0.33, 0.33, 0.17, 0.17, [1, 1, 1, 1]),
            medium_plan_phases: percentages(0.40, 0.35, 0.15, 0.10, [2, 2, 1, 1]),
            long_plan_phases: percentages(0.45, 0.30, 0.15, 0.10, [3, 3, 2, 1]),
            volume_consistency_threshold: 4,
            base_extension_weeks: 1,
        }
    }

    #[test]
    fn test_medium_plan_fills_build() {
        let allocation = allocate(12, true, Some(8), &config());
        assert_eq!(
            allocation,
            PhaseAllocation {
                base: 4,
                build: 6,
                peak: 1,
                taper: 1
            }
        );
        assert_eq!(allocation.phase_for_week(12), TrainingPhase::Taper);
        assert_eq!(allocation.taper_week(12), Some(1));
    }

    #[test]
    fn test_short_plan_with_low_consistency_trims_peak() {
        let allocation = allocate(4, true, Some(2), &config());
        assert_eq!(allocation.total(), 4);
        assert_eq!(allocation.taper, 1);
        assert_eq!(allocation.base, 2);
        assert_eq!(allocation.peak, 0);
    }

    #[test]
    fn test_long_plan_taper_is_clamped() {
        let allocation = allocate(30, true, Some(10), &config());
        assert_eq!(allocation.taper, 2);
        assert_eq!(allocation.total(), 30);
    }

    #[test]
    fn test_no_race_means_no_taper() {
        let allocation = allocate(12, false, Some(8), &config());
        assert_eq!(allocation.taper, 0);
        assert_eq!(allocation.total(), 12);
        assert_eq!(allocation.taper_week(12), None);
        assert_ne!(allocation.phase_for_week(12), TrainingPhase::Taper);
    }

    #[test]
    fn test_single_week_plan_is_taper() {
        let allocation = allocate(1, true, Some(8), &config());
        assert_eq!(allocation.total(), 1);
        assert_eq!(allocation.phase_for_week(1), TrainingPhase::Taper);
    }
}
