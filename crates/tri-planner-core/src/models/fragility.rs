// ABOUTME: Fragility score result types: risk buckets, named penalty factors, additive breakdown
// ABOUTME: Produced by the fragility calculator and consumed by the planner and trace export
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::fragility::{HIGH_RISK_CEILING, LOW_RISK_CEILING, MODERATE_RISK_CEILING};

/// Named penalty contributing to the fragility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragilityFactor {
    /// Sleep below optimal
    SleepDeviation,
    /// Life stress
    StressMultiplier,
    /// Volume outside the healthy band or inconsistent
    VolumeVariance,
    /// Intensity pressure from the race timeline
    IntensityFrequency,
    /// HRV trend and illness
    RecoveryQuality,
}

impl FragilityFactor {
    /// All factors in reporting order
    pub const ALL: [Self; 5] = [
        Self::SleepDeviation,
        Self::StressMultiplier,
        Self::VolumeVariance,
        Self::IntensityFrequency,
        Self::RecoveryQuality,
    ];

    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SleepDeviation => "sleep_deviation",
            Self::StressMultiplier => "stress_multiplier",
            Self::VolumeVariance => "volume_variance",
            Self::IntensityFrequency => "intensity_frequency",
            Self::RecoveryQuality => "recovery_quality",
        }
    }
}

impl fmt::Display for FragilityFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpretation bucket of a fragility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// [0, 0.4)
    Low,
    /// [0.4, 0.6)
    Moderate,
    /// [0.6, 0.8)
    High,
    /// [0.8, 1.0]
    Critical,
}

impl RiskLevel {
    /// Bucket a score using the fixed cut points
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < LOW_RISK_CEILING {
            Self::Low
        } else if score < MODERATE_RISK_CEILING {
            Self::Moderate
        } else if score < HIGH_RISK_CEILING {
            Self::High
        } else {
            Self::Critical
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
            Self::Critical => "Critical Risk",
        }
    }

    /// Lowercase name used in decision text
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of a fragility calculation; immutable once returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragilityResult {
    /// Athlete the score belongs to
    pub athlete_id: String,
    /// Methodology whose weights were applied
    pub methodology_id: String,
    /// Final score in [0, 1]
    pub score: f64,
    /// Methodology base fragility
    pub base_fragility: f64,
    /// Bucket
    pub risk_level: RiskLevel,
    /// Bucket label
    pub interpretation: String,
    /// Raw penalty per factor, each in [0, 1]
    pub penalties: BTreeMap<FragilityFactor, f64>,
    /// Weighted contribution per factor
    pub breakdown: BTreeMap<FragilityFactor, f64>,
    /// Targeted suggestions, highest contributor first
    pub recommendations: Vec<String>,
}

impl FragilityResult {
    /// Sum of weighted contributions before clamping
    #[must_use]
    pub fn total_penalty(&self) -> f64 {
        self.breakdown.values().sum()
    }

    /// Factors ordered by descending contribution
    #[must_use]
    pub fn ranked_contributors(&self) -> Vec<(FragilityFactor, f64)> {
        let mut ranked: Vec<_> = self.breakdown.iter().map(|(f, c)| (*f, *c)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_edges() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.399), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.4), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(0.6), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.8), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::Critical);
    }

    #[test]
    fn test_factor_keys_deserialize_in_maps() {
        let weights: BTreeMap<FragilityFactor, f64> =
            serde_json::from_str(r#"{"sleep_deviation": 0.3, "recovery_quality": 0.2}"#).unwrap();
        assert_eq!(weights.get(&FragilityFactor::SleepDeviation), Some(&0.3));
        assert!(serde_json::from_str::<BTreeMap<FragilityFactor, f64>>(r#"{"mood": 0.1}"#).is_err());
    }
}
