// ABOUTME: Domain data models for the Tri Planner decision engine
// ABOUTME: Re-exports profile, methodology, trace, fragility and plan types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Inputs (`UserProfile`, `MethodologyConfig`) are supplied per request and
//! schema-validated before any engine logic runs. Outputs (`ValidationResult`,
//! `FragilityResult`, `TrainingPlan`) are built once and never mutated.
//!
//! ## Core Models
//!
//! - `UserProfile`: athlete state, history, goals, constraints and preferences
//! - `MethodologyConfig`: assumptions, safety gates, risk weights and planning rules
//! - `ReasoningTrace`: ordered record of every assumption check and gate evaluation
//! - `FragilityResult`: score, bucket and per-factor breakdown
//! - `TrainingPlan`: phased weeks of sessions plus the decisions behind them

mod field;
mod fragility;
mod methodology;
mod plan;
mod profile;
mod trace;

// Field addressing
pub use field::{FieldKind, FieldValue, ProfileField};

// Fragility domain
pub use fragility::{FragilityFactor, FragilityResult, RiskLevel};

// Methodology domain
pub use methodology::{
    Assumption, Criticality, ExclusionCriterion, FailureMode, HiWorkoutTemplate,
    IntensityDistributionConfig, LoadRecoveryRatio, MetabolicFocus, MethodologyConfig,
    PeriodizationConfig, PhaseDistributionConfig, PhasePercentages, Philosophy, RecoveryWeekConfig,
    Reference, RiskProfile, RotationStrategy, SafetyGates, SessionTypeConfig, Severity,
};

// Plan domain
pub use plan::{
    zone_display, ConstraintRelaxation, IntensityDistributionSummary, IntensityZone, PlanDecision,
    RelaxedConstraint, SessionType, TrainingPhase, TrainingPlan, TrainingSession, TrainingWeek,
    WeekType, ZoneCategory,
};

// Profile domain
pub use profile::{
    Climate, Constraints, CurrentState, EnvironmentalFactors, EquipmentAccess, Goals, HrvTrend,
    InjuryHistoryItem, IntensityPreference, MenstrualPhase, Preferences, PrimaryGoal, ProfileMetadata,
    RaceDistance, RacePriority, RaceResult, StressLevel, TrainingHistory, UserProfile, Weekday,
};

// Trace domain
pub use trace::{
    AssumptionCheck, GateEvaluation, ReasoningTrace, RefusalResponse, ValidationResult,
    ValidationStatus,
};
