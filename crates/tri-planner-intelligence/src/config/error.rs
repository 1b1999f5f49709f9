// ABOUTME: Configuration error types for decision engine tunables
// ABOUTME: Defines error variants for invalid ranges, inconsistent weights and parse failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration error types for tunable validation.

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Ordered thresholds are not ascending (e.g., critical sleep above optimal sleep)
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),

    /// Weights don't sum to the required total
    #[error("Invalid weights: {0}")]
    InvalidWeights(&'static str),

    /// Numeric value outside the valid range for the parameter
    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),

    /// Failed to parse an environment override
    #[error("Parse error: {0}")]
    Parse(String),
}
