// ABOUTME: Unified error handling with AppError, ErrorCode, and schema violation types
// ABOUTME: Separates malformed input, precondition violations, and internal failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every fallible operation in the engine returns [`AppResult`]. Safety refusals
//! are *not* errors: they are a first-class `refused` validation outcome. Errors
//! are reserved for schema violations, precondition violations, configuration
//! problems and I/O performed by callers.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Standard error codes used throughout the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Input is invalid
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A profile or methodology document violates its schema
    #[serde(rename = "SCHEMA_VIOLATION")]
    SchemaViolation = 3004,

    // Resource Management (4000-4499)
    /// Requested resource does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,

    // Preconditions (4500-4999)
    /// An operation was invoked in a state that does not permit it
    #[serde(rename = "PRECONDITION_FAILED")]
    PreconditionFailed = 4500,

    // Configuration (6000-6999)
    /// Configuration error
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Filesystem operation failed
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
    /// Serialization or deserialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::SchemaViolation => "The document does not satisfy its schema",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::PreconditionFailed => "The operation's precondition was not met",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal error occurred",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether the error was caused by caller-supplied input
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput
                | Self::SchemaViolation
                | Self::ResourceNotFound
                | Self::PreconditionFailed
        )
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Athlete the failing operation concerned
    pub athlete_id: Option<String>,
    /// Methodology the failing operation concerned
    pub methodology_id: Option<String>,
    /// Resource identifier (file path, field path) if applicable
    pub resource_id: Option<String>,
    /// Additional key-value context
    pub details: Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            athlete_id: None,
            methodology_id: None,
            resource_id: None,
            details: Value::Object(Map::new()),
        }
    }
}

/// Unified error type for the engine
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add the athlete identifier to the error context
    #[must_use]
    pub fn with_athlete_id(mut self, athlete_id: impl Into<String>) -> Self {
        self.context.athlete_id = Some(athlete_id.into());
        self
    }

    /// Add the methodology identifier to the error context
    #[must_use]
    pub fn with_methodology_id(mut self, methodology_id: impl Into<String>) -> Self {
        self.context.methodology_id = Some(methodology_id.into());
        self
    }

    /// Add a resource ID to the error context
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.context.resource_id = Some(resource_id.into());
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.context.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience functions for creating common errors
impl AppError {
    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Schema violation in a profile or methodology document
    #[must_use]
    pub fn schema_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SchemaViolation, message)
    }

    /// Precondition violation: a programming error in the caller
    #[must_use]
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PreconditionFailed, message)
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Serialization error
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }

    /// Storage error
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// Schema violations detected while validating a profile or methodology document
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// A numeric field is outside its permitted range
    #[error("{field} = {value} is outside the permitted range [{min}, {max}]")]
    OutOfRange {
        /// Dotted field path
        field: String,
        /// Offending value
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },

    /// A string field does not match its required pattern
    #[error("{field} = '{value}' does not match pattern {pattern}")]
    PatternMismatch {
        /// Dotted field path
        field: String,
        /// Offending value
        value: String,
        /// Pattern description
        pattern: &'static str,
    },

    /// A required collection is empty or a required value absent
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A collection has too many entries
    #[error("{field} has {count} entries, at most {max} allowed")]
    TooMany {
        /// Dotted field path
        field: String,
        /// Actual count
        count: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Two entries share a key that must be unique
    #[error("duplicate key '{key}' in {field}")]
    DuplicateKey {
        /// Dotted field path
        field: String,
        /// Duplicated key
        key: String,
    },

    /// A set of fractions does not sum to the expected total
    #[error("{field} sums to {sum:.3}, expected {expected:.2}")]
    BadSum {
        /// Dotted field path
        field: String,
        /// Actual sum
        sum: f64,
        /// Expected sum
        expected: f64,
    },

    /// Dotted path outside the allow-list of addressable fields
    #[error("unknown or non-modifiable field path: {0}")]
    UnknownField(String),

    /// A supplied value has the wrong type for its field
    #[error("{field} expects {expected}, got {actual}")]
    TypeMismatch {
        /// Dotted field path
        field: String,
        /// Expected type description
        expected: &'static str,
        /// Rendered actual value
        actual: String,
    },

    /// A rule or threshold expression could not be parsed
    #[error("cannot parse {field} expression '{expression}': {reason}")]
    InvalidExpression {
        /// Where the expression lives
        field: String,
        /// The expression text
        expression: String,
        /// Why parsing failed
        reason: String,
    },

    /// Any other structural inconsistency
    #[error("{field}: {reason}")]
    Invalid {
        /// Dotted field path
        field: String,
        /// Description of the problem
        reason: String,
    },
}

impl SchemaError {
    /// Build an out-of-range error, rejecting NaN through the same path
    #[must_use]
    pub fn out_of_range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        }
    }

    /// Check `value` against an inclusive range
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::OutOfRange`] when `value` is NaN or outside `[min, max]`
    pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), Self> {
        if value.is_nan() || value < min || value > max {
            return Err(Self::out_of_range(field, value, min, max));
        }
        Ok(())
    }
}

impl From<SchemaError> for AppError {
    fn from(error: SchemaError) -> Self {
        let field = match &error {
            SchemaError::OutOfRange { field, .. }
            | SchemaError::PatternMismatch { field, .. }
            | SchemaError::TooMany { field, .. }
            | SchemaError::DuplicateKey { field, .. }
            | SchemaError::BadSum { field, .. }
            | SchemaError::TypeMismatch { field, .. }
            | SchemaError::InvalidExpression { field, .. }
            | SchemaError::Invalid { field, .. }
            | SchemaError::MissingField(field)
            | SchemaError::UnknownField(field) => field.clone(),
        };
        Self::schema_violation(error.to_string())
            .with_resource_id(field)
            .with_source(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {error}")).with_details(json!({
            "line": error.line(),
            "column": error.column(),
        }))
    }
}
