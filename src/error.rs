//! Error types for the ExpressRoute planner.
//!
//! This module provides the error hierarchy for every stage of a planning
//! invocation: loading configuration, validating it, and working with
//! resource plans (building, loading, and verifying).

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ValidationError;

/// The main error type for the ExpressRoute planner.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plan-related errors.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed. Carries every violation found, not only the first.
    #[error("Configuration validation failed with {} error(s)", errors.len())]
    ValidationFailed {
        /// All validation errors, in check order.
        errors: Vec<ValidationError>,
    },
}

/// Plan-related errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A plan document could not be read.
    #[error("Invalid plan document: {message}")]
    InvalidDocument {
        /// Description of the problem.
        message: String,
    },

    /// A verification expectation could not be parsed.
    #[error("Invalid expectation '{expression}': {reason}")]
    InvalidExpectation {
        /// The expression as written.
        expression: String,
        /// Why it was rejected.
        reason: String,
    },

    /// One or more expectations did not hold.
    #[error("Plan verification failed: {failed} of {total} expectation(s) not met")]
    VerificationFailed {
        /// Number of failed expectations.
        failed: usize,
        /// Number of expectations checked.
        total: usize,
    },
}

/// Result type alias for planner operations.
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the validation errors if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            Self::Config(ConfigError::ValidationFailed { errors }) => Some(errors.as_slice()),
            _ => None,
        }
    }
}

impl PlanError {
    /// Creates an invalid document error.
    #[must_use]
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Creates an invalid expectation error.
    #[must_use]
    pub fn invalid_expectation(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidExpectation {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}
