//! Unified error types for the domain layer
//!
//! Provides a common error type used across all domain operations, so adapters
//! never have to fall back to String or anyhow at the domain boundary.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Timestamp predates the rotation anchor, so no week number exists for it
    #[error("Timestamp {timestamp} predates the rotation anchor {anchor}")]
    BeforeRotationAnchor {
        timestamp: DateTime<Utc>,
        anchor: DateTime<Utc>,
    },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when domain invariants are violated: required fields empty,
    /// values outside allowed ranges, weight fractions that do not sum to one.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string doesn't
    /// match any known variant (class names, rarities, pool kinds).
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
