//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  add_rule                                                               │
//! │  └── ConfigError                                                        │
//! │      ├── UnsupportedKind   - kind outside the catalog                   │
//! │      ├── Malformed         - definition is not valid JSON for the kind  │
//! │      └── Invalid           - wraps ValidationError                      │
//! │                                                                         │
//! │  process                                                                │
//! │  └── EvalError                                                          │
//! │      └── Overflow          - contribution or total left i64 range       │
//! │                                                                         │
//! │  Flow: ValidationError → ConfigError → CLI (anyhow) → stderr           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is local to one `add_rule`/`process` call. A failed
//! `add_rule` never changes the registry, and a failed `process` never
//! returns a partial total.

use thiserror::Error;

use crate::rules::RuleKind;

// =============================================================================
// Config Error
// =============================================================================

/// Errors raised while registering a rule.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested kind is not part of the rule catalog.
    #[error("Unsupported rule kind: '{kind}'")]
    UnsupportedKind { kind: String },

    /// The definition text does not match the kind's schema.
    ///
    /// ## When This Occurs
    /// - Definition is not JSON at all
    /// - A required field is missing or has the wrong type
    /// - An unknown field is present
    #[error("Malformed {kind} definition: {source}")]
    Malformed {
        kind: RuleKind,
        source: serde_json::Error,
    },

    /// The definition parsed but a parameter failed validation.
    #[error("Invalid {kind} definition: {source}")]
    Invalid {
        kind: RuleKind,
        source: ValidationError,
    },
}

impl ConfigError {
    /// The catalog kind the error refers to, if the kind was recognised.
    pub fn kind(&self) -> Option<RuleKind> {
        match self {
            ConfigError::UnsupportedKind { .. } => None,
            ConfigError::Malformed { kind, .. } | ConfigError::Invalid { kind, .. } => Some(*kind),
        }
    }
}

// =============================================================================
// Eval Error
// =============================================================================

/// Errors raised while scoring a receipt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    /// Points could not be represented as an `i64`.
    ///
    /// ## When This Occurs
    /// - A huge `pointsPerChar`/`multiplier` times a large count
    /// - The running total of several huge contributions
    #[error("Point overflow while evaluating {kind}")]
    Overflow { kind: RuleKind },
}

impl EvalError {
    /// The rule kind whose evaluation failed.
    pub fn kind(&self) -> RuleKind {
        match self {
            EvalError::Overflow { kind } => *kind,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Parameter validation errors.
///
/// Raised after a definition deserialises but before the rule is installed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., a time that is not HH:MM).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A range whose lower bound is not below its upper bound.
    #[error("{field} range is empty: {start} is not before {end}")]
    InvalidRange {
        field: String,
        start: String,
        end: String,
    },
}

/// Convenience type alias for registration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience type alias for scoring results.
pub type EvalResult<T> = Result<T, EvalError>;

// =============================================================================
// Unit Tests
// =============================================================================
