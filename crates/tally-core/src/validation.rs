//! # Validation Module
//!
//! Parameter validation for rule definitions.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Registration Layers                                │
//! │                                                                         │
//! │  Layer 1: serde_json                                                   │
//! │  ├── Definition is JSON                                                │
//! │  └── Field names and types match the kind's schema                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── requiredLength > 0                                                │
//! │  └── start/end are HH:MM and start < end                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Registry                                                     │
//! │  └── Only fully validated rules are ever installed                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveTime;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Format accepted for time-of-day parameters.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that a parameter is strictly positive.
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_positive;
///
/// assert!(validate_positive("requiredLength", 3).is_ok());
/// assert!(validate_positive("requiredLength", 0).is_err());
/// ```
pub fn validate_positive(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Time Validators
// =============================================================================

/// Parses an `HH:MM` time-of-day parameter.
///
/// ## Rules
/// - Must not be empty
/// - Must be a 24-hour `HH:MM` time (seconds are not accepted)
///
/// ## Example
/// ```rust
/// use tally_core::validation::parse_time_of_day;
///
/// assert!(parse_time_of_day("start", "14:00").is_ok());
/// assert!(parse_time_of_day("start", "2pm").is_err());
/// ```
pub fn parse_time_of_day(field: &str, value: &str) -> ValidationResult<NaiveTime> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    NaiveTime::parse_from_str(value, TIME_OF_DAY_FORMAT).map_err(|e| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("expected HH:MM ({})", e),
        }
    })
}

/// Validates that `start` comes strictly before `end`.
///
/// An exclusive range with `start >= end` can never match, so it is rejected
/// rather than silently scoring zero forever.
pub fn validate_time_range(field: &str, start: NaiveTime, end: NaiveTime) -> ValidationResult<()> {
    if start >= end {
        return Err(ValidationError::InvalidRange {
            field: field.to_string(),
            start: start.format(TIME_OF_DAY_FORMAT).to_string(),
            end: end.format(TIME_OF_DAY_FORMAT).to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
