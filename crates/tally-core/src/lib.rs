//! # tally-core: Pure Receipt Scoring for Tally
//!
//! This crate is the **heart** of Tally. It turns a receipt into a point
//! score by running it through a registry of configured scoring rules.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/cli (`tally`)                           │   │
//! │  │     rules.toml ──► add_rule_named ──► process ──► stdout       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   rules   │  │ processor │  │   │
//! │  │   │  Receipt  │  │   Money   │  │ RuleKind  │  │ Registry  │  │   │
//! │  │   │   Item    │  │  (cents)  │  │   Rule    │  │  Scoring  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Receipt and item records
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`rules`] - The closed rule catalog and per-kind evaluation
//! - [`processor`] - The rule registry and score summation
//! - [`validation`] - Rule parameter validation
//! - [`error`] - Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use tally_core::{Money, Receipt, RuleKind, RuleProcessor};
//!
//! let processor = RuleProcessor::new();
//! processor
//!     .add_rule(RuleKind::RetailerNameAlpha, r#"{"pointsPerChar": 2}"#)
//!     .unwrap();
//! processor
//!     .add_rule(RuleKind::TotalRoundDollar, r#"{"points": 50}"#)
//!     .unwrap();
//!
//! let purchased = NaiveDate::from_ymd_opt(2022, 1, 2)
//!     .unwrap()
//!     .and_hms_opt(13, 0, 0)
//!     .unwrap();
//! let receipt = Receipt::new("Target", purchased, Money::from_cents(3500), vec![]);
//!
//! // 6 alphanumeric characters × 2 + round dollar bonus
//! assert_eq!(processor.process(&receipt).unwrap(), 62);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod processor;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ConfigError, EvalError, ValidationError};
pub use money::Money;
pub use processor::{Contribution, RuleProcessor, ScoreReport};
pub use rules::{Rule, RuleKind};
pub use types::*;
