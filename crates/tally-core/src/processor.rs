//! # Rule Processor
//!
//! The rule registry: one active rule per kind, summed into a score.
//!
//! ## Thread Safety
//! The registry is wrapped in `RwLock<T>` because:
//! 1. Scoring (`process`) only reads and may run on many threads at once
//! 2. Registration (`add_rule`) writes and must never be observed half-done
//!
//! ## Registry Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Registry Operations                                  │
//! │                                                                         │
//! │  Caller                    Method               Registry Change         │
//! │  ──────                    ──────               ───────────────         │
//! │                                                                         │
//! │  Configure rule ─────────► add_rule() ────────► rules.insert(kind, r)   │
//! │                            (parse outside lock)  (replaces old rule)    │
//! │                                                                         │
//! │  Score receipt ──────────► process() ─────────► (read only)             │
//! │                                                                         │
//! │  Inspect ────────────────► registered_kinds() ► (read only)             │
//! │                                                                         │
//! │  NOTE: A rule that fails to parse never reaches the write lock, so the  │
//! │        previous rule of that kind stays in place.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::error::{ConfigResult, EvalError, EvalResult};
use crate::rules::{Rule, RuleKind};
use crate::types::Receipt;

// =============================================================================
// Score Report
// =============================================================================

/// Points awarded by a single rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Contribution {
    pub kind: RuleKind,
    pub points: i64,
}

/// A score together with the per-rule contributions that make it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreReport {
    pub total: i64,
    /// One entry per registered rule, in evaluation order.
    pub contributions: Vec<Contribution>,
}

// =============================================================================
// Rule Processor
// =============================================================================

/// Holds the active rule set and scores receipts against it.
#[derive(Debug, Default)]
pub struct RuleProcessor {
    rules: RwLock<BTreeMap<RuleKind, Rule>>,
}

impl RuleProcessor {
    /// Creates a processor with no rules (every receipt scores 0).
    pub fn new() -> Self {
        RuleProcessor {
            rules: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registers a rule, replacing any rule already registered for `kind`.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::{RuleKind, RuleProcessor};
    ///
    /// let processor = RuleProcessor::new();
    /// processor.add_rule(RuleKind::PurchaseDayOdd, r#"{"points": 6}"#).unwrap();
    /// assert_eq!(processor.len(), 1);
    ///
    /// // Bad definitions leave the registry alone
    /// assert!(processor.add_rule(RuleKind::PurchaseDayOdd, "{}").is_err());
    /// assert_eq!(processor.len(), 1);
    /// ```
    pub fn add_rule(&self, kind: RuleKind, definition: &str) -> ConfigResult<()> {
        let rule = Rule::parse(kind, definition).map_err(|e| {
            warn!(%kind, error = %e, "Rejected rule definition");
            e
        })?;

        let replaced = self.with_rules_mut(|rules| rules.insert(kind, rule).is_some());
        info!(%kind, replaced, "Rule registered");

        Ok(())
    }

    /// Registers a rule whose kind is given by name.
    ///
    /// Accepts `"RetailerNameAlpha"` or `"retailer_name_alpha"`. Anything
    /// outside the catalog fails with `ConfigError::UnsupportedKind`.
    pub fn add_rule_named(&self, kind: &str, definition: &str) -> ConfigResult<()> {
        let kind = kind.parse::<RuleKind>().map_err(|e| {
            warn!(error = %e, "Rejected rule definition");
            e
        })?;
        self.add_rule(kind, definition)
    }

    /// Scores a receipt: the sum of every registered rule's contribution.
    ///
    /// Fails as a whole if any rule fails; no partial total is returned.
    pub fn process(&self, receipt: &Receipt) -> EvalResult<i64> {
        self.process_detailed(receipt).map(|report| report.total)
    }

    /// Scores a receipt and reports what each rule contributed.
    pub fn process_detailed(&self, receipt: &Receipt) -> EvalResult<ScoreReport> {
        let report = self.with_rules(|rules| -> EvalResult<ScoreReport> {
            let mut total: i64 = 0;
            let mut contributions = Vec::with_capacity(rules.len());

            for (&kind, rule) in rules {
                let points = rule.evaluate(receipt)?;
                debug!(receipt_id = %receipt.id, %kind, points, "Rule evaluated");

                total = total
                    .checked_add(points)
                    .ok_or(EvalError::Overflow { kind })?;
                contributions.push(Contribution { kind, points });
            }

            Ok(ScoreReport {
                total,
                contributions,
            })
        });

        match &report {
            Ok(report) => debug!(
                receipt_id = %receipt.id,
                total = report.total,
                rules = report.contributions.len(),
                "Receipt scored"
            ),
            Err(e) => warn!(receipt_id = %receipt.id, kind = %e.kind(), error = %e, "Scoring failed"),
        }

        report
    }

    /// Kinds with an active rule, in evaluation order.
    pub fn registered_kinds(&self) -> Vec<RuleKind> {
        self.with_rules(|rules| rules.keys().copied().collect())
    }

    /// The active rule for `kind`, if any.
    pub fn rule(&self, kind: RuleKind) -> Option<Rule> {
        self.with_rules(|rules| rules.get(&kind).cloned())
    }

    /// Number of active rules.
    pub fn len(&self) -> usize {
        self.with_rules(|rules| rules.len())
    }

    /// True when no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Executes a function with read access to the registry.
    ///
    /// Writers only ever perform a single `insert`, so the map behind a
    /// poisoned lock is still consistent and is used as-is.
    fn with_rules<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&BTreeMap<RuleKind, Rule>) -> R,
    {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        f(&rules)
    }

    /// Executes a function with write access to the registry.
    fn with_rules_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut BTreeMap<RuleKind, Rule>) -> R,
    {
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut rules)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
