//! # Rules Module
//!
//! The closed catalog of scoring rules and their evaluation.
//!
//! ## Rule Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  (RuleKind, "{...json...}")                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Rule::parse ── serde_json ──► params struct ── validate() ──► Rule    │
//! │       │                │                            │                   │
//! │       │                └── ConfigError::Malformed   └── ::Invalid       │
//! │       ▼                                                                 │
//! │  Rule::evaluate(&Receipt) ──► i64 contribution                          │
//! │                          └──► EvalError::Overflow                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Catalog
//!
//! | Kind                    | Definition                                  |
//! |-------------------------|---------------------------------------------|
//! | RetailerNameAlpha       | `{"pointsPerChar": 1}`                      |
//! | TotalRoundDollar        | `{"points": 50}`                            |
//! | TotalMultipleOfQuarter  | `{"points": 25}`                            |
//! | ItemCountMultiplier     | `{"multiplier": 5}`                         |
//! | ItemDescriptionLength   | `{"requiredLength": 3, "points": 2}`        |
//! | PurchaseDayOdd          | `{"points": 6}`                             |
//! | PurchaseTimeRange       | `{"start": "14:00", "end": "16:00", "points": 10}` |
//!
//! Adding a kind means adding a `RuleKind` variant, a `Rule` variant and the
//! match arms in `Rule::parse`/`Rule::evaluate`. The compiler points at every
//! place that needs one.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ConfigError, ConfigResult, EvalError, EvalResult, ValidationError};
use crate::types::Receipt;
use crate::validation::{parse_time_of_day, validate_positive, validate_time_range};

// =============================================================================
// Rule Kind
// =============================================================================

/// The closed set of supported rule kinds.
///
/// `Ord` gives the registry a stable evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RuleKind {
    /// Points per alphanumeric character in the store name.
    RetailerNameAlpha,
    /// Flat points when the total has no cents.
    TotalRoundDollar,
    /// Flat points when the total is a multiple of $0.25.
    TotalMultipleOfQuarter,
    /// Points for every two items.
    ItemCountMultiplier,
    /// Points per item whose trimmed description length is a multiple of N.
    ItemDescriptionLength,
    /// Flat points when the purchase day-of-month is odd.
    PurchaseDayOdd,
    /// Flat points when the purchase time falls strictly inside a window.
    PurchaseTimeRange,
}

impl RuleKind {
    /// Every kind in the catalog, in evaluation order.
    pub const ALL: [RuleKind; 7] = [
        RuleKind::RetailerNameAlpha,
        RuleKind::TotalRoundDollar,
        RuleKind::TotalMultipleOfQuarter,
        RuleKind::ItemCountMultiplier,
        RuleKind::ItemDescriptionLength,
        RuleKind::PurchaseDayOdd,
        RuleKind::PurchaseTimeRange,
    ];

    /// Canonical (PascalCase) name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RuleKind::RetailerNameAlpha => "RetailerNameAlpha",
            RuleKind::TotalRoundDollar => "TotalRoundDollar",
            RuleKind::TotalMultipleOfQuarter => "TotalMultipleOfQuarter",
            RuleKind::ItemCountMultiplier => "ItemCountMultiplier",
            RuleKind::ItemDescriptionLength => "ItemDescriptionLength",
            RuleKind::PurchaseDayOdd => "PurchaseDayOdd",
            RuleKind::PurchaseTimeRange => "PurchaseTimeRange",
        }
    }

    /// snake_case name, as used in config files.
    pub const fn snake_name(&self) -> &'static str {
        match self {
            RuleKind::RetailerNameAlpha => "retailer_name_alpha",
            RuleKind::TotalRoundDollar => "total_round_dollar",
            RuleKind::TotalMultipleOfQuarter => "total_multiple_of_quarter",
            RuleKind::ItemCountMultiplier => "item_count_multiplier",
            RuleKind::ItemDescriptionLength => "item_description_length",
            RuleKind::PurchaseDayOdd => "purchase_day_odd",
            RuleKind::PurchaseTimeRange => "purchase_time_range",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name || kind.snake_name() == name)
            .ok_or_else(|| ConfigError::UnsupportedKind {
                kind: name.to_string(),
            })
    }
}

// =============================================================================
// Parameter Schemas
// =============================================================================

/// `RetailerNameAlpha` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PerCharParams {
    pub points_per_char: i64,
}

/// Parameters for the flat-bonus kinds (`TotalRoundDollar`,
/// `TotalMultipleOfQuarter`, `PurchaseDayOdd`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointsParams {
    pub points: i64,
}

/// `ItemCountMultiplier` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiplierParams {
    pub multiplier: i64,
}

/// `ItemDescriptionLength` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DescriptionLengthParams {
    pub required_length: i64,
    pub points: i64,
}

impl DescriptionLengthParams {
    fn validate(self) -> Result<Self, ValidationError> {
        validate_positive("requiredLength", self.required_length)?;
        Ok(self)
    }
}

/// `PurchaseTimeRange` definition as written.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeRangeDefinition {
    #[serde(alias = "startTime")]
    start: String,
    #[serde(alias = "endTime")]
    end: String,
    points: i64,
}

/// `PurchaseTimeRange` parameters with both bounds parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRangeParams {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub points: i64,
}

impl TryFrom<TimeRangeDefinition> for TimeRangeParams {
    type Error = ValidationError;

    fn try_from(def: TimeRangeDefinition) -> Result<Self, Self::Error> {
        let start = parse_time_of_day("start", &def.start)?;
        let end = parse_time_of_day("end", &def.end)?;
        validate_time_range("purchase time", start, end)?;

        Ok(TimeRangeParams {
            start,
            end,
            points: def.points,
        })
    }
}

// =============================================================================
// Rule
// =============================================================================

/// A configured, immutable rule instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    RetailerNameAlpha(PerCharParams),
    TotalRoundDollar(PointsParams),
    TotalMultipleOfQuarter(PointsParams),
    ItemCountMultiplier(MultiplierParams),
    ItemDescriptionLength(DescriptionLengthParams),
    PurchaseDayOdd(PointsParams),
    PurchaseTimeRange(TimeRangeParams),
}

impl Rule {
    /// Parses and validates a JSON definition for `kind`.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::{Rule, RuleKind};
    ///
    /// let rule = Rule::parse(RuleKind::ItemCountMultiplier, r#"{"multiplier": 5}"#).unwrap();
    /// assert_eq!(rule.kind(), RuleKind::ItemCountMultiplier);
    ///
    /// assert!(Rule::parse(RuleKind::ItemDescriptionLength, r#"{"requiredLength": 0, "points": 1}"#).is_err());
    /// ```
    pub fn parse(kind: RuleKind, definition: &str) -> ConfigResult<Rule> {
        let rule = match kind {
            RuleKind::RetailerNameAlpha => Rule::RetailerNameAlpha(from_definition(kind, definition)?),
            RuleKind::TotalRoundDollar => Rule::TotalRoundDollar(from_definition(kind, definition)?),
            RuleKind::TotalMultipleOfQuarter => {
                Rule::TotalMultipleOfQuarter(from_definition(kind, definition)?)
            }
            RuleKind::ItemCountMultiplier => {
                Rule::ItemCountMultiplier(from_definition(kind, definition)?)
            }
            RuleKind::ItemDescriptionLength => {
                let params: DescriptionLengthParams = from_definition(kind, definition)?;
                Rule::ItemDescriptionLength(params.validate().map_err(invalid(kind))?)
            }
            RuleKind::PurchaseDayOdd => Rule::PurchaseDayOdd(from_definition(kind, definition)?),
            RuleKind::PurchaseTimeRange => {
                let def: TimeRangeDefinition = from_definition(kind, definition)?;
                Rule::PurchaseTimeRange(TimeRangeParams::try_from(def).map_err(invalid(kind))?)
            }
        };

        Ok(rule)
    }

    /// The kind this rule was configured as.
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::RetailerNameAlpha(_) => RuleKind::RetailerNameAlpha,
            Rule::TotalRoundDollar(_) => RuleKind::TotalRoundDollar,
            Rule::TotalMultipleOfQuarter(_) => RuleKind::TotalMultipleOfQuarter,
            Rule::ItemCountMultiplier(_) => RuleKind::ItemCountMultiplier,
            Rule::ItemDescriptionLength(_) => RuleKind::ItemDescriptionLength,
            Rule::PurchaseDayOdd(_) => RuleKind::PurchaseDayOdd,
            Rule::PurchaseTimeRange(_) => RuleKind::PurchaseTimeRange,
        }
    }

    /// Computes this rule's contribution for `receipt`.
    ///
    /// Pure: reads the receipt and the stored parameters, nothing else.
    pub fn evaluate(&self, receipt: &Receipt) -> EvalResult<i64> {
        let kind = self.kind();

        match self {
            Rule::RetailerNameAlpha(p) => {
                let alphanumeric = receipt
                    .store_name
                    .chars()
                    .filter(char::is_ascii_alphanumeric)
                    .count();
                scaled(kind, alphanumeric, p.points_per_char)
            }
            Rule::TotalRoundDollar(p) => Ok(bonus(receipt.total().is_multiple_of(100), p.points)),
            Rule::TotalMultipleOfQuarter(p) => {
                Ok(bonus(receipt.total().is_multiple_of(25), p.points))
            }
            Rule::ItemCountMultiplier(p) => scaled(kind, receipt.items.len() / 2, p.multiplier),
            Rule::ItemDescriptionLength(p) => {
                let qualifying = receipt
                    .items
                    .iter()
                    .map(|item| item.description.trim().chars().count())
                    .filter(|&len| is_positive_multiple(len, p.required_length))
                    .count();
                scaled(kind, qualifying, p.points)
            }
            Rule::PurchaseDayOdd(p) => Ok(bonus(receipt.purchase_time.day() % 2 == 1, p.points)),
            Rule::PurchaseTimeRange(p) => {
                let at = receipt.purchase_time.time();
                Ok(bonus(p.start < at && at < p.end, p.points))
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn from_definition<T: DeserializeOwned>(kind: RuleKind, definition: &str) -> ConfigResult<T> {
    serde_json::from_str(definition).map_err(|source| ConfigError::Malformed { kind, source })
}

fn invalid(kind: RuleKind) -> impl Fn(ValidationError) -> ConfigError {
    move |source| ConfigError::Invalid { kind, source }
}

fn bonus(qualifies: bool, points: i64) -> i64 {
    if qualifies {
        points
    } else {
        0
    }
}

/// `count × factor` with overflow reported against `kind`.
fn scaled(kind: RuleKind, count: usize, factor: i64) -> EvalResult<i64> {
    i64::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(factor))
        .ok_or(EvalError::Overflow { kind })
}

fn is_positive_multiple(len: usize, step: i64) -> bool {
    match u64::try_from(step) {
        Ok(step) if step > 0 => len > 0 && (len as u64) % step == 0,
        _ => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::Item;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    fn receipt(store: &str, total_cents: i64, items: Vec<Item>) -> Receipt {
        Receipt::new(store, at(20, 13, 1, 0), Money::from_cents(total_cents), items)
    }

    fn described(descriptions: &[&str]) -> Vec<Item> {
        descriptions
            .iter()
            .enumerate()
            .map(|(i, d)| Item::new(format!("item-{}", i), *d, Money::from_cents(100)))
            .collect()
    }

    fn eval(kind: RuleKind, definition: &str, receipt: &Receipt) -> i64 {
        Rule::parse(kind, definition).unwrap().evaluate(receipt).unwrap()
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in RuleKind::ALL {
            assert_eq!(kind.as_str().parse::<RuleKind>().unwrap(), kind);
            assert_eq!(kind.snake_name().parse::<RuleKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_unknown_kind_names() {
        for name in ["StoreName", "ItemMatch", "", "retailernamealpha"] {
            let err = name.parse::<RuleKind>().unwrap_err();
            assert!(matches!(err, ConfigError::UnsupportedKind { .. }), "{}", name);
        }
    }

    #[test]
    fn test_retailer_name_alpha() {
        let def = r#"{"pointsPerChar": 2}"#;
        assert_eq!(eval(RuleKind::RetailerNameAlpha, def, &receipt("Target", 0, vec![])), 12);
        // "M&M Corner Market": & and spaces are not counted
        assert_eq!(
            eval(RuleKind::RetailerNameAlpha, def, &receipt("M&M Corner Market", 0, vec![])),
            28
        );
        assert_eq!(eval(RuleKind::RetailerNameAlpha, def, &receipt("7-Eleven", 0, vec![])), 14);
        assert_eq!(eval(RuleKind::RetailerNameAlpha, def, &receipt("", 0, vec![])), 0);
    }

    #[test]
    fn test_retailer_name_ignores_non_ascii() {
        let def = r#"{"pointsPerChar": 1}"#;
        assert_eq!(eval(RuleKind::RetailerNameAlpha, def, &receipt("Café", 0, vec![])), 3);
    }

    #[test]
    fn test_total_round_dollar() {
        let def = r#"{"points": 50}"#;
        assert_eq!(eval(RuleKind::TotalRoundDollar, def, &receipt("T", 3500, vec![])), 50);
        assert_eq!(eval(RuleKind::TotalRoundDollar, def, &receipt("T", 3501, vec![])), 0);
        assert_eq!(eval(RuleKind::TotalRoundDollar, def, &receipt("T", 0, vec![])), 50);
    }

    #[test]
    fn test_total_multiple_of_quarter() {
        let def = r#"{"points": 25}"#;
        for cents in [0, 25, 3500, 3525, 3550, 3575] {
            assert_eq!(
                eval(RuleKind::TotalMultipleOfQuarter, def, &receipt("T", cents, vec![])),
                25,
                "{}",
                cents
            );
        }
        for cents in [1, 3535, 3549, 9999] {
            assert_eq!(
                eval(RuleKind::TotalMultipleOfQuarter, def, &receipt("T", cents, vec![])),
                0,
                "{}",
                cents
            );
        }
    }

    #[test]
    fn test_item_count_multiplier() {
        let def = r#"{"multiplier": 5}"#;
        let five = described(&["a", "b", "c", "d", "e"]);
        assert_eq!(eval(RuleKind::ItemCountMultiplier, def, &receipt("T", 0, five)), 10);
        assert_eq!(
            eval(RuleKind::ItemCountMultiplier, def, &receipt("T", 0, described(&["a"]))),
            0
        );
        assert_eq!(eval(RuleKind::ItemCountMultiplier, def, &receipt("T", 0, vec![])), 0);
    }

    #[test]
    fn test_item_description_length() {
        let def = r#"{"requiredLength": 3, "points": 2}"#;
        let items = described(&[
            "   Klarbrunn 12-PK 12 FL OZ  ", // 24 chars trimmed
            "Emils Cheese Pizza",            // 18
            "Mountain Dew 12PK",             // 17
            "   ",                           // 0, not a positive multiple
            "",
        ]);
        assert_eq!(eval(RuleKind::ItemDescriptionLength, def, &receipt("T", 0, items)), 4);
    }

    #[test]
    fn test_item_description_length_counts_characters() {
        let def = r#"{"requiredLength": 4, "points": 3}"#;
        // "Café" is 4 characters but 5 bytes
        let items = described(&["Café", " Crème brûlée ", "Thé"]);
        assert_eq!(eval(RuleKind::ItemDescriptionLength, def, &receipt("T", 0, items)), 6);
    }

    #[test]
    fn test_item_description_length_rejects_zero() {
        let err = Rule::parse(
            RuleKind::ItemDescriptionLength,
            r#"{"requiredLength": 0, "points": 2}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                kind: RuleKind::ItemDescriptionLength,
                source: ValidationError::MustBePositive { .. }
            }
        ));

        assert!(Rule::parse(
            RuleKind::ItemDescriptionLength,
            r#"{"requiredLength": -3, "points": 2}"#
        )
        .is_err());
    }

    #[test]
    fn test_purchase_day_odd() {
        let def = r#"{"points": 6}"#;
        let mut r = receipt("T", 0, vec![]);
        r.purchase_time = at(1, 13, 1, 0);
        assert_eq!(eval(RuleKind::PurchaseDayOdd, def, &r), 6);
        r.purchase_time = at(20, 13, 1, 0);
        assert_eq!(eval(RuleKind::PurchaseDayOdd, def, &r), 0);
        r.purchase_time = at(31, 0, 0, 0);
        assert_eq!(eval(RuleKind::PurchaseDayOdd, def, &r), 6);
    }

    #[test]
    fn test_purchase_time_range_is_exclusive() {
        let def = r#"{"start": "14:00", "end": "16:00", "points": 10}"#;
        let mut r = receipt("T", 0, vec![]);

        let cases = [
            ((13, 59, 59), 0),
            ((14, 0, 0), 0),
            ((14, 0, 1), 10),
            ((14, 0, 45), 10),
            ((15, 59, 59), 10),
            ((14, 1, 0), 10),
            ((15, 59, 0), 10),
            ((16, 0, 0), 0),
            ((16, 1, 0), 0),
        ];
        for ((h, m, s), expected) in cases {
            r.purchase_time = at(20, h, m, s);
            assert_eq!(
                eval(RuleKind::PurchaseTimeRange, def, &r),
                expected,
                "{:02}:{:02}:{:02}",
                h,
                m,
                s
            );
        }
    }

    #[test]
    fn test_purchase_time_range_aliases() {
        let rule = Rule::parse(
            RuleKind::PurchaseTimeRange,
            r#"{"startTime": "09:00", "endTime": "11:30", "points": 3}"#,
        )
        .unwrap();
        assert_eq!(
            rule,
            Rule::PurchaseTimeRange(TimeRangeParams {
                start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
                points: 3,
            })
        );
    }

    #[test]
    fn test_purchase_time_range_validation() {
        let bad = [
            r#"{"start": "2pm", "end": "16:00", "points": 10}"#,
            r#"{"start": "14:00", "end": "24:00", "points": 10}"#,
            r#"{"start": "", "end": "16:00", "points": 10}"#,
            r#"{"start": "16:00", "end": "14:00", "points": 10}"#,
        ];
        for def in bad {
            assert!(matches!(
                Rule::parse(RuleKind::PurchaseTimeRange, def),
                Err(ConfigError::Invalid { .. })
            ));
        }
    }

    #[test]
    fn test_malformed_definitions() {
        let cases = [
            (RuleKind::RetailerNameAlpha, "not json"),
            (RuleKind::RetailerNameAlpha, r#"{"points": 1}"#),
            (RuleKind::TotalRoundDollar, r#"{"points": "fifty"}"#),
            (RuleKind::TotalRoundDollar, r#"{"points": 50, "extra": true}"#),
            (RuleKind::ItemCountMultiplier, r#"{"multiplier": 1.5}"#),
            (RuleKind::PurchaseTimeRange, r#"{"start": "14:00", "points": 10}"#),
        ];
        for (kind, def) in cases {
            match Rule::parse(kind, def) {
                Err(ConfigError::Malformed { kind: k, .. }) => assert_eq!(k, kind),
                other => panic!("{} {}: expected Malformed, got {:?}", kind, def, other),
            }
        }
    }

    #[test]
    fn test_negative_points_are_allowed() {
        let def = r#"{"points": -5}"#;
        assert_eq!(eval(RuleKind::TotalRoundDollar, def, &receipt("T", 100, vec![])), -5);
    }

    #[test]
    fn test_overflow_is_reported() {
        let rule = Rule::parse(
            RuleKind::RetailerNameAlpha,
            &format!(r#"{{"pointsPerChar": {}}}"#, i64::MAX),
        )
        .unwrap();
        assert_eq!(
            rule.evaluate(&receipt("Target", 0, vec![])),
            Err(EvalError::Overflow {
                kind: RuleKind::RetailerNameAlpha
            })
        );
    }
}
