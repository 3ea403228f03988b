//! CLI configuration.
//!
//! Flags fall back to environment variables, and the rule set comes from a
//! TOML file or the built-in defaults.
//!
//! ## Rule File Format
//! ```toml
//! [[rules]]
//! kind = "RetailerNameAlpha"
//! params = { pointsPerChar = 1 }
//!
//! [[rules]]
//! kind = "purchase_time_range"
//! params = { start = "14:00", end = "16:00", points = 10 }
//! ```
//!
//! Each `params` table is re-encoded as JSON and registered through
//! `RuleProcessor::add_rule_named`, the same entry point library callers use.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use tally_core::{RuleKind, RuleProcessor};
use toml::{Table, Value};
use tracing::debug;

/// Environment variable naming the rule file.
pub const ENV_RULES_FILE: &str = "TALLY_RULES_FILE";

/// Environment variable holding the tracing filter directive.
pub const ENV_LOG: &str = "TALLY_LOG";

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "tally", version, about = "Score a receipt against a points rule set")]
pub struct Cli {
    /// Receipt JSON file
    pub receipt: PathBuf,

    /// TOML rule file (built-in rules when omitted)
    #[arg(long, env = ENV_RULES_FILE)]
    pub rules: Option<PathBuf>,

    /// Print each rule's contribution before the total
    #[arg(long)]
    pub breakdown: bool,

    /// Log filter, e.g. "info" or "tally_core=debug"
    #[arg(long, env = ENV_LOG, default_value = "info")]
    pub log: String,
}

// =============================================================================
// Rule File
// =============================================================================

/// A rule set as written in a TOML file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleFile {
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// One `[[rules]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    /// Catalog kind name (PascalCase or snake_case).
    pub kind: String,

    /// Rule parameters, field names as in the JSON definition.
    #[serde(default)]
    pub params: Table,
}

impl RuleEntry {
    fn new(kind: RuleKind, params: &[(&str, Value)]) -> Self {
        RuleEntry {
            kind: kind.to_string(),
            params: params
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        }
    }

    /// The JSON definition handed to the engine.
    pub fn definition(&self) -> Result<String, RuleFileError> {
        serde_json::to_string(&self.params).map_err(|source| RuleFileError::Encode {
            kind: self.kind.clone(),
            source,
        })
    }
}

impl Default for RuleFile {
    fn default() -> Self {
        let int = Value::Integer;
        let text = |s: &str| Value::String(s.to_string());

        Self {
            rules: vec![
                RuleEntry::new(RuleKind::RetailerNameAlpha, &[("pointsPerChar", int(1))]),
                RuleEntry::new(RuleKind::TotalRoundDollar, &[("points", int(50))]),
                RuleEntry::new(RuleKind::TotalMultipleOfQuarter, &[("points", int(25))]),
                RuleEntry::new(RuleKind::ItemCountMultiplier, &[("multiplier", int(5))]),
                RuleEntry::new(
                    RuleKind::ItemDescriptionLength,
                    &[("requiredLength", int(3)), ("points", int(2))],
                ),
                RuleEntry::new(RuleKind::PurchaseDayOdd, &[("points", int(6))]),
                RuleEntry::new(
                    RuleKind::PurchaseTimeRange,
                    &[
                        ("start", text("14:00")),
                        ("end", text("16:00")),
                        ("points", int(10)),
                    ],
                ),
            ],
        }
    }
}

impl RuleFile {
    /// Parses a rule file from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, RuleFileError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a rule file.
    pub fn load(path: &Path) -> Result<Self, RuleFileError> {
        let content = fs::read_to_string(path).map_err(|source| RuleFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Read rule file");
        Self::from_toml_str(&content)
    }

    /// Registers every entry with `processor`, in file order.
    ///
    /// Stops at the first rejected entry; entries before it stay registered.
    /// A later entry of the same kind replaces an earlier one.
    pub fn apply(&self, processor: &RuleProcessor) -> Result<usize, RuleFileError> {
        for (index, entry) in self.rules.iter().enumerate() {
            let definition = entry.definition()?;
            processor
                .add_rule_named(&entry.kind, &definition)
                .map_err(|source| RuleFileError::Rule { index, source })?;
        }

        Ok(self.rules.len())
    }
}

/// Rule file errors.
#[derive(Debug, thiserror::Error)]
pub enum RuleFileError {
    #[error("Failed to read rule file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid rule file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot encode params for {kind}: {source}")]
    Encode {
        kind: String,
        source: serde_json::Error,
    },

    #[error("Rule #{} rejected: {source}", index + 1)]
    Rule {
        index: usize,
        source: tally_core::ConfigError,
    },
}
