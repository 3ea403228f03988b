//! # tally
//!
//! Scores one receipt file against a rule set.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  rules.toml ──► RuleFile ──► RuleProcessor::add_rule_named (× N)        │
//! │                                     │                                   │
//! │  receipt.json ──► Receipt ──────────┼──► process_detailed ──► stdout    │
//! │                                                                         │
//! │  Logs go to stderr (TALLY_LOG), stdout carries only the score.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tally_core::{Receipt, RuleProcessor};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, RuleFile};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).context("Invalid log filter")?)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let rule_file = match &cli.rules {
        Some(path) => RuleFile::load(path)?,
        None => {
            info!("No rule file given, using built-in rules");
            RuleFile::default()
        }
    };

    let processor = RuleProcessor::new();
    let count = rule_file.apply(&processor)?;
    info!(rules = count, active = processor.len(), "Rule set loaded");

    let receipt = read_receipt(&cli.receipt)?;
    info!(
        receipt_id = %receipt.id,
        store = %receipt.store_name,
        total = %receipt.total(),
        items = receipt.items.len(),
        "Scoring receipt"
    );

    let report = processor
        .process_detailed(&receipt)
        .with_context(|| format!("Failed to score receipt {}", receipt.id))?;

    if cli.breakdown {
        for contribution in &report.contributions {
            println!("{:<24} {:>8}", contribution.kind, contribution.points);
        }
    }
    println!("Points: {}", report.total);

    Ok(())
}

fn read_receipt(path: &Path) -> anyhow::Result<Receipt> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read receipt {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid receipt JSON in {}", path.display()))
}
