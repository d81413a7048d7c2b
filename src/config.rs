//! Command-line configuration.

use crate::types::{AvailabilityOptions, BatchOptions, Result};
use clap::Parser;
use std::collections::HashSet;
use std::io::BufRead;
use std::num::{NonZeroU64, NonZeroUsize};
use std::time::Duration;

/// Validate npm package names and check whether they are available.
#[derive(Parser, Debug, Clone)]
#[command(name = "npm-avail")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Exit codes: 0 when every name is valid (and available), \
                        1 when some name is invalid or unavailable, 2 on usage or execution errors.")]
pub struct Config {
    /// Package names to check (also reads from stdin)
    pub names: Vec<String>,

    /// Only validate names, never query the registry
    #[arg(long, conflicts_with = "full")]
    pub validate: bool,

    /// Show validation warnings, errors and suggestions next to availability
    #[arg(long)]
    pub full: bool,

    /// Registry URL to query instead of the configured one
    #[arg(long, env = "NPM_AVAIL_REGISTRY")]
    pub registry: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, default_value = "10000")]
    pub timeout: NonZeroU64,

    /// Maximum number of registry requests in flight
    #[arg(short, long, default_value = "4")]
    pub concurrency: NonZeroUsize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Quiet mode: print nothing, report through the exit code only
    #[arg(short, long)]
    pub quiet: bool,

    /// Use ASCII symbols instead of Unicode
    #[arg(long, env = "NPM_AVAIL_ASCII", value_parser = clap::builder::FalseyValueParser::new())]
    pub ascii: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What a run does with the names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Validate,
    Check,
    Full,
}

impl Config {
    pub fn mode(&self) -> Mode {
        if self.validate {
            Mode::Validate
        } else if self.full {
            Mode::Full
        } else {
            Mode::Check
        }
    }

    /// Options for single-name checks.
    pub fn availability_options(&self) -> AvailabilityOptions {
        AvailabilityOptions {
            registry_url: self.registry.clone(),
            timeout: Some(Duration::from_millis(self.timeout.get())),
        }
    }

    /// Options for batch checks.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            availability: self.availability_options(),
            concurrency: Some(self.concurrency.get()),
        }
    }

    /// Names from the command line followed by any read from `extra`, trimmed,
    /// without blanks and without duplicates (first occurrence wins).
    pub fn collect_names<R: BufRead>(&self, extra: Option<R>) -> Result<Vec<String>> {
        let mut names = self.names.clone();

        if let Some(reader) = extra {
            for line in reader.lines() {
                names.push(line?);
            }
        }

        let mut seen = HashSet::new();
        Ok(names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .filter(|n| seen.insert(n.clone()))
            .collect())
    }
}
