//! npm-avail - npm package name validation and availability checker.
//!
//! CLI entry point.

use clap::Parser;
use npm_avail::config::Mode;
use npm_avail::notify::console::ValidationReport;
use npm_avail::notify::ConsoleOutput;
use npm_avail::{check_many, validate, Config, NpmChecker};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Set up logging
    let default_filter = if config.verbose {
        "npm_avail=debug,info"
    } else {
        "npm_avail=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let piped = (!stdin.is_terminal()).then(|| stdin.lock());
    let names = match config.collect_names(piped) {
        Ok(names) => names,
        Err(e) => {
            error!("Failed to read names from stdin: {}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if names.is_empty() {
        eprintln!("error: no package names provided");
        eprintln!("usage: npm-avail [OPTIONS] [NAMES...]");
        return ExitCode::from(EXIT_USAGE);
    }

    let console = ConsoleOutput::new(config.json, config.quiet, config.ascii);

    let all_ok = match config.mode() {
        Mode::Validate => run_validate(&names, &console),
        Mode::Check | Mode::Full => match run_check(&names, &config, &console).await {
            Ok(all_ok) => all_ok,
            Err(code) => return code,
        },
    };

    if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn run_validate(names: &[String], console: &ConsoleOutput) -> bool {
    let results: Vec<_> = names.iter().map(|name| (name, validate(name))).collect();

    let reports: Vec<ValidationReport<'_>> = results
        .iter()
        .map(|(name, validation)| ValidationReport { name, validation })
        .collect();
    console.print_json(&reports);

    for (name, validation) in &results {
        console.print_validation(name, validation);
    }

    results.iter().all(|(_, v)| v.valid_for_new_packages)
}

async fn run_check(
    names: &[String],
    config: &Config,
    console: &ConsoleOutput,
) -> Result<bool, ExitCode> {
    let checker = match NpmChecker::new() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create registry client: {}", e);
            return Err(ExitCode::from(EXIT_USAGE));
        }
    };

    let results = match check_many(&checker, names, &config.batch_options()).await {
        Ok(results) => results,
        Err(e) => {
            error!("Check failed: {}", e);
            return Err(ExitCode::from(EXIT_USAGE));
        }
    };

    console.print_json(&results);
    for result in &results {
        console.print_check(result, config.mode() == Mode::Full);
    }

    Ok(results.iter().all(|r| r.is_ok()))
}
