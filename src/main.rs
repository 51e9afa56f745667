//! # Order Agent CLI (`order-agent`)
//!
//! Runs one request through the pipeline and exits.
//!
//! ## Usage
//!
//! ```bash
//! order-agent --config ./config/order-agent.toml "something spicy with pork"
//! ```
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | The ranker ran and succeeded (or `--dry-run` finished) |
//! | 1 | Bad usage, bad configuration, or a pipeline stage failed |
//!
//! Diagnostics go to stderr through `tracing`; raise the level with `-v`
//! or `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use order_agent::catalog::load_catalog;
use order_agent::config::resolve_config;
use order_agent::pipeline::{Pipeline, RunOptions};
use order_agent::process::SystemRunner;
use order_agent::report::{ConsoleReporter, NoReport, PipelineReporter};

/// Order Agent: turn a free-text request into ranked catalog matches.
///
/// Settings are read from a TOML file. See
/// `config/order-agent.example.toml` for every key.
#[derive(Parser)]
#[command(name = "order-agent", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/order-agent.toml`; built-in defaults are used
    /// when that file does not exist.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model file, overriding `translator.model_path`.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Stop after filtering and print the ranker payload instead of
    /// running the ranker.
    #[arg(long)]
    dry_run: bool,

    /// Suppress progress lines (query, match counts).
    #[arg(long, short)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// The request, in free text.
    command: String,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_banner(path: Option<&PathBuf>) {
    let Some(path) = path else { return };
    match std::fs::read_to_string(path) {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => tracing::debug!(path = %path.display(), error = %e, "no banner"),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return Ok(if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            });
        }
    };

    init_logging(cli.verbose);
    println!("Received command: {}", cli.command);

    let mut config = resolve_config(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        config.translator.model_path = model;
    }
    print_banner(config.display.banner_path.as_ref());

    let catalog = load_catalog(&config.catalog).context("Failed to load catalog")?;
    let pipeline = Pipeline::new(config, catalog, SystemRunner);

    let reporter: &dyn PipelineReporter = if cli.quiet {
        &NoReport
    } else {
        &ConsoleReporter
    };
    let options = RunOptions {
        dry_run: cli.dry_run,
    };

    match pipeline.run(&cli.command, options, reporter) {
        Ok(_) => {
            println!("\nGoodbye!");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("error [{}]: {}", e.stage(), e);
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}
