mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::allocate::AllocateArgs;
use commands::report::{BreakdownArgs, ExportArgs, ReportArgs};
use commands::validate::ValidateArgs;

/// Sales commission splits and reporting
#[derive(Parser)]
#[command(
    name = "commission",
    version,
    about = "Sales commission splits, team totals and CSV export",
    long_about = "Split deal commissions between sales roles with decimal precision. \
                  Validates percentage totals, aggregates per participant and per team, \
                  reports the company's retained share and exports CSV."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Policy file (YAML). Defaults to ./commission.yaml when present
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that allocation percentages sum to at most 100%
    Validate(ValidateArgs),
    /// Split a single deal's net commission
    Allocate(AllocateArgs),
    /// Aggregate a portfolio into per-participant totals and company share
    Report(ReportArgs),
    /// Per-deal breakdown with one column per participant or role
    Breakdown(BreakdownArgs),
    /// Write the Name,Total Commission CSV export
    Export(ExportArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(e: Box<dyn std::error::Error>) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let policy = match config::load_policy(cli.config.as_deref()) {
        Ok(policy) => policy,
        Err(e) => fail(e),
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Validate(args) => commands::validate::run_validate(args, &policy),
        Commands::Allocate(args) => commands::allocate::run_allocate(args, &policy),
        Commands::Report(args) => commands::report::run_report(args, &policy),
        Commands::Breakdown(args) => commands::report::run_breakdown(args, &policy),
        Commands::Export(args) => {
            if let Err(e) = commands::report::run_export(args, &policy) {
                fail(e);
            }
            return;
        }
        Commands::Version => {
            println!("commission {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => fail(e),
    }
}
