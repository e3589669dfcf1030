//! Curator — bundle the release artifacts of upstream projects.
//!
//! # Usage
//!
//! ```text
//! curator validate [--config <path>]
//! curator plan     [--config <path>] [--package <name>] [--last <n>] [--mirror <dir>] [--json]
//! curator bundle   [--config <path>] [--package <name>] [--last <n>] [--mirror <dir>] --out <dir> [--dry-run]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{bundle::BundleArgs, plan::PlanArgs, validate::ValidateArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "curator",
    version,
    about = "Select, filter and bundle release artifacts of upstream projects",
    long_about = None,
)]
struct Cli {
    /// Log release windows, writes and removals.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the configuration file loads and compiles.
    Validate(ValidateArgs),

    /// Show which releases and artifacts each package would bundle.
    Plan(PlanArgs),

    /// Download and write the bundles.
    Bundle(BundleArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Validate(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Bundle(args) => args.run(),
    }
}
