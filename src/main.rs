//! KeyLegend - keylayout resolution and legend generation
//!
//! Resolves Apple `.keylayout` files to answer what each key produces and how
//! each dead-key state is reached, and fills KLE charts with the results.

use clap::{Parser, Subcommand};
use keylegend::cli::{CliError, ExitCode, LegendsArgs, PathsArgs, ResolveArgs};
use keylegend::constants::APP_NAME;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// KeyLegend - keylayout resolution and legend generation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show what a key produces on a layer in a state
    Resolve(ResolveArgs),
    /// List the shortest key sequences reaching each dead-key state
    Paths(PathsArgs),
    /// Fill a KLE chart with legends generated from a layout
    Legends(LegendsArgs),
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Resolve(args) => args.execute(config),
        Commands::Paths(args) => args.execute(config),
        Commands::Legends(args) => args.execute(config),
    };

    match result {
        Ok(()) => std::process::exit(ExitCode::Success.code()),
        Err(CliError { exit_code, message }) => {
            eprintln!("Error: {message}");
            std::process::exit(exit_code.code());
        }
    }
}
