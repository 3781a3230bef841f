//! Arbor CLI - inspect hierarchical config trees.
//!
//! Loads a main config file (plus optional includes and secrets files) and
//! exposes lookups, rendered dumps and merge previews on the command line.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::process::ExitCode;

use anyhow::Result;
use arbor_telemetry::prelude::*;
use clap::{Parser, Subcommand};

mod commands;
mod output;
mod sources;

use commands::{lookup, merge, show};
use output::OutputFormat;
use sources::SourceArgs;

/// Arbor - hierarchical configuration lookup
#[derive(Parser)]
#[command(name = "arbor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one value by path
    Lookup {
        /// Slash path, e.g. `db/host` or `/svc/url`
        path: String,

        #[command(flatten)]
        sources: SourceArgs,

        /// Scope to resolve relative paths from
        #[arg(long, default_value = "/")]
        scope: String,

        /// Only inherit when a single trailing component is unresolved
        #[arg(long)]
        simple: bool,

        /// Never inherit from ancestor scopes
        #[arg(long)]
        no_inherit: bool,

        /// Format for nodes and lists
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Print the whole tree
    Show {
        #[command(flatten)]
        sources: SourceArgs,

        /// Expand every macro before printing
        #[arg(long)]
        expand: bool,

        /// Sort keys alphabetically at every level
        #[arg(long)]
        sorted: bool,

        /// Sort keys in reverse order (implies --sorted)
        #[arg(long)]
        reverse: bool,

        /// Print leaf paths instead of the tree
        #[arg(long)]
        paths: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Preview merging OTHER underneath BASE
    Merge {
        /// File whose values win
        base: String,

        /// File that fills in missing keys
        other: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_verbosity(cli.verbose);
    if cli.json_logs {
        log_config = log_config.with_format(LogFormat::Json);
    }
    if let Err(e) = setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        },
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Lookup {
            path,
            sources,
            scope,
            simple,
            no_inherit,
            format,
        } => lookup::run(&lookup::LookupRequest {
            path: &path,
            scope: &scope,
            sources: &sources,
            simple,
            no_inherit,
            format,
        }),
        Commands::Show {
            sources,
            expand,
            sorted,
            reverse,
            paths,
            format,
        } => show::run(&show::ShowRequest {
            sources: &sources,
            expand,
            sorted: sorted || reverse,
            reverse,
            paths,
            format,
        }),
        Commands::Merge {
            base,
            other,
            format,
        } => merge::run(&base, &other, format),
    }
}
