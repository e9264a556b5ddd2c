//! Binary entry point for deadends.
//!
//! This binary provides the CLI interface for the deadends error knowledge base.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use deadends::cli::{self, CliResult, OutputFormat, ServeOptions, ServeTransport};
use deadends::observability::{self, InitOptions};
use deadends::{CanonStore, DeadendsConfig, Domain, KnowledgeBase};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Deadends - what not to try when an error shows up, and what works instead.
#[derive(Parser)]
#[command(name = "deadends")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Canon data directory (overrides config and `DEADENDS_DATA_DIR`).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Match an error message against known signatures.
    Lookup {
        /// The error message (words are joined with spaces).
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Keyword search over signatures, summaries and actions.
    Search {
        /// Search query.
        query: String,

        /// Restrict to one domain.
        #[arg(short, long)]
        domain: Option<Domain>,

        /// Maximum results.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print one canon by id.
    Show {
        /// Canon id (`domain/slug/env`).
        id: String,
    },

    /// List domains with error counts.
    Domains {
        /// Include every signature under its domain.
        #[arg(short, long)]
        signatures: bool,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Statistics for one domain.
    Stats {
        /// The domain.
        domain: Domain,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Validate every canon file in the data directory.
    Validate {
        /// Skip the freshness checks on `last_confirmed`.
        #[arg(long)]
        no_freshness: bool,
    },

    /// Run as MCP server.
    Serve {
        /// Transport: stdio or http.
        #[arg(short, long, value_enum, default_value_t = ServeTransport::Stdio)]
        transport: ServeTransport,

        /// HTTP port (only for http transport).
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve even if the corpus has validation errors.
        #[arg(long)]
        skip_validation: bool,
    },

    /// Show where the configuration was loaded from.
    Config {
        /// Print the effective configuration as TOML.
        #[arg(long)]
        show: bool,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match DeadendsConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };
    if let Some(data_dir) = cli.data_dir.clone() {
        config = config.with_data_dir(data_dir);
    }

    let expose_metrics = matches!(cli.command, Commands::Serve { .. });
    let _observability = match observability::init_from_config(
        &config.observability,
        InitOptions {
            verbose: cli.verbose,
            metrics_expose: expose_metrics,
        },
    ) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialize observability: {e}");
            return ExitCode::FAILURE;
        },
    };

    match run_command(cli, config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command. `Ok(false)` means "ran, but found nothing" or
/// "ran, but validation failed".
fn run_command(cli: Cli, config: DeadendsConfig) -> CliResult<bool> {
    tracing::debug!(data_dir = %config.data_dir.display(), "Running command");
    let kb = knowledge_base(&config);

    match cli.command {
        Commands::Lookup { message, format } => cli::cmd_lookup(&kb, &message.join(" "), format),

        Commands::Search {
            query,
            domain,
            limit,
            format,
        } => {
            let limit = limit.unwrap_or(config.search.default_limit);
            cli::cmd_search(&kb, &query, domain, limit, format).map(|()| true)
        },

        Commands::Show { id } => cli::cmd_show(&kb, &id),

        Commands::Domains { signatures, format } => {
            cli::cmd_domains(&kb, signatures, format).map(|()| true)
        },

        Commands::Stats { domain, format } => cli::cmd_stats(&kb, domain, format).map(|()| true),

        Commands::Validate { no_freshness } => {
            let mut validator = config.validator();
            if no_freshness {
                validator = validator.with_freshness(None);
            }
            cli::cmd_validate(&config.data_dir, &validator)
        },

        Commands::Serve {
            transport,
            port,
            skip_validation,
        } => cli::cmd_serve(
            kb,
            &config,
            ServeOptions {
                transport,
                port,
                skip_validation,
            },
        )
        .map(|()| true),

        Commands::Config { show } => cli::cmd_config(&config, show).map(|()| true),
    }
}

fn knowledge_base(config: &DeadendsConfig) -> KnowledgeBase {
    let store = Arc::new(CanonStore::new(config.data_dir.clone()));
    KnowledgeBase::new(store).with_max_search_limit(config.search.max_limit)
}
