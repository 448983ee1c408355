#![deny(missing_docs)]

//! # Paramstyle CLI
//!
//! Command line access to the OpenAPI parameter codec.
//!
//! Supported Commands:
//! - `rules`: Prints the prefix and delimiters for a location, style and shape.
//! - `describe`: Resolves a field tag into a full descriptor.
//! - `decode`: Decodes a raw carrier value.
//! - `encode`: Encodes values into their wire form.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;
use crate::output::OutputFormat;

mod commands;
mod error;
mod output;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI parameter style codec")]
struct Cli {
    /// Output format.
    #[clap(long, global = true, value_enum, env = "PARAMSTYLE_OUTPUT", default_value = "json")]
    output: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the prefix and delimiters for one combination.
    Rules(commands::RulesArgs),
    /// Resolve a field tag and print its descriptor.
    Describe(commands::TargetArgs),
    /// Decode a raw value with a field tag.
    Decode(commands::DecodeArgs),
    /// Encode values with a field tag.
    Encode(commands::EncodeArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> CliResult<String> {
    match &cli.command {
        Commands::Rules(args) => commands::rules(args, cli.output),
        Commands::Describe(args) => commands::describe(args, cli.output),
        Commands::Decode(args) => commands::decode(args, cli.output),
        Commands::Encode(args) => commands::encode(args, cli.output),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = run(&cli).and_then(|out| {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", out.trim_end())?;
        Ok(())
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
