//! CLI argument parsing for the metadata generator.
//!
//! The CLI stays thin: every operational parameter lives in the config file
//! so a scheduled run is reproducible from the config alone.
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "hmeta",
    version,
    about = "Harvester metadata generator for daily published datasets",
    after_help = "Commands:\n  init --config <file>      Write a config stub\n  generate --config <file>  Merge today's resource and write document + checksum\n  verify --config <file>    Re-hash the document and compare with the checksum\n\nExamples:\n  hmeta init --config deploy/hmeta.json --owner-id 9543cc89-477f-4e21-b865-2aef92679a20\n  hmeta generate --config deploy/hmeta.json\n  hmeta generate --config deploy/hmeta.json --date 2025-01-01\n  hmeta verify --config deploy/hmeta.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    Generate(GenerateArgs),
    Verify(VerifyArgs),
}

/// Init command inputs for writing a config stub.
#[derive(Parser, Debug)]
#[command(about = "Write a config stub for a new deployment")]
pub struct InitArgs {
    /// Path of the config file to create
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Owner display name to prefill
    #[arg(long, value_name = "NAME")]
    pub owner_name: Option<String>,

    /// Owner stable identifier to prefill
    #[arg(long, value_name = "ID")]
    pub owner_id: Option<String>,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

/// Generate command inputs for one scheduled run.
#[derive(Parser, Debug)]
#[command(about = "Merge today's resource into history and write document + checksum")]
pub struct GenerateArgs {
    /// Path to the config file
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Publication date to use instead of the local date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Emit debug logging
    #[arg(long)]
    pub verbose: bool,
}

/// Verify command inputs.
#[derive(Parser, Debug)]
#[command(about = "Check that the checksum artifact matches the document")]
pub struct VerifyArgs {
    /// Path to the config file
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,
}

impl Command {
    pub fn verbose(&self) -> bool {
        match self {
            Command::Generate(args) => args.verbose,
            Command::Init(_) | Command::Verify(_) => false,
        }
    }
}
