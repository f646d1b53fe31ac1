use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod document;
mod staging;
mod store;
mod templates;
mod workflow;

use cli::{Command, RootArgs};

fn main() {
    let args = RootArgs::parse();
    init_tracing(args.command.verbose());
    if let Err(err) = run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: RootArgs) -> Result<()> {
    match args.command {
        Command::Init(args) => workflow::run_init(args),
        Command::Generate(args) => workflow::run_generate(args),
        Command::Verify(args) => workflow::run_verify(args),
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
