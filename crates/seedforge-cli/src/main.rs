use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod commands;

use args::{Cli, Command};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if cli.verbose { "debug" } else { "warn" })
        }))
        .with_target(false)
        .init();

    let result = match &cli.command {
        Command::Generate(args) => commands::generate::run(args),
        Command::Graph(args) => commands::graph::run(args),
        Command::Validate(args) => commands::validate::run(args),
        Command::Pattern(args) => commands::pattern::run(args),
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
