//! dtomap CLI - map untyped JSON through declarative field rules.

mod cli;
mod commands;
mod mocks;
mod server;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Map {
            rules,
            input,
            output,
            audit,
            compact,
        } => commands::map::run(rules, input, output, audit, compact, cli.verbose),

        Commands::Check { rules, json } => commands::check::run(rules, json, cli.verbose),

        Commands::Serve { port } => commands::serve::run(port, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
