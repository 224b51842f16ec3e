//! Verdict CLI - dataset validation front end.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            file,
            rules,
            output,
            format,
            offline,
            fail_on,
            retries,
        } => commands::check::run(
            file,
            rules,
            output,
            format,
            offline,
            fail_on,
            retries,
            cli.verbose,
        ),

        Commands::Rules { headers } => commands::rules::run(headers),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
