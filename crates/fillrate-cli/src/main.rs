//! Fillrate CLI - field completeness checks for CSV files.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Check {
            file,
            config,
            fields,
            invalid_values,
            combinations,
            delimiter,
            format,
            save_config,
            quiet,
        } => commands::check::run(commands::check::CheckOptions {
            file,
            config,
            fields,
            invalid_values,
            combinations,
            delimiter,
            format,
            save_config,
            quiet,
        }),

        Commands::Fields { file, delimiter } => commands::fields::run(file, delimiter),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
