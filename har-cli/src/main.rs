mod cli;
mod commands;
mod detect;
mod error;
mod input;

use clap::Parser;
use cli::{Cli, Commands};
use error::exit_with_error;

fn init_tracing() {
    // The CLI depends on library crates that emit `tracing` events.
    // Without an installed subscriber, `RUST_LOG=...` has no effect.
    //
    // Default to "off" so we don't change output unless the user opts in
    // via `RUST_LOG` (or other `EnvFilter`-compatible env vars).
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "off".into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    // Disable color when --no-color flag or NO_COLOR env var is set.
    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing();

    if let Err(e) = run(cli) {
        exit_with_error(e);
    }
}

fn run(cli: Cli) -> error::CliResult<()> {
    match cli.command {
        Commands::Read { file } => commands::read::run(&file, cli.verbose, cli.quiet),

        Commands::Convert {
            input,
            output,
            solution,
        } => commands::convert::run(&input, &output, solution, cli.quiet),
    }
}
