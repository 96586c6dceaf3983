//! Maigret Night - desktop front-end for the maigret OSINT tool
//!
//! - Desktop window with option tabs and a live log (default)
//! - Headless `run` streaming maigret's output to stdout
//! - `command` preview and `config` inspection of saved settings

mod cli;
mod core;
mod host;
mod logging;
mod native_ui;
mod settings;

use clap::Parser;
use cli::{exit_codes, AppContext, Cli, Commands};
use host::RunnerError;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.json_output) {
        eprintln!("Failed to initialize logging: {}", e);
        return exit_codes::UNEXPECTED_FAILURE;
    }

    let ctx = match AppContext::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::UNEXPECTED_FAILURE;
        }
    };

    let result = match cli.command {
        None | Some(Commands::Gui) => {
            tracing::debug!("Settings file: {}", ctx.store.path().display());
            native_ui::run(ctx.store.clone(), ctx.runner()).map(|()| exit_codes::SUCCESS)
        }
        Some(Commands::Run(args)) => cli::run::run(&ctx, args),
        Some(Commands::Command(args)) => cli::command::run(&ctx, args).map(|()| exit_codes::SUCCESS),
        Some(Commands::Config(args)) => cli::config::run(&ctx, args).map(|()| exit_codes::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            categorize_error(&e)
        }
    }
}

/// Map an error to the appropriate exit code
fn categorize_error(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<RunnerError>() {
        Some(RunnerError::BinaryNotFound(_)) => exit_codes::BINARY_NOT_FOUND,
        _ => exit_codes::UNEXPECTED_FAILURE,
    }
}
