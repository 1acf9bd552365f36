// Sonosift - Query-driven audio source separation
// Module declarations

use clap::Parser;
use std::process::ExitCode;

pub mod audio;
pub mod cli;
pub mod commands;
pub mod config;
pub mod detection;
pub mod pipeline;
pub mod profiles;
pub mod query;
pub mod separation;
pub mod state;

pub use audio::{AudioError, AudioSignal};
pub use config::SeparationConfig;
pub use separation::{SeparationError, SeparationPipeline, SeparationReport, SeparationResult};

/// Parse arguments, install logging and run the requested subcommand
pub fn run() -> ExitCode {
    let cli = cli::Cli::parse();

    // RUST_LOG wins when set
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli::execute(cli.command) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e.message());
            ExitCode::FAILURE
        }
    }
}
