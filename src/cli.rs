// Command-line front end
// Maps subcommands onto the request-level commands and renders JSON

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandError, CommandResult, SeparateAudioInput};
use crate::config::SeparationConfig;
use crate::detection::DetectorBackend;
use crate::state;

#[derive(Parser)]
#[command(name = "sonosift")]
#[command(about = "Extract sounds from a recording by describing them")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Separate the sounds described by a query from a WAV file
    Separate {
        /// Input WAV file
        input: PathBuf,

        /// What to extract, e.g. "dog barking" or "speech, music"
        #[arg(short, long)]
        query: String,

        /// Label from an external sound detector (repeatable)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// Run the built-in detector when no labels are given
        #[arg(long)]
        detect: bool,

        /// JSON file with separation settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Artifact directory (defaults to the app data directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Append progress to a JSONL trace file
        #[arg(long)]
        trace: Option<PathBuf>,

        /// Report only, write no artifacts
        #[arg(long, conflicts_with = "output_dir")]
        no_write: bool,
    },

    /// Show the targets and profiles a query resolves to
    Parse {
        query: String,
    },

    /// Label the sounds in a WAV file with the built-in detector
    Detect {
        input: PathBuf,
    },

    /// List the sound profile catalog
    Profiles,
}

/// Run one subcommand and return its pretty-printed JSON output
pub fn execute(command: Commands) -> CommandResult<String> {
    match command {
        Commands::Separate {
            input,
            query,
            labels,
            detect,
            config,
            output_dir,
            trace,
            no_write,
        } => {
            let config = match config {
                Some(path) => SeparationConfig::from_json_file(&path)?,
                None => SeparationConfig::default(),
            };
            let detector = if detect {
                DetectorBackend::Heuristic
            } else {
                DetectorBackend::Supplied
            };

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;

            let output = runtime.block_on(async {
                let audio_data = match tokio::fs::read(&input).await {
                    Ok(data) => data,
                    Err(e) => {
                        let message = format!("Failed to read {}: {}", input.display(), e);
                        return Err(CommandError::from(message));
                    }
                };

                commands::separate_audio(SeparateAudioInput {
                    audio_data,
                    mime_type: None,
                    query,
                    detected_labels: labels,
                    detector,
                    config,
                    output_dir,
                    persist: !no_write,
                    trace_path: trace,
                })
                .await
            })?;

            Ok(serde_json::to_string_pretty(&output)?)
        }
        Commands::Parse { query } => {
            let plans = commands::parse_query_command(query)?;
            Ok(serde_json::to_string_pretty(&plans)?)
        }
        Commands::Detect { input } => {
            let audio_data = state::read_file(&input)?;
            Ok(serde_json::to_string_pretty(&commands::detect_sounds(audio_data)?)?)
        }
        Commands::Profiles => {
            Ok(serde_json::to_string_pretty(&commands::list_sound_profiles())?)
        }
    }
}
