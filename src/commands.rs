// Request-level commands
// Serializable inputs/outputs shared by the CLI and any embedding front end
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::audio::decode_wav;
use crate::config::SeparationConfig;
use crate::detection::{DetectorBackend, HeuristicDetector, SoundDetector};
use crate::pipeline::{ProgressTracker, TraceEntry, TraceWriter};
use crate::profiles::{
    list_profiles, lookup_profile, profile_name, ProfileSummary, SeparationProfile,
};
use crate::query::{parse_query, SoundTarget};
use crate::separation::{InputError, SeparationPipeline, SeparationReport, SeparationRequest};
use crate::state::{self, StoredArtifact};

#[derive(Debug, Serialize)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<E: std::fmt::Display> From<E> for CommandError {
    fn from(error: E) -> Self {
        CommandError {
            message: error.to_string(),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

// ==================== SEPARATION ====================

#[derive(Debug, Deserialize)]
pub struct SeparateAudioInput {
    pub audio_data: Vec<u8>,

    /// MIME type reported by the uploader; unchecked when absent
    #[serde(default)]
    pub mime_type: Option<String>,

    pub query: String,

    /// Labels from an external sound detector
    #[serde(default)]
    pub detected_labels: Vec<String>,

    #[serde(default)]
    pub detector: DetectorBackend,

    #[serde(default)]
    pub config: SeparationConfig,

    /// Where to write artifacts; the run's data directory when `persist` is set
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub persist: bool,

    /// Append progress entries to this JSONL file
    #[serde(default)]
    pub trace_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct SeparateAudioOutput {
    pub report: SeparationReport,

    /// Files written for this run, empty when nothing was persisted
    pub artifacts: Vec<StoredArtifact>,

    pub progress: Vec<TraceEntry>,
}

/// Separate every target of a query from an uploaded recording
pub async fn separate_audio(input: SeparateAudioInput) -> CommandResult<SeparateAudioOutput> {
    tokio::task::spawn_blocking(move || run_separation(input))
        .await
        .map_err(|e| CommandError {
            message: format!("Separation task failed: {}", e),
        })?
}

fn run_separation(input: SeparateAudioInput) -> CommandResult<SeparateAudioOutput> {
    let pipeline = SeparationPipeline::new(&input.config)?;
    let detector = input.detector.build(input.detected_labels);

    let mut progress = match input.trace_path {
        Some(path) => ProgressTracker::with_writer(TraceWriter::new(path)),
        None => ProgressTracker::new(),
    };

    let request = SeparationRequest {
        audio_data: &input.audio_data,
        mime_type: input.mime_type.as_deref(),
        query: &input.query,
    };

    log::info!(
        "Separating \"{}\" from {} bytes of audio",
        input.query,
        input.audio_data.len()
    );

    let report = pipeline.run(&request, detector.as_ref(), &mut progress)?;

    let output_dir = match input.output_dir {
        Some(dir) => Some(dir),
        None if input.persist => Some(state::get_run_dir(&report.run_id)?),
        None => None,
    };

    let mut artifacts = Vec::new();
    if let Some(dir) = output_dir {
        let mut used = HashSet::new();
        for result in &report.results {
            let filename = unique_filename(&result.filename, &mut used);
            artifacts.push(state::store_artifact(&dir, &filename, &result.wav_bytes)?);
        }
        artifacts.push(state::store_json(&dir, "report.json", &report)?);
        log::info!("Stored {} artifact(s) in {}", artifacts.len(), dir.display());
    }

    Ok(SeparateAudioOutput {
        report,
        artifacts,
        progress: progress.into_entries(),
    })
}

/// Disambiguate artifact names that sanitize to the same file
fn unique_filename(filename: &str, used: &mut HashSet<String>) -> String {
    if used.insert(filename.to_string()) {
        return filename.to_string();
    }

    let stem = filename.strip_suffix(".wav").unwrap_or(filename);
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}.wav", stem, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

// ==================== QUERY ====================

#[derive(Debug, Serialize)]
pub struct TargetPlan {
    pub target: SoundTarget,
    pub profile_name: String,
    pub profile: SeparationProfile,
}

/// Show how a query would be separated without touching any audio
pub fn parse_query_command(query: String) -> CommandResult<Vec<TargetPlan>> {
    if query.trim().is_empty() {
        return Err(InputError::EmptyQuery.into());
    }

    let targets = parse_query(&query);
    if targets.is_empty() {
        return Err(InputError::NoTargets(query).into());
    }

    Ok(targets
        .into_iter()
        .map(|target| TargetPlan {
            profile_name: profile_name(&target.term).to_string(),
            profile: lookup_profile(&target.term),
            target,
        })
        .collect())
}

// ==================== DETECTION ====================

/// Label an uploaded recording with the built-in heuristic detector
pub fn detect_sounds(audio_data: Vec<u8>) -> CommandResult<Vec<String>> {
    if audio_data.is_empty() {
        return Err(InputError::MissingAudio.into());
    }

    let signal = decode_wav(&audio_data)?;
    if signal.is_empty() {
        return Err(InputError::EmptySignal.into());
    }

    Ok(HeuristicDetector::new().detect(&signal))
}

// ==================== PROFILES ====================

pub fn list_sound_profiles() -> Vec<ProfileSummary> {
    list_profiles()
}
