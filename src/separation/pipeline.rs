// Separation pipeline
// Orchestrates one request: validate, decode, parse, then separate each target in order

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::audio::{decode_wav, encode_wav_channels, AudioSignal, WavChannels};
use crate::config::SeparationConfig;
use crate::detection::SoundDetector;
use crate::pipeline::ProgressTracker;
use crate::profiles::{lookup_profile, profile_name, SeparationAlgorithm};
use crate::query::{match_detected_labels, matched_labels_for, parse_query, SoundTarget};
use crate::separation::conditioner::SignalConditioner;
use crate::separation::confidence::{ConfidenceScorer, QualityTier};
use crate::separation::engine::SpectralSeparationEngine;
use crate::separation::error::{InputError, SeparationError};

const DECODE_PROGRESS: f32 = 0.05;
const QUERY_PROGRESS: f32 = 0.1;

/// One extracted target
#[derive(Debug, Clone, Serialize)]
pub struct SeparationResult {
    pub target: SoundTarget,

    /// Catalog entry used for this target ("default" when none matched)
    pub profile: String,
    pub algorithm: SeparationAlgorithm,

    /// Conditioned output, same shape as the input signal
    #[serde(skip)]
    pub signal: AudioSignal,

    /// Encoded PCM WAV artifact
    #[serde(skip)]
    pub wav_bytes: Vec<u8>,

    /// Suggested download name
    pub filename: String,

    /// [0.0, 0.95]
    pub confidence: f32,
    pub tier: QualityTier,
    pub description: String,

    /// Detected labels related to this target
    pub matched_labels: Vec<String>,

    /// Peak level of the extracted signal [0.0, 1.0]
    pub signal_strength: f32,

    /// Share of frame energy inside the target band [0.0, 1.0]
    pub quality: f32,
}

/// Everything produced for one request
#[derive(Debug, Clone, Serialize)]
pub struct SeparationReport {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub query: String,
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_ms: i64,

    /// Labels supplied by the detector
    pub detected_labels: Vec<String>,

    /// Detected labels related to any target
    pub matched_labels: Vec<String>,

    /// In target extraction order
    pub results: Vec<SeparationResult>,
}

/// Raw request as received from a caller
#[derive(Debug, Clone, Copy)]
pub struct SeparationRequest<'a> {
    pub audio_data: &'a [u8],

    /// MIME type reported by the uploader, if any
    pub mime_type: Option<&'a str>,

    pub query: &'a str,
}

/// Reject a request before any processing starts
pub fn validate_request(request: &SeparationRequest) -> Result<(), InputError> {
    if request.audio_data.is_empty() {
        return Err(InputError::MissingAudio);
    }

    if let Some(mime) = request.mime_type {
        if !mime.trim().to_ascii_lowercase().starts_with("audio/") {
            return Err(InputError::NotAudio(mime.to_string()));
        }
    }

    if request.query.trim().is_empty() {
        return Err(InputError::EmptyQuery);
    }

    Ok(())
}

/// Lowercase, collapse every non-alphanumeric run into `_`, trim `_`
pub fn sanitize_filename_part(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(c);
        } else {
            pending_separator = true;
        }
    }

    out
}

/// Longest sanitized stem kept in an artifact name, in bytes
pub const MAX_STEM_BYTES: usize = 64;

/// Download name for a target's artifact
/// A single-target query is named after the whole query, otherwise after the term;
/// stems longer than [`MAX_STEM_BYTES`] are cut short
pub fn artifact_filename(query: &str, term: &str, target_count: usize) -> String {
    let from_query = if target_count == 1 {
        sanitize_filename_part(query)
    } else {
        String::new()
    };

    let stem = if !from_query.is_empty() {
        from_query
    } else {
        sanitize_filename_part(term)
    };

    let stem = truncate_stem(&stem, MAX_STEM_BYTES);
    if stem.is_empty() {
        "extracted_sound.wav".to_string()
    } else {
        format!("extracted_{}.wav", stem)
    }
}

/// Cut to at most `max_bytes` on a char boundary, dropping a dangling `_`
fn truncate_stem(stem: &str, max_bytes: usize) -> &str {
    if stem.len() <= max_bytes {
        return stem;
    }
    let end = stem
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    stem[..end].trim_end_matches('_')
}

pub struct SeparationPipeline {
    engine: SpectralSeparationEngine,
    conditioner: SignalConditioner,
    scorer: ConfidenceScorer,
    wav_channels: WavChannels,
    cancel: Option<Arc<AtomicBool>>,
}

impl SeparationPipeline {
    pub fn new(config: &SeparationConfig) -> Result<Self, SeparationError> {
        config
            .validate()
            .map_err(|e| SeparationError::Processing(e.to_string()))?;
        let engine = SpectralSeparationEngine::new(config)
            .map_err(|e| SeparationError::Processing(e.to_string()))?;

        Ok(SeparationPipeline {
            engine,
            conditioner: SignalConditioner::new(config),
            scorer: ConfidenceScorer::new(),
            wav_channels: config.wav_channels,
            cancel: None,
        })
    }

    /// Stop between targets once `flag` is set; partial results are discarded
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Run a complete request from raw upload bytes
    pub fn run(
        &self,
        request: &SeparationRequest,
        detector: &dyn SoundDetector,
        progress: &mut ProgressTracker,
    ) -> Result<SeparationReport, SeparationError> {
        validate_request(request)?;

        let signal = decode_wav(request.audio_data)?;
        if signal.is_empty() {
            return Err(InputError::EmptySignal.into());
        }
        progress.report(
            "decode",
            DECODE_PROGRESS,
            format!(
                "Decoded {} channel(s) at {} Hz, {} ms",
                signal.channel_count(),
                signal.sample_rate(),
                signal.duration_ms()
            ),
        );

        let detected_labels = detector.detect(&signal);
        self.separate(&signal, request.query, detected_labels, progress)
    }

    /// Run a request against an already decoded signal
    pub fn separate(
        &self,
        signal: &AudioSignal,
        query: &str,
        detected_labels: Vec<String>,
        progress: &mut ProgressTracker,
    ) -> Result<SeparationReport, SeparationError> {
        let results = self.separate_targets(signal, query, &detected_labels, progress)?;
        let targets: Vec<SoundTarget> = results.iter().map(|r| r.target.clone()).collect();

        Ok(SeparationReport {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            query: query.to_string(),
            sample_rate: signal.sample_rate(),
            channels: signal.channel_count(),
            duration_ms: signal.duration_ms(),
            matched_labels: match_detected_labels(&targets, &detected_labels),
            detected_labels,
            results,
        })
    }

    /// Separate every target of `query` from `signal`, strictly in target order
    /// Any failure aborts the whole batch
    pub fn separate_targets(
        &self,
        signal: &AudioSignal,
        query: &str,
        detected_labels: &[String],
        progress: &mut ProgressTracker,
    ) -> Result<Vec<SeparationResult>, SeparationError> {
        if query.trim().is_empty() {
            return Err(InputError::EmptyQuery.into());
        }
        if signal.is_empty() {
            return Err(InputError::EmptySignal.into());
        }

        let targets = parse_query(query);
        if targets.is_empty() {
            return Err(InputError::NoTargets(query.to_string()).into());
        }

        let terms: Vec<&str> = targets.iter().map(|t| t.term.as_str()).collect();
        log::info!("Query \"{}\" resolved to {} target(s): {:?}", query, targets.len(), terms);
        progress.report_with_data(
            "query",
            QUERY_PROGRESS,
            format!("Parsed {} target(s)", targets.len()),
            serde_json::json!({ "targets": terms }),
        );

        let mut results = Vec::with_capacity(targets.len());
        for (i, target) in targets.iter().enumerate() {
            self.check_cancelled()?;

            let result =
                self.separate_target(signal, query, target, targets.len(), detected_labels)?;

            let done =
                QUERY_PROGRESS + (1.0 - QUERY_PROGRESS) * (i + 1) as f32 / targets.len() as f32;
            progress.report_with_data(
                "separation",
                done,
                format!("Extracted \"{}\"", result.target.term),
                serde_json::json!({
                    "term": result.target.term,
                    "profile": result.profile,
                    "confidence": result.confidence,
                    "filename": result.filename,
                }),
            );
            results.push(result);
        }

        Ok(results)
    }

    fn separate_target(
        &self,
        signal: &AudioSignal,
        query: &str,
        target: &SoundTarget,
        target_count: usize,
        detected_labels: &[String],
    ) -> Result<SeparationResult, SeparationError> {
        let term = target.term.as_str();

        let profile = lookup_profile(term);
        let processing = |e: &dyn std::fmt::Display| {
            SeparationError::Processing(format!("\"{}\": {}", term, e))
        };

        let separated = self.engine.separate(signal, &profile).map_err(|e| processing(&e))?;
        let conditioned = self.conditioner.condition(&separated.signal, profile.gain);
        let wav_bytes =
            encode_wav_channels(&conditioned, self.wav_channels).map_err(|e| processing(&e))?;

        let matched_labels = matched_labels_for(term, detected_labels);
        let report = self
            .scorer
            .report(term, profile.algorithm, &matched_labels, Some(separated.quality));

        log::info!(
            "Separated \"{}\" with {} profile ({}), quality {:.2}, confidence {:.2}",
            term,
            profile_name(term),
            profile.algorithm,
            separated.quality,
            report.confidence
        );

        Ok(SeparationResult {
            target: target.clone(),
            profile: profile_name(term).to_string(),
            algorithm: profile.algorithm,
            signal_strength: conditioned.peak().clamp(0.0, 1.0),
            signal: conditioned,
            wav_bytes,
            filename: artifact_filename(query, term, target_count),
            confidence: report.confidence,
            tier: report.tier,
            description: report.description,
            matched_labels,
            quality: separated.quality,
        })
    }

    fn check_cancelled(&self) -> Result<(), SeparationError> {
        match self.cancel {
            Some(ref flag) if flag.load(Ordering::Relaxed) => Err(SeparationError::Cancelled),
            _ => Ok(()),
        }
    }
}
