// Separation module
// Spectral separation engine, output conditioning, confidence scoring and
// the per-request pipeline tying them together

pub mod conditioner;
pub mod confidence;
pub mod engine;
pub mod error;
pub mod pipeline;

pub use conditioner::{soft_limit, SignalConditioner};
pub use confidence::{
    ConfidenceReport, ConfidenceScorer, ConfidenceWeights, QualityTier, MAX_CONFIDENCE,
};
pub use engine::{ChannelSeparation, EngineError, SeparationOutput, SpectralSeparationEngine};
pub use error::{InputError, SeparationError};
pub use pipeline::{
    artifact_filename, sanitize_filename_part, validate_request, SeparationPipeline,
    SeparationReport, SeparationRequest, SeparationResult, MAX_STEM_BYTES,
};
