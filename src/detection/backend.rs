// Detector backend abstraction
// Labels either come from an external detector or from the built-in heuristic

use serde::{Deserialize, Serialize};

use crate::audio::AudioSignal;
use crate::detection::heuristic::HeuristicDetector;

/// Supplies free-text labels for sounds believed present in a recording
/// No ordering or uniqueness is required of the returned labels
pub trait SoundDetector: Send + Sync {
    fn detect(&self, signal: &AudioSignal) -> Vec<String>;
}

/// Labels produced elsewhere, returned verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticLabels {
    labels: Vec<String>,
}

impl StaticLabels {
    pub fn new(labels: Vec<String>) -> Self {
        StaticLabels { labels }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl SoundDetector for StaticLabels {
    fn detect(&self, _signal: &AudioSignal) -> Vec<String> {
        self.labels.clone()
    }
}

/// Which detector a request should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorBackend {
    /// Only the labels supplied with the request
    #[default]
    Supplied,

    /// Built-in feature rules, used when no labels are supplied
    Heuristic,
}

impl DetectorBackend {
    /// Build the detector for this backend
    /// Supplied labels always take precedence over the heuristic when present
    pub fn build(&self, supplied: Vec<String>) -> Box<dyn SoundDetector> {
        match self {
            DetectorBackend::Heuristic if supplied.is_empty() => Box::new(HeuristicDetector::new()),
            _ => Box::new(StaticLabels::new(supplied)),
        }
    }
}
