// Sound detection
// Collaborators that label the sounds present in a mixed recording

pub mod backend;
pub mod heuristic;

pub use backend::{DetectorBackend, SoundDetector, StaticLabels};
pub use heuristic::{DetectorConfig, HeuristicDetector, LabelScore};
