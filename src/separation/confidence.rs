// Confidence scoring
// Bounded confidence and a readable description per separated target

use serde::{Deserialize, Serialize};

use crate::profiles::SeparationAlgorithm;
use crate::query::has_direct_match;

/// The scorer never reports full certainty
pub const MAX_CONFIDENCE: f32 = 0.95;

/// Sound classes whose profiles are considered well defined
const WELL_DEFINED_CLASSES: &[&str] = &["speech", "voice", "music", "dog", "bark", "bird", "chirp"];

/// Weights for each confidence component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    /// Starting value for every target
    pub base: f32,

    /// Added when a detected label and the term contain one another
    pub label_match_bonus: f32,

    /// Multiplied by the engine's quality scalar [0, 1]
    pub quality_weight: f32,

    /// Added for well-defined sound classes
    pub well_defined_bonus: f32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        ConfidenceWeights {
            base: 0.45,
            label_match_bonus: 0.25,
            quality_weight: 0.2,
            well_defined_bonus: 0.1,
        }
    }
}

/// Qualitative band of a confidence value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    High,
    Good,
    Moderate,
}

impl QualityTier {
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence > 0.8 {
            QualityTier::High
        } else if confidence > 0.6 {
            QualityTier::Good
        } else {
            QualityTier::Moderate
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::High => "high-quality",
            QualityTier::Good => "good-quality",
            QualityTier::Moderate => "moderate-quality",
        }
    }
}

/// Confidence value plus its description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceReport {
    /// Always within [0.0, 0.95]
    pub confidence: f32,
    pub tier: QualityTier,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    weights: ConfidenceWeights,
}

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ConfidenceWeights) -> Self {
        ConfidenceScorer { weights }
    }

    /// Score a target from its matched labels and optional engine quality
    pub fn score(&self, term: &str, matched_labels: &[String], quality: Option<f32>) -> f32 {
        let mut confidence = self.weights.base;

        if has_direct_match(term, matched_labels) {
            confidence += self.weights.label_match_bonus;
        }

        if let Some(q) = quality {
            if q.is_finite() {
                confidence += self.weights.quality_weight * q.clamp(0.0, 1.0);
            }
        }

        if is_well_defined(term) {
            confidence += self.weights.well_defined_bonus;
        }

        if confidence.is_finite() {
            confidence.clamp(0.0, MAX_CONFIDENCE)
        } else {
            0.0
        }
    }

    /// Score and describe a target
    pub fn report(
        &self,
        term: &str,
        algorithm: SeparationAlgorithm,
        matched_labels: &[String],
        quality: Option<f32>,
    ) -> ConfidenceReport {
        let confidence = self.score(term, matched_labels, quality);
        let tier = QualityTier::from_confidence(confidence);
        let description = format!(
            "{} {} separation of \"{}\" ({:.0}% confidence)",
            capitalize(tier.label()),
            algorithm,
            term,
            confidence * 100.0
        );

        ConfidenceReport {
            confidence,
            tier,
            description,
        }
    }
}

fn is_well_defined(term: &str) -> bool {
    let term = term.to_lowercase();
    WELL_DEFINED_CLASSES.iter().any(|class| term.contains(class))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_match_zero_quality() {
        let scorer = ConfidenceScorer::new();
        let confidence = scorer.score("glass", &[], Some(0.0));
        assert!((confidence - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_bonuses_accumulate_and_clamp() {
        let scorer = ConfidenceScorer::new();
        let all = scorer.score("dog", &labels(&["dog barking"]), Some(1.0));
        assert_eq!(all, MAX_CONFIDENCE);

        let synonym_only = scorer.score("dog", &labels(&["animal"]), None);
        assert!((synonym_only - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_for_any_input() {
        let scorer = ConfidenceScorer::new();
        let label_sets = [labels(&[]), labels(&["speech"]), labels(&["x", "speech", "music"])];
        let qualities = [
            None,
            Some(0.0),
            Some(0.5),
            Some(1.0),
            Some(-4.0),
            Some(9.0),
            Some(f32::NAN),
        ];

        for term in ["speech", "rain", "unknown"] {
            for set in &label_sets {
                for q in qualities {
                    let c = scorer.score(term, set, q);
                    assert!((0.0..=MAX_CONFIDENCE).contains(&c));
                }
            }
        }
    }

    #[test]
    fn test_extreme_weights_still_bounded() {
        let scorer = ConfidenceScorer::with_weights(ConfidenceWeights {
            base: -3.0,
            label_match_bonus: 0.0,
            quality_weight: 0.0,
            well_defined_bonus: 0.0,
        });
        assert_eq!(scorer.score("speech", &[], None), 0.0);
    }

    #[test]
    fn test_tiers() {
        assert_eq!(QualityTier::from_confidence(0.9), QualityTier::High);
        assert_eq!(QualityTier::from_confidence(0.7), QualityTier::Good);
        assert_eq!(QualityTier::from_confidence(0.6), QualityTier::Moderate);
    }

    #[test]
    fn test_report_description() {
        let scorer = ConfidenceScorer::new();
        let report = scorer.report(
            "speech",
            SeparationAlgorithm::Harmonic,
            &labels(&["speech"]),
            Some(0.5),
        );

        assert_eq!(report.tier, QualityTier::High);
        assert!(report.description.starts_with("High-quality harmonic separation"));
        assert!(report.description.contains("\"speech\""));
    }
}
