// Heuristic (rule-based) sound detector
// Labels a recording from averaged spectral features of its mono mixdown

use serde::Serialize;

use crate::audio::{average_features, AudioSignal, SpectralFeatures};
use crate::detection::backend::SoundDetector;

/// A candidate label and its rule score [0.0, 1.0]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelScore {
    pub label: &'static str,
    pub score: f32,
}

/// Feature weights and thresholds for the detector
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Weight for spectral centroid rules
    pub centroid_weight: f32,

    /// Weight for zero-crossing rate rules
    pub zcr_weight: f32,

    /// Weight for band energy ratio rules
    pub energy_weight: f32,

    /// Labels scoring below this are not emitted
    pub min_score: f32,

    /// Mixdowns quieter than this RMS are reported as silence
    pub silence_rms: f32,

    pub window_size: usize,
    pub hop_size: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            centroid_weight: 1.0,
            zcr_weight: 1.0,
            energy_weight: 1.5, // Band ratios separate the classes best
            min_score: 0.6,
            silence_rms: 1e-4,
            window_size: 2048,
            hop_size: 1024,
        }
    }
}

pub struct HeuristicDetector {
    config: DetectorConfig,
}

impl HeuristicDetector {
    pub fn new() -> Self {
        HeuristicDetector {
            config: DetectorConfig::default(),
        }
    }

    /// Score every label for a set of features, best first
    pub fn score_all(&self, f: &SpectralFeatures) -> Vec<LabelScore> {
        let mut scores = vec![
            LabelScore {
                label: "speech",
                score: self.score_speech(f),
            },
            LabelScore {
                label: "music",
                score: self.score_music(f),
            },
            LabelScore {
                label: "noise",
                score: self.score_noise(f),
            },
            LabelScore {
                label: "bass",
                score: self.score_bass(f),
            },
        ];
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        scores
    }

    /// Labels for a set of features
    pub fn labels_for(&self, f: &SpectralFeatures) -> Vec<String> {
        if !f.rms.is_finite() || f.rms < self.config.silence_rms {
            return vec!["silence".to_string()];
        }

        self.score_all(f)
            .into_iter()
            .filter(|s| s.score >= self.config.min_score)
            .map(|s| s.label.to_string())
            .collect()
    }

    fn weighted(&self, centroid: f32, zcr: f32, energy: f32) -> f32 {
        let c = &self.config;
        let total = c.centroid_weight + c.zcr_weight + c.energy_weight;
        if total <= 0.0 {
            return 0.0;
        }
        (centroid * c.centroid_weight + zcr * c.zcr_weight + energy * c.energy_weight) / total
    }

    /// Voice: centroid in the formant region, mostly mid-band energy, moderate ZCR
    fn score_speech(&self, f: &SpectralFeatures) -> f32 {
        let centroid = if (300.0..3000.0).contains(&f.spectral_centroid) {
            1.0
        } else if (3000.0..4000.0).contains(&f.spectral_centroid) {
            0.6
        } else {
            0.2
        };

        let zcr = if (0.02..0.2).contains(&f.zcr) { 1.0 } else { 0.4 };

        let energy = if f.mid_band_energy > 0.5 {
            1.0
        } else if f.mid_band_energy > 0.3 {
            0.6
        } else {
            0.2
        };

        self.weighted(centroid, zcr, energy)
    }

    /// Music: energy spread over all three bands, tonal (low ZCR)
    fn score_music(&self, f: &SpectralFeatures) -> f32 {
        let third = 1.0 / 3.0;
        let imbalance = (f.low_band_energy - third).abs()
            + (f.mid_band_energy - third).abs()
            + (f.high_band_energy - third).abs();
        let energy = (1.0 - imbalance).clamp(0.0, 1.0);

        let zcr = if f.zcr < 0.15 { 1.0 } else { 0.4 };

        let centroid = if (200.0..5000.0).contains(&f.spectral_centroid) {
            1.0
        } else {
            0.5
        };

        self.weighted(centroid, zcr, energy)
    }

    /// Broadband noise: high ZCR, energy and centroid high in the spectrum
    fn score_noise(&self, f: &SpectralFeatures) -> f32 {
        let zcr = if f.zcr > 0.3 {
            1.0
        } else if f.zcr > 0.2 {
            0.7
        } else {
            0.2
        };

        let energy = if f.high_band_energy > 0.5 {
            1.0
        } else if f.high_band_energy > 0.3 {
            0.6
        } else {
            0.2
        };

        let centroid = if f.spectral_centroid > 3000.0 {
            1.0
        } else if f.spectral_centroid > 2000.0 {
            0.6
        } else {
            0.2
        };

        self.weighted(centroid, zcr, energy)
    }

    /// Bass: low centroid, energy below 200 Hz, very low ZCR
    fn score_bass(&self, f: &SpectralFeatures) -> f32 {
        let energy = if f.low_band_energy > 0.6 {
            1.0
        } else if f.low_band_energy > 0.4 {
            0.7
        } else {
            0.1
        };

        let centroid = if f.spectral_centroid < 300.0 {
            1.0
        } else if f.spectral_centroid < 600.0 {
            0.6
        } else {
            0.1
        };

        let zcr = if f.zcr < 0.05 {
            1.0
        } else if f.zcr < 0.1 {
            0.6
        } else {
            0.1
        };

        self.weighted(centroid, zcr, energy)
    }
}

impl Default for HeuristicDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundDetector for HeuristicDetector {
    fn detect(&self, signal: &AudioSignal) -> Vec<String> {
        let mono = signal.to_mono();
        let features = average_features(
            &mono,
            signal.sample_rate(),
            self.config.window_size,
            self.config.hop_size,
        );
        let labels = self.labels_for(&features);

        log::debug!(
            "Heuristic detection: centroid={:.0}Hz zcr={:.3} bands=({:.2}, {:.2}, {:.2}) -> {:?}",
            features.spectral_centroid,
            features.zcr,
            features.low_band_energy,
            features.mid_band_energy,
            features.high_band_energy,
            labels
        );

        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const SAMPLE_RATE: u32 = 44100;

    fn sine(freq: f32, seconds: f32) -> AudioSignal {
        let n = (SAMPLE_RATE as f32 * seconds) as usize;
        let samples = (0..n)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / SAMPLE_RATE as f32).sin())
            .collect();
        AudioSignal::mono(SAMPLE_RATE, samples).unwrap()
    }

    fn white_noise(seconds: f32) -> AudioSignal {
        let n = (SAMPLE_RATE as f32 * seconds) as usize;
        let mut state: u32 = 0x1234_5678;
        let samples = (0..n)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 8) as f32 / (1u32 << 24) as f32 - 0.5
            })
            .collect();
        AudioSignal::mono(SAMPLE_RATE, samples).unwrap()
    }

    #[test]
    fn test_silence() {
        let signal = AudioSignal::mono(SAMPLE_RATE, vec![0.0; 8192]).unwrap();
        assert_eq!(HeuristicDetector::new().detect(&signal), vec!["silence"]);
    }

    #[test]
    fn test_low_tone_is_bass() {
        let labels = HeuristicDetector::new().detect(&sine(80.0, 0.5));
        assert_eq!(labels.first().map(String::as_str), Some("bass"));
        assert!(!labels.contains(&"noise".to_string()));
    }

    #[test]
    fn test_white_noise_is_noise() {
        let labels = HeuristicDetector::new().detect(&white_noise(0.5));
        assert_eq!(labels.first().map(String::as_str), Some("noise"));
        assert!(!labels.contains(&"bass".to_string()));
    }

    #[test]
    fn test_scores_sorted_and_bounded() {
        let detector = HeuristicDetector::new();
        let features = SpectralFeatures {
            spectral_centroid: 1200.0,
            zcr: 0.08,
            low_band_energy: 0.2,
            mid_band_energy: 0.6,
            high_band_energy: 0.2,
            rms: 0.1,
        };

        let scores = detector.score_all(&features);
        assert_eq!(scores.len(), 4);
        assert_eq!(scores[0].label, "speech");
        assert!(scores.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(&s.score)));
    }
}
