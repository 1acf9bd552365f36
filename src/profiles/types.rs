// Separation profile type definitions
// Acoustic parameters that govern how one sound target is isolated

use serde::{Deserialize, Serialize};
use std::fmt;

/// Masking strategy used by the separation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparationAlgorithm {
    /// Baseline from energy at emphasis frequencies and their 2nd/3rd harmonics
    /// Suited to tonal/periodic sources (speech, music)
    Harmonic,

    /// Baseline from average and peak magnitude across the target band
    /// Suited to broadband/noise-like sources (engines, water, wind)
    Spectral,

    /// Flat gain over sequential time segments, no frequency selectivity
    Multiband,
}

impl SeparationAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeparationAlgorithm::Harmonic => "harmonic",
            SeparationAlgorithm::Spectral => "spectral",
            SeparationAlgorithm::Multiband => "multiband",
        }
    }

    /// Parse from string; anything unrecognized falls back to multiband
    pub fn from_string(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "harmonic" => SeparationAlgorithm::Harmonic,
            "spectral" => SeparationAlgorithm::Spectral,
            _ => SeparationAlgorithm::Multiband,
        }
    }
}

impl fmt::Display for SeparationAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frequency/gain parameters for isolating one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationProfile {
    /// Target band (low, high) in Hz, low < high
    pub frequency_range: (f32, f32),

    /// Formant/tonal centres given extra amplification, in Hz
    pub emphasis_frequencies: Vec<f32>,

    pub algorithm: SeparationAlgorithm,

    /// In-band multiplier, >= 1.0
    pub gain: f32,

    /// Out-of-band multiplier in (0, 1]
    pub noise_floor_attenuation: f32,
}

impl SeparationProfile {
    /// Check the range, gain and attenuation invariants
    pub fn is_valid(&self) -> bool {
        let (low, high) = self.frequency_range;
        low >= 0.0
            && low < high
            && self.gain >= 1.0
            && self.noise_floor_attenuation > 0.0
            && self.noise_floor_attenuation <= 1.0
    }

    /// True when `frequency` lies inside the target band (inclusive)
    pub fn contains(&self, frequency: f32) -> bool {
        frequency >= self.frequency_range.0 && frequency <= self.frequency_range.1
    }
}

/// Compile-time catalog row, converted to an owned profile on lookup
#[derive(Debug, Clone, Copy)]
pub struct ProfileTemplate {
    /// Profile family name (e.g., "speech", "animal_bark")
    pub name: &'static str,

    /// Terms that select this profile, matched as substrings of the target
    pub keys: &'static [&'static str],

    pub low_hz: f32,
    pub high_hz: f32,
    pub emphasis: &'static [f32],
    pub algorithm: SeparationAlgorithm,
    pub gain: f32,
    pub attenuation: f32,
}

impl ProfileTemplate {
    pub fn to_profile(&self) -> SeparationProfile {
        SeparationProfile {
            frequency_range: (self.low_hz, self.high_hz),
            emphasis_frequencies: self.emphasis.to_vec(),
            algorithm: self.algorithm,
            gain: self.gain,
            noise_floor_attenuation: self.attenuation,
        }
    }
}

/// Catalog entry summary for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub name: String,
    pub keys: Vec<String>,
    pub profile: SeparationProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_round_trip() {
        for algorithm in [
            SeparationAlgorithm::Harmonic,
            SeparationAlgorithm::Spectral,
            SeparationAlgorithm::Multiband,
        ] {
            assert_eq!(SeparationAlgorithm::from_string(algorithm.as_str()), algorithm);
        }
        assert_eq!(
            SeparationAlgorithm::from_string("neural"),
            SeparationAlgorithm::Multiband
        );
    }

    #[test]
    fn test_algorithm_serde_lowercase() {
        let json = serde_json::to_string(&SeparationAlgorithm::Harmonic).unwrap();
        assert_eq!(json, "\"harmonic\"");
    }

    #[test]
    fn test_profile_validation() {
        let mut profile = SeparationProfile {
            frequency_range: (100.0, 8000.0),
            emphasis_frequencies: vec![1000.0],
            algorithm: SeparationAlgorithm::Spectral,
            gain: 2.5,
            noise_floor_attenuation: 0.2,
        };
        assert!(profile.is_valid());
        assert!(profile.contains(100.0));
        assert!(!profile.contains(9000.0));

        profile.frequency_range = (500.0, 400.0);
        assert!(!profile.is_valid());

        profile.frequency_range = (100.0, 8000.0);
        profile.gain = 0.5;
        assert!(!profile.is_valid());

        profile.gain = 2.0;
        profile.noise_floor_attenuation = 1.5;
        assert!(!profile.is_valid());
    }
}
