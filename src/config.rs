// Separation configuration
// Tunable engine, conditioning and encoding constants

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::audio::WavChannels;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Post-processing strategy applied to engine output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditioningStrategy {
    /// Soft knee above the limiter threshold, optional makeup gain, hard clamp
    #[default]
    SoftLimit,

    /// Scale the whole buffer so its peak lands on `normalize_peak`
    PeakNormalize,
}

/// Configuration for a separation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    /// STFT frame size in samples (power of 2)
    pub frame_size: usize,

    /// Hop size in samples (advance between frames)
    pub hop_size: usize,

    /// Radius (Hz) around an emphasis frequency that receives extra boost
    pub emphasis_radius_hz: f32,

    /// Upper bound on any per-bin mask value
    pub gain_ceiling: f32,

    /// Number of sequential segments used by the multiband algorithm
    pub multiband_segments: usize,

    pub conditioning: ConditioningStrategy,

    /// Magnitude above which the soft limiter starts compressing
    pub soft_limit_threshold: f32,

    /// Samples at or below this magnitude are left alone by makeup gain
    pub noise_floor: f32,

    /// Re-apply the profile gain after limiting
    pub apply_makeup_gain: bool,

    /// Final hard clamp, in (0, 1]
    pub output_ceiling: f32,

    /// Target peak for the peak-normalize strategy
    pub normalize_peak: f32,

    /// Channels written to the output WAV
    pub wav_channels: WavChannels,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        SeparationConfig {
            frame_size: 2048,
            hop_size: 512,
            emphasis_radius_hz: 200.0,
            gain_ceiling: 6.0,
            multiband_segments: 16,
            conditioning: ConditioningStrategy::SoftLimit,
            soft_limit_threshold: 0.8,
            noise_floor: 0.001,
            apply_makeup_gain: false,
            output_ceiling: 0.95,
            normalize_peak: 0.8,
            wav_channels: WavChannels::First,
        }
    }
}

impl SeparationConfig {
    /// Load a config from a JSON file; omitted fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SeparationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_framing(self.frame_size, self.hop_size)?;
        if self.emphasis_radius_hz <= 0.0 {
            return Err(ConfigError::Invalid("emphasis_radius_hz must be positive".to_string()));
        }
        if self.gain_ceiling < 1.0 {
            return Err(ConfigError::Invalid("gain_ceiling must be >= 1.0".to_string()));
        }
        if self.multiband_segments == 0 {
            return Err(ConfigError::Invalid("multiband_segments must be positive".to_string()));
        }
        if !(self.output_ceiling > 0.0 && self.output_ceiling <= 1.0) {
            return Err(ConfigError::Invalid("output_ceiling must be in (0, 1]".to_string()));
        }
        if !(self.normalize_peak > 0.0 && self.normalize_peak <= self.output_ceiling) {
            return Err(ConfigError::Invalid(
                "normalize_peak must be in (0, output_ceiling]".to_string(),
            ));
        }
        if !(self.soft_limit_threshold > 0.0 && self.soft_limit_threshold < 1.0) {
            return Err(ConfigError::Invalid(
                "soft_limit_threshold must be in (0, 1)".to_string(),
            ));
        }
        if self.noise_floor < 0.0 {
            return Err(ConfigError::Invalid("noise_floor must be >= 0".to_string()));
        }
        Ok(())
    }
}

/// STFT framing accepted by the engine
/// Frames must be a power of two so the real spectrum has a purely real
/// Nyquist bin; hops of F/8 to F/2 keep every sample under a non-zero window sum
pub fn validate_framing(frame_size: usize, hop_size: usize) -> Result<(), ConfigError> {
    if frame_size < 16 || !frame_size.is_power_of_two() {
        return Err(ConfigError::Invalid(format!(
            "frame_size must be a power of two >= 16, got {}",
            frame_size
        )));
    }

    let hops = frame_size / 8..=frame_size / 2;
    if !hops.contains(&hop_size) {
        return Err(ConfigError::Invalid(format!(
            "hop_size must be in {}..={} for frame_size {}, got {}",
            hops.start(),
            hops.end(),
            frame_size,
            hop_size
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_is_valid() {
        let config = SeparationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_size / config.hop_size, 4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SeparationConfig::from_json_str(
            r#"{ "frame_size": 4096, "hop_size": 512, "conditioning": "peak_normalize" }"#,
        )
        .unwrap();

        assert_eq!(config.frame_size, 4096);
        assert_eq!(config.conditioning, ConditioningStrategy::PeakNormalize);
        assert_eq!(config.gain_ceiling, 6.0);
        assert_eq!(config.wav_channels, WavChannels::First);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(SeparationConfig::from_json_str(r#"{ "frame_size": 1000 }"#).is_err());
        assert!(SeparationConfig::from_json_str(r#"{ "hop_size": 0 }"#).is_err());
        assert!(SeparationConfig::from_json_str(r#"{ "hop_size": 2048 }"#).is_err());
        assert!(SeparationConfig::from_json_str(r#"{ "gain_ceiling": 0.5 }"#).is_err());
        assert!(SeparationConfig::from_json_str(r#"{ "output_ceiling": 1.5 }"#).is_err());
        assert!(SeparationConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_framing_limits() {
        assert!(validate_framing(2048, 256).is_ok());
        assert!(validate_framing(2048, 1024).is_ok());
        assert!(validate_framing(2048, 255).is_err());
        assert!(validate_framing(2048, 1025).is_err());
        assert!(validate_framing(2048, 2048).is_err());
        assert!(validate_framing(2047, 512).is_err());
        assert!(validate_framing(8, 2).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "wav_channels": "all", "apply_makeup_gain": true }}"#).unwrap();

        let config = SeparationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.wav_channels, WavChannels::All);
        assert!(config.apply_makeup_gain);
    }
}
