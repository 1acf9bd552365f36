// Signal conditioning
// Limiting, makeup gain and clamping applied to raw engine output

use crate::audio::AudioSignal;
use crate::config::{ConditioningStrategy, SeparationConfig};

/// Soft-knee limiter: passes samples up to `threshold`, then bends the excess
/// through tanh so output magnitude approaches but never exceeds 1.0
pub fn soft_limit(sample: f32, threshold: f32) -> f32 {
    if sample.abs() <= threshold {
        sample
    } else {
        let sign = sample.signum();
        sign * (threshold + (sample.abs() - threshold).tanh() * (1.0 - threshold))
    }
}

/// Post-processor for separated signals
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    strategy: ConditioningStrategy,
    soft_limit_threshold: f32,
    noise_floor: f32,
    apply_makeup_gain: bool,
    output_ceiling: f32,
    normalize_peak: f32,
}

impl SignalConditioner {
    pub fn new(config: &SeparationConfig) -> Self {
        SignalConditioner {
            strategy: config.conditioning,
            soft_limit_threshold: config.soft_limit_threshold,
            noise_floor: config.noise_floor,
            apply_makeup_gain: config.apply_makeup_gain,
            // Unit magnitude is the hard limit regardless of config
            output_ceiling: config.output_ceiling.clamp(0.0, 1.0),
            normalize_peak: config.normalize_peak.clamp(0.0, 1.0),
        }
    }

    /// Condition every channel, returning a fresh signal of the same shape
    pub fn condition(&self, signal: &AudioSignal, gain: f32) -> AudioSignal {
        let channels: Vec<Vec<f32>> = signal
            .channels()
            .iter()
            .map(|ch| self.condition_channel(ch, gain))
            .collect();

        // Per-channel lengths are preserved, so this only fails for an invalid input
        AudioSignal::new(signal.sample_rate(), channels).unwrap_or_else(|_| signal.silent_like())
    }

    /// Condition a single buffer
    /// Non-finite samples are zeroed; no output sample exceeds the ceiling
    pub fn condition_channel(&self, samples: &[f32], gain: f32) -> Vec<f32> {
        let sanitized = samples.iter().map(|&s| if s.is_finite() { s } else { 0.0 });

        match self.strategy {
            ConditioningStrategy::SoftLimit => sanitized
                .map(|s| {
                    let mut s = soft_limit(s, self.soft_limit_threshold);
                    if self.apply_makeup_gain && s.abs() > self.noise_floor {
                        s *= gain;
                    }
                    s.clamp(-self.output_ceiling, self.output_ceiling)
                })
                .collect(),
            ConditioningStrategy::PeakNormalize => {
                let buffer: Vec<f32> = sanitized.collect();
                let peak = buffer.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
                let scale = if peak > 0.0 { self.normalize_peak / peak } else { 1.0 };
                buffer
                    .into_iter()
                    .map(|s| (s * scale).clamp(-self.output_ceiling, self.output_ceiling))
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditioner(strategy: ConditioningStrategy) -> SignalConditioner {
        SignalConditioner::new(&SeparationConfig {
            conditioning: strategy,
            ..SeparationConfig::default()
        })
    }

    fn adversarial() -> Vec<f32> {
        vec![
            0.0,
            0.5,
            -0.5,
            0.9,
            -0.9,
            3.0,
            -3.0,
            1e6,
            -1e6,
            f32::MAX,
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::NAN,
        ]
    }

    #[test]
    fn test_soft_limit() {
        assert_eq!(soft_limit(0.5, 0.8), 0.5);
        assert_eq!(soft_limit(0.8, 0.8), 0.8);

        let limited = soft_limit(1.5, 0.8);
        assert!(limited < 1.0 && limited > 0.8);

        let limited_neg = soft_limit(-1.5, 0.8);
        assert!(limited_neg > -1.0 && limited_neg < -0.8);
    }

    #[test]
    fn test_soft_limit_strategy_bounds() {
        let output =
            conditioner(ConditioningStrategy::SoftLimit).condition_channel(&adversarial(), 3.0);
        assert_eq!(output.len(), adversarial().len());
        assert!(output.iter().all(|s| s.is_finite() && s.abs() <= 0.95));
        assert_eq!(output[1], 0.5);
    }

    #[test]
    fn test_makeup_gain_respects_floor_and_ceiling() {
        let conditioner = SignalConditioner::new(&SeparationConfig {
            apply_makeup_gain: true,
            ..SeparationConfig::default()
        });
        let output = conditioner.condition_channel(&[0.0005, 0.1, 0.5], 3.0);

        assert_eq!(output[0], 0.0005);
        assert!((output[1] - 0.3).abs() < 1e-6);
        assert_eq!(output[2], 0.95);
    }

    #[test]
    fn test_peak_normalize_strategy() {
        let normalizer = conditioner(ConditioningStrategy::PeakNormalize);
        let output = normalizer.condition_channel(&[0.1, -2.0, 1.0], 1.0);
        assert!((output[1] + 0.8).abs() < 1e-6);
        assert!((output[2] - 0.4).abs() < 1e-6);

        let output = normalizer.condition_channel(&adversarial(), 1.0);
        assert!(output.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
    }

    #[test]
    fn test_silence_untouched() {
        for strategy in [ConditioningStrategy::SoftLimit, ConditioningStrategy::PeakNormalize] {
            let output = conditioner(strategy).condition_channel(&[0.0; 16], 2.0);
            assert!(output.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn test_condition_signal_keeps_shape() {
        let signal = AudioSignal::new(8000, vec![vec![2.0; 5], vec![-2.0; 5]]).unwrap();
        let output = conditioner(ConditioningStrategy::SoftLimit).condition(&signal, 1.0);

        assert_eq!(output.channel_count(), 2);
        assert_eq!(output.frame_count(), 5);
        assert!(output.peak() <= 0.95);
    }
}
