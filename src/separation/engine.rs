// Spectral separation engine
// STFT masking with overlap-add resynthesis, selectable per profile:
// harmonic and spectral masks work per frequency bin, multiband applies a
// flat gain over sequential time segments

use realfft::num_complex::Complex;
use realfft::{ComplexToReal, FftError, RealFftPlanner, RealToComplex};
use std::sync::Arc;
use thiserror::Error;

use crate::audio::features::{bin_frequency, frequency_bin, hann_window};
use crate::audio::AudioSignal;
use crate::config::{validate_framing, SeparationConfig};
use crate::profiles::{SeparationAlgorithm, SeparationProfile};

/// Relative weights of the fundamental, 2nd and 3rd harmonic
const HARMONIC_WEIGHTS: [f32; 3] = [1.0, 0.5, 0.25];

/// Share of the spectral baseline driven by band average (rest by band peak)
const SPECTRAL_AVERAGE_SHARE: f32 = 0.7;

/// Window sums below this are treated as uncovered samples
const MIN_WINDOW_SUM: f32 = 1e-6;

const EPSILON: f32 = 1e-9;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("FFT failed: {0}")]
    Fft(#[from] FftError),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Output of one channel
#[derive(Debug, Clone)]
pub struct ChannelSeparation {
    /// Same length as the input channel
    pub samples: Vec<f32>,

    /// Average fraction of frame energy inside the target band [0.0, 1.0]
    pub quality: f32,
}

/// Output of a whole signal
#[derive(Debug, Clone)]
pub struct SeparationOutput {
    /// Same shape as the input signal
    pub signal: AudioSignal,

    /// Mean of the per-channel quality values [0.0, 1.0]
    pub quality: f32,
}

/// Frequency-masking separation engine
pub struct SpectralSeparationEngine {
    frame_size: usize,
    hop_size: usize,
    emphasis_radius_hz: f32,
    gain_ceiling: f32,
    multiband_segments: usize,
    window: Vec<f32>,
    fft_forward: Arc<dyn RealToComplex<f32>>,
    fft_inverse: Arc<dyn ComplexToReal<f32>>,
}

impl SpectralSeparationEngine {
    /// Create an engine from the framing and gain settings in `config`
    pub fn new(config: &SeparationConfig) -> Result<Self, EngineError> {
        validate_framing(config.frame_size, config.hop_size)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;

        let mut planner = RealFftPlanner::<f32>::new();
        let fft_forward = planner.plan_fft_forward(config.frame_size);
        let fft_inverse = planner.plan_fft_inverse(config.frame_size);

        Ok(SpectralSeparationEngine {
            frame_size: config.frame_size,
            hop_size: config.hop_size,
            emphasis_radius_hz: config.emphasis_radius_hz,
            gain_ceiling: config.gain_ceiling,
            multiband_segments: config.multiband_segments.max(1),
            window: hann_window(config.frame_size),
            fft_forward,
            fft_inverse,
        })
    }

    /// Separate every channel of `signal` independently
    pub fn separate(
        &self,
        signal: &AudioSignal,
        profile: &SeparationProfile,
    ) -> Result<SeparationOutput, EngineError> {
        let sample_rate = signal.sample_rate();
        let mut channels = Vec::with_capacity(signal.channel_count());
        let mut quality_sum = 0.0;

        for channel in signal.channels() {
            let result = self.separate_channel(channel, profile, sample_rate)?;
            quality_sum += result.quality;
            channels.push(result.samples);
        }

        let quality = quality_sum / signal.channel_count().max(1) as f32;
        let output = AudioSignal::new(sample_rate, channels)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;

        Ok(SeparationOutput {
            signal: output,
            quality,
        })
    }

    /// Separate a single channel buffer
    pub fn separate_channel(
        &self,
        samples: &[f32],
        profile: &SeparationProfile,
        sample_rate: u32,
    ) -> Result<ChannelSeparation, EngineError> {
        if samples.is_empty() {
            return Ok(ChannelSeparation {
                samples: Vec::new(),
                quality: 0.0,
            });
        }

        match profile.algorithm {
            SeparationAlgorithm::Harmonic | SeparationAlgorithm::Spectral => {
                self.mask_and_resynthesize(samples, profile, sample_rate)
            }
            SeparationAlgorithm::Multiband => {
                let quality = self.measure_quality(samples, profile, sample_rate)?;
                Ok(ChannelSeparation {
                    samples: self.multiband(samples, profile),
                    quality,
                })
            }
        }
    }

    /// Zero-pad so every input sample is covered by frame/hop windows
    fn pad(&self, samples: &[f32]) -> (Vec<f32>, usize) {
        let lead = self.frame_size - self.hop_size;
        let mut padded = vec![0.0; lead + samples.len() + self.frame_size];
        padded[lead..lead + samples.len()].copy_from_slice(samples);
        (padded, lead)
    }

    fn frame_starts(&self, lead: usize, len: usize) -> impl Iterator<Item = usize> {
        (0..lead + len).step_by(self.hop_size)
    }

    /// Window a frame and transform it
    fn analyze(
        &self,
        frame: &[f32],
        buffer: &mut [f32],
        spectrum: &mut [Complex<f32>],
    ) -> Result<(), EngineError> {
        for ((out, &s), &w) in buffer.iter_mut().zip(frame).zip(&self.window) {
            *out = s * w;
        }
        self.fft_forward.process(buffer, spectrum)?;
        Ok(())
    }

    fn mask_and_resynthesize(
        &self,
        samples: &[f32],
        profile: &SeparationProfile,
        sample_rate: u32,
    ) -> Result<ChannelSeparation, EngineError> {
        let (padded, lead) = self.pad(samples);
        let mut output = vec![0.0f32; padded.len()];
        let mut window_sum = vec![0.0f32; padded.len()];

        let mut buffer = self.fft_forward.make_input_vec();
        let mut spectrum = self.fft_forward.make_output_vec();
        let mut resynth = self.fft_inverse.make_output_vec();
        let mut magnitudes = vec![0.0f32; spectrum.len()];

        let bin_frequencies: Vec<f32> = (0..spectrum.len())
            .map(|bin| bin_frequency(bin, self.frame_size, sample_rate))
            .collect();
        let in_band: Vec<bool> = bin_frequencies.iter().map(|&f| profile.contains(f)).collect();
        let emphasis: Vec<f32> = bin_frequencies
            .iter()
            .map(|&f| self.emphasis_boost(f, profile))
            .collect();

        let mut quality = QualityTracker::default();
        let scale = 1.0 / self.frame_size as f32;

        for start in self.frame_starts(lead, samples.len()) {
            let frame = &padded[start..start + self.frame_size];
            self.analyze(frame, &mut buffer, &mut spectrum)?;

            for (mag, c) in magnitudes.iter_mut().zip(spectrum.iter()) {
                *mag = c.norm();
            }
            quality.push(band_energy_fraction(&magnitudes, &in_band));

            let baseline = match profile.algorithm {
                SeparationAlgorithm::Harmonic => {
                    self.harmonic_baseline(&magnitudes, profile, sample_rate)
                }
                _ => spectral_baseline(&magnitudes, &in_band),
            };

            for (bin, c) in spectrum.iter_mut().enumerate() {
                let mask = if in_band[bin] {
                    (baseline * (1.0 + emphasis[bin]) * profile.gain).min(self.gain_ceiling)
                } else {
                    profile.noise_floor_attenuation
                };
                *c *= mask;
            }

            // DC and Nyquist must stay purely real for the inverse transform
            if let Some(first) = spectrum.first_mut() {
                first.im = 0.0;
            }
            if let Some(last) = spectrum.last_mut() {
                last.im = 0.0;
            }

            self.fft_inverse.process(&mut spectrum, &mut resynth)?;

            for (i, (&s, &w)) in resynth.iter().zip(&self.window).enumerate() {
                output[start + i] += s * scale;
                window_sum[start + i] += w;
            }
        }

        let samples_out: Vec<f32> = output[lead..lead + samples.len()]
            .iter()
            .zip(&window_sum[lead..lead + samples.len()])
            .map(|(&s, &w)| if w > MIN_WINDOW_SUM { s / w } else { 0.0 })
            .collect();

        log::debug!(
            "{} mask over {} samples, quality {:.3}",
            profile.algorithm,
            samples.len(),
            quality.value()
        );

        Ok(ChannelSeparation {
            samples: samples_out,
            quality: quality.value(),
        })
    }

    /// In-band energy fraction averaged over frames, without resynthesis
    fn measure_quality(
        &self,
        samples: &[f32],
        profile: &SeparationProfile,
        sample_rate: u32,
    ) -> Result<f32, EngineError> {
        let (padded, lead) = self.pad(samples);
        let mut buffer = self.fft_forward.make_input_vec();
        let mut spectrum = self.fft_forward.make_output_vec();
        let mut magnitudes = vec![0.0f32; spectrum.len()];
        let in_band: Vec<bool> = (0..spectrum.len())
            .map(|bin| profile.contains(bin_frequency(bin, self.frame_size, sample_rate)))
            .collect();

        let mut quality = QualityTracker::default();
        for start in self.frame_starts(lead, samples.len()) {
            self.analyze(&padded[start..start + self.frame_size], &mut buffer, &mut spectrum)?;
            for (mag, c) in magnitudes.iter_mut().zip(spectrum.iter()) {
                *mag = c.norm();
            }
            quality.push(band_energy_fraction(&magnitudes, &in_band));
        }

        Ok(quality.value())
    }

    /// Flat gain over equal-length sequential segments
    fn multiband(&self, samples: &[f32], profile: &SeparationProfile) -> Vec<f32> {
        let segment_len = samples.len().div_ceil(self.multiband_segments).max(1);
        let gain = profile.gain.min(self.gain_ceiling);

        samples
            .chunks(segment_len)
            .flat_map(|segment| segment.iter().map(move |&s| s * gain))
            .collect()
    }

    /// Linear falloff boost in [0, 1] for bins near an emphasis frequency
    fn emphasis_boost(&self, frequency: f32, profile: &SeparationProfile) -> f32 {
        profile
            .emphasis_frequencies
            .iter()
            .map(|&center| {
                let distance = (frequency - center).abs();
                if distance < self.emphasis_radius_hz {
                    1.0 - distance / self.emphasis_radius_hz
                } else {
                    0.0
                }
            })
            .fold(0.0, f32::max)
    }

    /// Baseline in [0.5, 1.0) from fundamental + 2nd/3rd harmonic energy
    /// at each emphasis frequency, relative to the frame's mean magnitude
    fn harmonic_baseline(
        &self,
        magnitudes: &[f32],
        profile: &SeparationProfile,
        sample_rate: u32,
    ) -> f32 {
        let frame_mean = mean(magnitudes);
        if frame_mean <= EPSILON || profile.emphasis_frequencies.is_empty() {
            return 0.5;
        }

        let mut strength_sum = 0.0;
        for &fundamental in &profile.emphasis_frequencies {
            let mut weighted = 0.0;
            let mut weight_total = 0.0;
            for (k, &weight) in HARMONIC_WEIGHTS.iter().enumerate() {
                let harmonic = fundamental * (k + 1) as f32;
                if let Some(bin) = frequency_bin(harmonic, self.frame_size, sample_rate) {
                    weighted += magnitudes[bin] * weight;
                    weight_total += weight;
                }
            }
            if weight_total > 0.0 {
                strength_sum += weighted / weight_total / frame_mean;
            }
        }

        let strength = strength_sum / profile.emphasis_frequencies.len() as f32;
        0.5 + 0.5 * (strength / (1.0 + strength))
    }
}

/// Baseline in [0.5, 1.0] from band average and band peak magnitude
fn spectral_baseline(magnitudes: &[f32], in_band: &[bool]) -> f32 {
    let frame_mean = mean(magnitudes);
    let frame_peak = magnitudes.iter().copied().fold(0.0, f32::max);
    if frame_mean <= EPSILON || frame_peak <= EPSILON {
        return 0.5;
    }

    let band: Vec<f32> = magnitudes
        .iter()
        .zip(in_band)
        .filter(|(_, &inside)| inside)
        .map(|(&m, _)| m)
        .collect();
    if band.is_empty() {
        return 0.5;
    }

    let ratio = mean(&band) / frame_mean;
    let peak_ratio = band.iter().copied().fold(0.0, f32::max) / frame_peak;
    let strength = SPECTRAL_AVERAGE_SHARE * (ratio / (1.0 + ratio))
        + (1.0 - SPECTRAL_AVERAGE_SHARE) * peak_ratio;
    0.5 + 0.5 * strength.clamp(0.0, 1.0)
}

/// Fraction of a frame's energy inside the band, None for silent frames
fn band_energy_fraction(magnitudes: &[f32], in_band: &[bool]) -> Option<f32> {
    let mut total = 0.0;
    let mut inside = 0.0;
    for (&m, &is_in) in magnitudes.iter().zip(in_band) {
        let energy = m * m;
        total += energy;
        if is_in {
            inside += energy;
        }
    }
    if total > EPSILON {
        Some((inside / total).clamp(0.0, 1.0))
    } else {
        None
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Running average of per-frame in-band energy fractions
#[derive(Debug, Default)]
struct QualityTracker {
    sum: f32,
    frames: usize,
}

impl QualityTracker {
    fn push(&mut self, fraction: Option<f32>) {
        if let Some(f) = fraction {
            self.sum += f;
            self.frames += 1;
        }
    }

    fn value(&self) -> f32 {
        if self.frames == 0 {
            0.0
        } else {
            self.sum / self.frames as f32
        }
    }
}
