// Spectral feature extraction
// Windowing, magnitude spectra, and coarse descriptors used by the
// separation engine and the built-in sound detector

use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};

/// Boundary between the low and mid bands in Hz
const LOW_BAND_MAX_HZ: f32 = 200.0;

/// Boundary between the mid and high bands in Hz
const MID_BAND_MAX_HZ: f32 = 2000.0;

/// Spectral and temporal descriptors of an audio segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralFeatures {
    /// Spectral centroid (Hz) - "center of mass" of spectrum
    pub spectral_centroid: f32,

    /// Zero-crossing rate (crossings per sample)
    /// Higher values indicate noisy/unvoiced content
    pub zcr: f32,

    /// Energy in low frequency band (0-200 Hz), relative to total
    pub low_band_energy: f32,

    /// Energy in mid frequency band (200-2000 Hz), relative to total
    pub mid_band_energy: f32,

    /// Energy in high frequency band (2000+ Hz), relative to total
    pub high_band_energy: f32,

    /// Root-mean-square level of the segment
    pub rms: f32,
}

impl SpectralFeatures {
    pub fn zero() -> Self {
        SpectralFeatures {
            spectral_centroid: 0.0,
            zcr: 0.0,
            low_band_energy: 0.0,
            mid_band_energy: 0.0,
            high_band_energy: 0.0,
            rms: 0.0,
        }
    }
}

/// Periodic Hann window of length `n`
pub fn hann_window(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }

    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos()))
        .collect()
}

/// Apply Hann window function in place to reduce spectral leakage
pub fn apply_hann_window(samples: &mut [f32]) {
    let window = hann_window(samples.len());
    for (sample, w) in samples.iter_mut().zip(window) {
        *sample *= w;
    }
}

/// Compute real FFT and return the magnitude spectrum (n/2 + 1 bins)
pub fn magnitude_spectrum(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(samples.len());

    let mut input = samples.to_vec();
    let mut spectrum = fft.make_output_vec();

    if let Err(e) = fft.process(&mut input, &mut spectrum) {
        log::warn!("FFT failed on {}-sample frame: {}", samples.len(), e);
        return vec![0.0; spectrum.len()];
    }

    spectrum.iter().map(|c| c.norm()).collect()
}

/// Frequency (Hz) of FFT bin `bin` for a frame of `frame_len` samples
pub fn bin_frequency(bin: usize, frame_len: usize, sample_rate: u32) -> f32 {
    if frame_len == 0 {
        return 0.0;
    }
    bin as f32 * sample_rate as f32 / frame_len as f32
}

/// Nearest FFT bin for `frequency`, or None when it lies above Nyquist
pub fn frequency_bin(frequency: f32, frame_len: usize, sample_rate: u32) -> Option<usize> {
    if sample_rate == 0 || frequency < 0.0 {
        return None;
    }
    let bin = (frequency * frame_len as f32 / sample_rate as f32).round() as usize;
    if bin <= frame_len / 2 {
        Some(bin)
    } else {
        None
    }
}

/// Extract spectral features from a single analysis window
pub fn extract_features(samples: &[f32], sample_rate: u32) -> SpectralFeatures {
    if samples.is_empty() {
        return SpectralFeatures::zero();
    }

    let window_size = samples.len().min(2048);
    let mut windowed = samples[..window_size].to_vec();
    apply_hann_window(&mut windowed);
    let spectrum = magnitude_spectrum(&windowed);

    let [low, mid, high] = calculate_band_energies(&spectrum, sample_rate, window_size);

    SpectralFeatures {
        spectral_centroid: calculate_spectral_centroid(&spectrum, sample_rate, window_size),
        zcr: calculate_zcr(samples),
        low_band_energy: low,
        mid_band_energy: mid,
        high_band_energy: high,
        rms: calculate_rms(samples),
    }
}

/// Average frame-level features over a whole buffer
/// Frames are `window_size` long, advanced by `hop_size`; a buffer shorter
/// than one window is analysed as a single frame
pub fn average_features(
    samples: &[f32],
    sample_rate: u32,
    window_size: usize,
    hop_size: usize,
) -> SpectralFeatures {
    if samples.is_empty() || window_size == 0 || hop_size == 0 {
        return SpectralFeatures::zero();
    }
    if samples.len() <= window_size {
        return extract_features(samples, sample_rate);
    }

    let mut total = SpectralFeatures::zero();
    let mut frames = 0usize;
    let mut start = 0usize;

    while start + window_size <= samples.len() {
        let f = extract_features(&samples[start..start + window_size], sample_rate);
        total.spectral_centroid += f.spectral_centroid;
        total.zcr += f.zcr;
        total.low_band_energy += f.low_band_energy;
        total.mid_band_energy += f.mid_band_energy;
        total.high_band_energy += f.high_band_energy;
        total.rms += f.rms;
        frames += 1;
        start += hop_size;
    }

    let n = frames as f32;
    SpectralFeatures {
        spectral_centroid: total.spectral_centroid / n,
        zcr: total.zcr / n,
        low_band_energy: total.low_band_energy / n,
        mid_band_energy: total.mid_band_energy / n,
        high_band_energy: total.high_band_energy / n,
        rms: total.rms / n,
    }
}

/// Calculate Zero-Crossing Rate (ZCR)
fn calculate_zcr(samples: &[f32]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }

    let crossings = samples
        .windows(2)
        .filter(|pair| (pair[1] >= 0.0) != (pair[0] >= 0.0))
        .count();

    crossings as f32 / (samples.len() - 1) as f32
}

fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Calculate spectral centroid (center of mass of spectrum) in Hz
fn calculate_spectral_centroid(spectrum: &[f32], sample_rate: u32, window_size: usize) -> f32 {
    let mut weighted_sum = 0.0;
    let mut total_magnitude = 0.0;

    for (i, &magnitude) in spectrum.iter().enumerate() {
        weighted_sum += bin_frequency(i, window_size, sample_rate) * magnitude;
        total_magnitude += magnitude;
    }

    if total_magnitude > 0.0 {
        weighted_sum / total_magnitude
    } else {
        0.0
    }
}

/// Energy ratios in the low (0-200 Hz), mid (200-2000 Hz) and high bands
fn calculate_band_energies(spectrum: &[f32], sample_rate: u32, window_size: usize) -> [f32; 3] {
    let mut low_energy = 0.0;
    let mut mid_energy = 0.0;
    let mut high_energy = 0.0;

    for (i, &magnitude) in spectrum.iter().enumerate() {
        let energy = magnitude * magnitude;
        let frequency = bin_frequency(i, window_size, sample_rate);
        if frequency < LOW_BAND_MAX_HZ {
            low_energy += energy;
        } else if frequency < MID_BAND_MAX_HZ {
            mid_energy += energy;
        } else {
            high_energy += energy;
        }
    }

    let total_energy = low_energy + mid_energy + high_energy;

    if total_energy > 0.0 {
        [
            low_energy / total_energy,
            mid_energy / total_energy,
            high_energy / total_energy,
        ]
    } else {
        [0.0, 0.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_zcr_calculation() {
        let alternating = vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        assert!(calculate_zcr(&alternating) > 0.8);

        let constant = vec![1.0, 1.0, 1.0, 1.0];
        assert_eq!(calculate_zcr(&constant), 0.0);
    }

    #[test]
    fn test_hann_window() {
        let mut samples = vec![1.0; 100];
        apply_hann_window(&mut samples);

        assert!(samples[0] < 0.1);
        assert!(samples[99] < 0.1);
        assert!(samples[50] > 0.9);
    }

    #[test]
    fn test_bin_mapping() {
        assert_eq!(bin_frequency(0, 2048, 44100), 0.0);
        assert!((bin_frequency(1024, 2048, 44100) - 22050.0).abs() < 1e-3);
        assert_eq!(frequency_bin(0.0, 2048, 44100), Some(0));
        assert_eq!(frequency_bin(22050.0, 2048, 44100), Some(1024));
        assert_eq!(frequency_bin(30000.0, 2048, 44100), None);
    }

    #[test]
    fn test_sine_centroid_and_bands() {
        let tone = sine(1000.0, 44100, 2048);
        let features = extract_features(&tone, 44100);

        assert!((features.spectral_centroid - 1000.0).abs() < 200.0);
        assert!(features.mid_band_energy > 0.9);
        assert!(features.rms > 0.6 && features.rms < 0.8);
    }

    #[test]
    fn test_feature_extraction_empty() {
        let features = extract_features(&[], 44100);
        assert_eq!(features, SpectralFeatures::zero());
    }

    #[test]
    fn test_average_features_low_tone() {
        let tone = sine(80.0, 16000, 16000);
        let features = average_features(&tone, 16000, 2048, 1024);
        assert!(features.low_band_energy > 0.8);
    }
}
