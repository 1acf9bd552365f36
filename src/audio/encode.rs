// Linear PCM WAV encoder
// Serializes extracted signals into playable 16-bit WAV byte streams

use hound::{SampleFormat, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::audio::{AudioError, AudioSignal};

/// Size of the canonical RIFF/WAVE header written for 16-bit PCM
pub const WAV_HEADER_LEN: usize = 44;

/// Which channels end up in the encoded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WavChannels {
    /// Mono file built from the first channel only
    #[default]
    First,

    /// Every channel, interleaved
    All,
}

/// Quantize a float sample to 16-bit PCM
/// Clamps to [-1.0, 1.0], scales by 32767 and rounds to nearest
pub fn quantize_sample(sample: f32) -> i16 {
    if !sample.is_finite() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16
}

/// Encode the first channel of a signal as a mono 16-bit WAV
pub fn encode_wav(signal: &AudioSignal) -> Result<Vec<u8>, AudioError> {
    encode_wav_channels(signal, WavChannels::First)
}

/// Encode a signal as 16-bit WAV, choosing mono (first channel) or all channels
pub fn encode_wav_channels(
    signal: &AudioSignal,
    channels: WavChannels,
) -> Result<Vec<u8>, AudioError> {
    let (channel_count, samples): (u16, Vec<f32>) = match channels {
        WavChannels::First => {
            let first = signal
                .channel(0)
                .ok_or_else(|| AudioError::InvalidData("signal has no channels".to_string()))?;
            (1, first.to_vec())
        }
        WavChannels::All => {
            let count = u16::try_from(signal.channel_count()).map_err(|_| {
                AudioError::UnsupportedFormat(format!("{} channels", signal.channel_count()))
            })?;
            (count, signal.interleaved())
        }
    };

    let spec = WavSpec {
        channels: channel_count,
        sample_rate: signal.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(WAV_HEADER_LEN + samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in &samples {
            writer.write_sample(quantize_sample(sample))?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode_wav;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    #[test]
    fn test_header_layout() {
        let signal = AudioSignal::mono(22050, vec![0.0, 0.5, -0.5, 1.0]).unwrap();
        let bytes = encode_wav(&signal).unwrap();

        assert_eq!(bytes.len(), WAV_HEADER_LEN + 8);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4), 36 + 8);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(&bytes, 16), 16);
        assert_eq!(u16_at(&bytes, 20), 1);
        assert_eq!(u16_at(&bytes, 22), 1);
        assert_eq!(u32_at(&bytes, 24), 22050);
        assert_eq!(u32_at(&bytes, 28), 22050 * 2);
        assert_eq!(u16_at(&bytes, 32), 2);
        assert_eq!(u16_at(&bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40), 8);
    }

    #[test]
    fn test_sample_quantization() {
        assert_eq!(quantize_sample(0.0), 0);
        assert_eq!(quantize_sample(1.0), 32767);
        assert_eq!(quantize_sample(-1.0), -32767);
        assert_eq!(quantize_sample(4.0), 32767);
        assert_eq!(quantize_sample(-4.0), -32767);
        assert_eq!(quantize_sample(0.5), 16384);
        assert_eq!(quantize_sample(f32::NAN), 0);
    }

    #[test]
    fn test_first_channel_only_by_default() {
        let signal = AudioSignal::new(8000, vec![vec![0.25; 3], vec![-0.25; 3]]).unwrap();
        let bytes = encode_wav(&signal).unwrap();

        assert_eq!(u16_at(&bytes, 22), 1);
        assert_eq!(u32_at(&bytes, 40), 6);
        let first = i16::from_le_bytes([bytes[44], bytes[45]]);
        assert_eq!(first, quantize_sample(0.25));
    }

    #[test]
    fn test_all_channels_interleaved() {
        let signal = AudioSignal::new(8000, vec![vec![0.25; 3], vec![-0.25; 3]]).unwrap();
        let bytes = encode_wav_channels(&signal, WavChannels::All).unwrap();

        let decoded = decode_wav(&bytes).unwrap();
        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.frame_count(), 3);
        assert!(decoded.channel(1).unwrap().iter().all(|&s| s < 0.0));
    }

    #[test]
    fn test_round_trip_within_one_lsb() {
        let ints: Vec<i16> = vec![0, 1, -1, 1000, -1000, 12345, -23456, 32767, -32767];
        let samples: Vec<f32> = ints.iter().map(|&v| v as f32 / 32767.0).collect();
        let signal = AudioSignal::mono(44100, samples).unwrap();

        let bytes = encode_wav(&signal).unwrap();
        assert_eq!(u32_at(&bytes, 40) as usize, ints.len() * 2);

        let decoded = decode_wav(&bytes).unwrap();
        for (original, restored) in ints.iter().zip(decoded.channel(0).unwrap()) {
            let restored_int = restored * 32767.0;
            assert!((restored_int - *original as f32).abs() <= 1.0);
        }
    }
}
