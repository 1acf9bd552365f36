// Audio ingestion module
// Decodes WAV containers into planar AudioSignal buffers

use hound::{SampleFormat, WavReader};
use std::io::Cursor;
use thiserror::Error;

use crate::audio::AudioSignal;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Failed to read WAV file: {0}")]
    WavReadError(#[from] hound::Error),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid audio data: {0}")]
    InvalidData(String),
}

/// Container-level facts about a decoded file, kept for logging and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
}

/// Decode a WAV file from raw bytes into a planar signal
pub fn decode_wav(data: &[u8]) -> Result<AudioSignal, AudioError> {
    decode_wav_with_format(data).map(|(signal, _)| signal)
}

/// Decode a WAV file and also return the source container format
pub fn decode_wav_with_format(data: &[u8]) -> Result<(AudioSignal, SourceFormat), AudioError> {
    let cursor = Cursor::new(data);
    let mut reader = WavReader::new(cursor)?;

    let spec = reader.spec();
    let format = SourceFormat {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bit_depth: spec.bits_per_sample,
    };

    // Read and normalize samples to f32 [-1.0, 1.0]
    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 8) => {
            // hound already re-centres unsigned 8-bit PCM around zero
            reader
                .samples::<i8>()
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .map(|s| s as f32 / 128.0)
                .collect()
        }
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|s| s as f32 / 32768.0)
            .collect(),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|s| s as f32 / 8388608.0)
            .collect(),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|s| s as f32 / 2147483648.0)
            .collect(),
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        (sample_format, bit_depth) => {
            return Err(AudioError::UnsupportedFormat(format!(
                "{:?} {}-bit audio",
                sample_format, bit_depth
            )));
        }
    };

    let signal = AudioSignal::from_interleaved(spec.sample_rate, spec.channels, &samples)?;

    log::debug!(
        "Decoded WAV: {} Hz, {} channels, {} bit, {} frames",
        format.sample_rate,
        format.channels,
        format.bit_depth,
        signal.frame_count()
    );

    Ok((signal, format))
}
