// In-memory multichannel signal
// Planar (per-channel) float buffers shared by every separation stage

use crate::audio::AudioError;

/// Decoded or processed audio, stored one buffer per channel
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSignal {
    /// Sample rate in Hz (e.g., 44100, 48000)
    sample_rate: u32,

    /// One buffer per channel, all of identical length
    /// Samples are nominally in [-1.0, 1.0]
    channels: Vec<Vec<f32>>,
}

impl AudioSignal {
    /// Build a signal from planar channel buffers
    /// Rejects a zero sample rate, zero channels, or ragged channel lengths
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidData("sample rate must be positive".to_string()));
        }
        if channels.is_empty() {
            return Err(AudioError::InvalidData("signal has no channels".to_string()));
        }

        let len = channels[0].len();
        if channels.iter().any(|ch| ch.len() != len) {
            return Err(AudioError::InvalidData(
                "channel buffers differ in length".to_string(),
            ));
        }

        Ok(AudioSignal {
            sample_rate,
            channels,
        })
    }

    /// Single-channel convenience constructor
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self, AudioError> {
        Self::new(sample_rate, vec![samples])
    }

    /// Allocate a zeroed signal with the same shape as `self`
    pub fn silent_like(&self) -> Self {
        AudioSignal {
            sample_rate: self.sample_rate,
            channels: vec![vec![0.0; self.frame_count()]; self.channels.len()],
        }
    }

    /// Split interleaved samples ([L, R, L, R, ...]) into planar buffers
    /// Trailing samples that do not fill a whole frame are dropped
    pub fn from_interleaved(
        sample_rate: u32,
        channel_count: u16,
        interleaved: &[f32],
    ) -> Result<Self, AudioError> {
        let count = channel_count as usize;
        if count == 0 {
            return Err(AudioError::InvalidData("signal has no channels".to_string()));
        }

        let frames = interleaved.len() / count;
        let mut channels = vec![Vec::with_capacity(frames); count];
        for frame in interleaved.chunks_exact(count) {
            for (ch, &sample) in frame.iter().enumerate() {
                channels[ch].push(sample);
            }
        }

        Self::new(sample_rate, channels)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    pub fn frame_count(&self) -> usize {
        self.channels.first().map(|ch| ch.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(|ch| ch.as_slice())
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Duration in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.duration_secs() * 1000.0) as i64
    }

    /// Convert to mono by averaging channels
    pub fn to_mono(&self) -> Vec<f32> {
        if self.channels.len() == 1 {
            return self.channels[0].clone();
        }

        let count = self.channels.len() as f32;
        (0..self.frame_count())
            .map(|i| self.channels.iter().map(|ch| ch[i]).sum::<f32>() / count)
            .collect()
    }

    /// Interleave planar buffers back into [L, R, L, R, ...] order
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frame_count() * self.channels.len());
        for i in 0..self.frame_count() {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }

    /// Largest absolute sample across all channels
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|ch| ch.iter())
            .fold(0.0f32, |acc, s| acc.max(s.abs()))
    }
}
