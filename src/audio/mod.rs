// Audio processing module
// Handles WAV decoding/encoding, the in-memory signal type, and spectral features

pub mod encode;
pub mod features;
pub mod ingest;
pub mod signal;

pub use encode::{encode_wav, encode_wav_channels, quantize_sample, WavChannels, WAV_HEADER_LEN};
pub use features::{average_features, extract_features, SpectralFeatures};
pub use ingest::{decode_wav, decode_wav_with_format, AudioError, SourceFormat};
pub use signal::AudioSignal;
