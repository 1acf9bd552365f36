// Separation error taxonomy
// Every failure is scoped to one request and is terminal for it

use thiserror::Error;

use crate::audio::AudioError;

/// Problems with the request itself, detected before any processing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("No audio file provided")]
    MissingAudio,

    #[error("Not an audio file: {0}")]
    NotAudio(String),

    #[error("Query contains no sound description: \"{0}\"")]
    NoTargets(String),

    #[error("Audio contains no samples")]
    EmptySignal,
}

#[derive(Debug, Error)]
pub enum SeparationError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Failed to decode audio: {0}")]
    Decode(#[from] AudioError),

    #[error("Separation failed: {0}")]
    Processing(String),

    #[error("Separation cancelled")]
    Cancelled,
}

impl SeparationError {
    /// Short category name for logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            SeparationError::Input(_) => "input",
            SeparationError::Decode(_) => "decode",
            SeparationError::Processing(_) => "processing",
            SeparationError::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_and_messages() {
        let err = SeparationError::from(InputError::EmptyQuery);
        assert_eq!(err.kind(), "input");
        assert_eq!(err.to_string(), "Invalid input: Query is empty");

        let err = SeparationError::from(AudioError::InvalidData("bad".to_string()));
        assert_eq!(err.kind(), "decode");

        let err = SeparationError::Processing("speech: FFT failed".to_string());
        assert!(err.to_string().contains("speech"));
    }
}
