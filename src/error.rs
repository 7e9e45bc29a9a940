//! Error handling for Rasp
//!
//! Configuration errors are the only fatal class: an invalid sample rate,
//! channel count or block size passed to `prepare` rejects the call rather
//! than proceeding with undefined filter state. The processing hot path
//! itself never errors.

use thiserror::Error;

/// Result type alias for Rasp operations
pub type Result<T> = std::result::Result<T, RaspError>;

/// Main error type for Rasp operations
#[derive(Error, Debug)]
pub enum RaspError {
    // Configuration Errors
    #[error("Invalid sample rate: {sample_rate} (must be finite and > 0)")]
    InvalidSampleRate { sample_rate: f64 },

    #[error("Invalid channel count: {channels} (must be >= 1)")]
    InvalidChannelCount { channels: usize },

    #[error("Invalid block size: {size} (must be >= 1)")]
    InvalidBlockSize { size: usize },

    // Audio File Errors
    #[error("Invalid audio file: {reason}")]
    InvalidAudio { reason: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RaspError::InvalidSampleRate { sample_rate: -1.0 };
        assert!(err.to_string().contains("-1"));

        let err = RaspError::InvalidChannelCount { channels: 0 };
        assert!(err.to_string().contains("channel count"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RaspError = io.into();
        assert!(matches!(err, RaspError::Io(_)));
    }
}
