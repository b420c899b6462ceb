//! Error types shared by the analysis core and the I/O layer around it.

use std::fmt;

/// Errors produced while designing filters, transforming or measuring signals.
#[derive(Debug, thiserror::Error)]
pub enum DenoiseError {
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },
    #[error("Signal too short: need more than {required} samples, got {actual}")]
    SignalTooShort { required: usize, actual: usize },
    #[error("Invalid coefficients in section {section}: {reason}")]
    InvalidCoefficients { section: usize, reason: String },
    #[error("Transform configuration mismatch: {0}")]
    ConfigurationMismatch(String),
    #[error("Mask length {actual} does not match {expected} frequency bins")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Signal lengths differ: reference has {reference} samples, candidate has {candidate}")]
    LengthMismatch { reference: usize, candidate: usize },
    #[error("FFT failed: {0}")]
    Transform(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Invalid options JSON: {0}")]
    Config(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fieldless discriminant of [`DenoiseError`], for matching on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    SignalTooShort,
    InvalidCoefficients,
    ConfigurationMismatch,
    DimensionMismatch,
    LengthMismatch,
    Transform,
    Decode,
    Wav,
    Config,
    Io,
}

impl DenoiseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::SignalTooShort { .. } => ErrorKind::SignalTooShort,
            Self::InvalidCoefficients { .. } => ErrorKind::InvalidCoefficients,
            Self::ConfigurationMismatch(_) => ErrorKind::ConfigurationMismatch,
            Self::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            Self::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            Self::Transform(_) => ErrorKind::Transform,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Wav(_) => ErrorKind::Wav,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub type Result<T> = std::result::Result<T, DenoiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let err = DenoiseError::invalid("cutoff_hz", 9000.0, "must be below Nyquist");
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(err.to_string().contains("cutoff_hz"));

        let err = DenoiseError::LengthMismatch {
            reference: 10,
            candidate: 12,
        };
        assert_eq!(err.kind(), ErrorKind::LengthMismatch);
    }
}
