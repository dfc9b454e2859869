//! # Error Module
//!
//! Typed failures of the analysis pipeline. Configuration errors are fatal
//! and surface before any analysis starts; decode and resample errors are
//! scoped to a single pitch pass and are logged by ingestion.

use thiserror::Error;

use crate::pitch::Pitch;

/// Errors returned by the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The transform needs a power-of-two window.
    #[error("window size must be a power of two, got {0}")]
    InvalidWindowSize(usize),

    /// A buffer handed to the detector or transform has the wrong length.
    #[error("expected a window of {expected} samples, got {got}")]
    WindowLengthMismatch {
        /// The configured window size.
        expected: usize,
        /// The actual length received.
        got: usize,
    },

    /// The top harmonic of a pitch does not fit below the Nyquist bin.
    #[error("harmonic bin {bin} of {pitch} is outside the lower half of a {window_size}-point window")]
    HarmonicOutOfRange {
        pitch: Pitch,
        bin: usize,
        window_size: usize,
    },

    /// Only 16-bit little-endian PCM is handled.
    #[error("unsupported bit depth {0}, expected 16-bit PCM")]
    UnsupportedBitDepth(u16),

    #[error("audio source has no channels")]
    NoChannels,

    #[error("power threshold must be a finite, non-negative number, got {0}")]
    InvalidThreshold(f64),

    #[error("unknown pitch name `{0}`")]
    UnknownPitch(String),

    /// The source could not be opened or decoded.
    #[error("decode error: {0}")]
    Decode(#[from] hound::Error),

    /// The resampler could not be built or failed mid-stream.
    #[error("resample error: {0}")]
    Resample(String),

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

impl From<rubato::ResamplerConstructionError> for AnalysisError {
    fn from(err: rubato::ResamplerConstructionError) -> Self {
        AnalysisError::Resample(err.to_string())
    }
}

impl From<rubato::ResampleError> for AnalysisError {
    fn from(err: rubato::ResampleError) -> Self {
        AnalysisError::Resample(err.to_string())
    }
}

impl AnalysisError {
    /// Whether this error aborts the whole run rather than a single pitch pass.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AnalysisError::Decode(_) | AnalysisError::Resample(_))
    }
}
