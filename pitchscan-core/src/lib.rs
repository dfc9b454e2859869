// pitchscan-core/src/lib.rs

//! The core logic for the harmonic pitch scanner.
//! This crate is responsible for decoding and resampling audio, slicing it
//! into per-channel windows, and detecting energy at the exact transform bins
//! of each target pitch and its octave harmonics. It is completely headless
//! and contains no printing code beyond the report writer.

pub mod aggregation;
pub mod audio;
pub mod complex;
pub mod config;
pub mod detector;
pub mod error;
pub mod fft;
pub mod ingest;
pub mod pipeline;
pub mod pitch;
pub mod queue;
pub mod window;

use serde::Serialize;
use std::fmt;

pub use config::{AnalysisConfig, TailPolicy};
pub use error::AnalysisError;
pub use pitch::Pitch;
pub use window::SampleWindow;

/// A single harmonic found above the power threshold in one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Start time, in seconds, of the window that produced this detection.
    pub start_time: f64,
    /// Pitch name followed by the harmonic order (e.g. "A1", "E3").
    pub label: String,
    /// Centre frequency of the matched bin in Hz.
    pub frequency: f64,
    /// Magnitude of the transform coefficient at that bin.
    pub power: f64,
    /// The pitch whose pass produced the window.
    pub pitch: Pitch,
    /// Harmonic order, 1 for the fundamental up to 5.
    pub harmonic: u32,
    /// Channel of the window.
    pub channel: usize,
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.6}] {} ({:.6}) {}",
            self.start_time, self.label, self.frequency, self.power
        )
    }
}
