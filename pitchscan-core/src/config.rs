//! # Configuration Module
//!
//! Run-wide analysis parameters, passed to ingestion and the detector at
//! construction. Loadable from JSON through serde.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::pitch::Pitch;

/// Number of samples per analysis window.
pub const DEFAULT_WINDOW_SIZE: usize = 4096;

/// Minimum bin magnitude reported as a detection.
pub const DEFAULT_POWER_THRESHOLD: f64 = 100.0;

/// What to do with the frames left over at the end of a pitch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TailPolicy {
    /// Discard an incomplete final window.
    #[default]
    Drop,
    /// Fill an incomplete final window with silence.
    ZeroPad,
}

/// Parameters shared by ingestion, the detector and the aggregation worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub window_size: usize,
    pub power_threshold: f64,
    pub tail_policy: TailPolicy,
    /// Pitches to scan, in pass order.
    pub pitches: Vec<Pitch>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            window_size: DEFAULT_WINDOW_SIZE,
            power_threshold: DEFAULT_POWER_THRESHOLD,
            tail_policy: TailPolicy::Drop,
            pitches: Pitch::ALL.to_vec(),
        }
    }
}

impl AnalysisConfig {
    /// Rejects configurations that would make the harmonic scan meaningless.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.window_size.is_power_of_two() {
            return Err(AnalysisError::InvalidWindowSize(self.window_size));
        }
        if !self.power_threshold.is_finite() || self.power_threshold < 0.0 {
            return Err(AnalysisError::InvalidThreshold(self.power_threshold));
        }
        for pitch in &self.pitches {
            pitch.check_harmonic_range(self.window_size)?;
        }
        Ok(())
    }

    /// Duration in seconds of one window at `sample_rate`.
    pub fn window_duration(&self, sample_rate: f64) -> f64 {
        self.window_size as f64 / sample_rate
    }
}
