//! # Spectral Detector Module
//!
//! Turns one sample window into zero to five detections by reading the power
//! at the fundamental bin of the window's pitch and at each octave above it.
//!
//! The detector holds no per-window state: running it twice on the same
//! window with the same threshold yields the same detections.

use crate::complex::Complex;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::fft::{SpectrumTransform, spectrum_to_magnitudes};
use crate::pitch::{HARMONIC_COUNT, Pitch};
use crate::window::SampleWindow;
use crate::Detection;

/// Harmonic-bin detector for a fixed window size.
#[derive(Debug)]
pub struct SpectralDetector {
    transform: SpectrumTransform,
}

impl SpectralDetector {
    /// Builds a detector for `config.window_size`.
    ///
    /// # Errors
    /// Any configuration error reported by [`AnalysisConfig::validate`].
    pub fn new(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(SpectralDetector {
            transform: SpectrumTransform::new(config.window_size)?,
        })
    }

    pub fn window_size(&self) -> usize {
        self.transform.size()
    }

    /// Scans the fundamental and four octave harmonics of the window's pitch.
    ///
    /// A bin is reported only if its power is strictly greater than
    /// `power_threshold`.
    ///
    /// # Errors
    /// * `WindowLengthMismatch` if the window does not hold exactly
    ///   `window_size` samples
    /// * `HarmonicOutOfRange` if the window's pitch was not validated for
    ///   this window size
    pub fn detect(
        &self,
        window: &SampleWindow,
        power_threshold: f64,
    ) -> Result<Vec<Detection>, AnalysisError> {
        let pitch = window.pitch();
        pitch.check_harmonic_range(self.window_size())?;

        let input = normalize(window.samples());
        let spectrum = self.transform.forward(&input)?;
        let powers = spectrum_to_magnitudes(&spectrum);

        let bin_width = window.sample_rate() / self.window_size() as f64;
        let detections = (0..HARMONIC_COUNT)
            .filter_map(|order| {
                let bin = pitch.harmonic_bin(order);
                let power = powers[bin];
                (power > power_threshold)
                    .then(|| detection(window, pitch, order, bin as f64 * bin_width, power))
            })
            .collect();
        Ok(detections)
    }
}

/// Scales 16-bit samples into `[-1, 1]` as purely real values.
fn normalize(samples: &[i16]) -> Vec<Complex> {
    samples
        .iter()
        .map(|&s| Complex::real(s as f64 / i16::MAX as f64))
        .collect()
}

fn detection(
    window: &SampleWindow,
    pitch: Pitch,
    order: u32,
    frequency: f64,
    power: f64,
) -> Detection {
    Detection {
        start_time: window.start_time(),
        label: format!("{}{}", pitch, order + 1),
        frequency,
        power,
        pitch,
        harmonic: order + 1,
        channel: window.channel(),
    }
}
