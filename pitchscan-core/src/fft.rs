//! # Fast Fourier Transform (FFT) Module
//!
//! This module wraps RustFFT for the harmonic scan. Unlike a general tuner
//! spectrum, no window function or DC removal is applied: resampling already
//! places every scanned harmonic on an exact bin, so leakage does not arise
//! for the bins that matter.
//!
//! ## Features
//! - Forward FFT planned once per window size
//! - Unnormalised output (no 1/N scaling)
//! - Lower-half magnitude spectrum for real input

use rustfft::{Fft, FftPlanner, num_complex::Complex as FftComplex};
use std::fmt;
use std::sync::Arc;

use crate::complex::Complex;
use crate::error::AnalysisError;

/// A forward transform of a fixed power-of-two length.
pub struct SpectrumTransform {
    fft: Arc<dyn Fft<f64>>,
    size: usize,
}

impl SpectrumTransform {
    /// Plans a forward FFT of `size` points.
    ///
    /// # Errors
    /// * `InvalidWindowSize` if `size` is not a power of two
    pub fn new(size: usize) -> Result<Self, AnalysisError> {
        if !size.is_power_of_two() {
            return Err(AnalysisError::InvalidWindowSize(size));
        }
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Ok(SpectrumTransform { fft, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Transforms `input` into `size` frequency coefficients.
    ///
    /// # Errors
    /// * `WindowLengthMismatch` if `input.len() != size`
    pub fn forward(&self, input: &[Complex]) -> Result<Vec<Complex>, AnalysisError> {
        if input.len() != self.size {
            return Err(AnalysisError::WindowLengthMismatch {
                expected: self.size,
                got: input.len(),
            });
        }

        let mut buffer: Vec<FftComplex<f64>> = input.iter().map(|&c| c.into()).collect();
        self.fft.process(&mut buffer);
        Ok(buffer.into_iter().map(Complex::from).collect())
    }
}

impl fmt::Debug for SpectrumTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumTransform")
            .field("size", &self.size)
            .finish()
    }
}

/// Magnitudes of the lower half of a spectrum.
///
/// A real input has a conjugate-symmetric spectrum, so bins
/// `0 .. len/2` carry all the information.
pub fn spectrum_to_magnitudes(spectrum: &[Complex]) -> Vec<f64> {
    spectrum
        .iter()
        .take(spectrum.len() / 2)
        .map(|c| c.abs())
        .collect()
}
