//! # Sample Window Module
//!
//! The unit of work flowing from ingestion to the detector: one channel's
//! worth of resampled 16-bit samples, tagged with the pitch pass that
//! produced it and its position on that pass's time axis.

use crate::pitch::Pitch;

/// A fixed-length, immutable slice of one channel of resampled audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleWindow {
    channel: usize,
    index: usize,
    samples: Vec<i16>,
    sample_rate: f64,
    pitch: Pitch,
    start_time: f64,
    end_time: f64,
}

impl SampleWindow {
    /// Builds the `index`-th window of a pitch pass. Start and end times are
    /// derived from the index so they never drift across a long pass.
    pub fn new(
        pitch: Pitch,
        channel: usize,
        index: usize,
        samples: Vec<i16>,
        sample_rate: f64,
    ) -> Self {
        let duration = samples.len() as f64 / sample_rate;
        SampleWindow {
            channel,
            index,
            samples,
            sample_rate,
            pitch,
            start_time: index as f64 * duration,
            end_time: (index + 1) as f64 * duration,
        }
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Ordinal of this window within its pitch pass.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// The resampled rate used to produce this window.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_advance_by_window_duration() {
        let rate = Pitch::A.sample_rate_for(4096);
        let first = SampleWindow::new(Pitch::A, 0, 0, vec![0; 4096], rate);
        let third = SampleWindow::new(Pitch::A, 1, 2, vec![0; 4096], rate);

        assert_eq!(first.start_time(), 0.0);
        assert!((first.end_time() - 0.2).abs() < 1e-12);
        assert!((third.start_time() - 0.4).abs() < 1e-12);
        assert!((third.end_time() - 0.6).abs() < 1e-12);
        assert_eq!(third.channel(), 1);
    }
}
