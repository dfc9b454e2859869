//! # Ingestion Module
//!
//! Runs one pass over the source audio per target pitch. Each pass decodes
//! the source, resamples it to the rate that aligns the pitch with the
//! transform bins, slices the stream into per-channel windows and pushes
//! them onto the transport queue.
//!
//! A pass that fails to decode or resample is logged and skipped; the
//! remaining pitches still run. Format problems that would affect every pass
//! are reported before the first pass starts.

use log::{debug, info, warn};

use crate::audio::{AudioSource, DecodedAudio, PcmFormat, Resample};
use crate::config::{AnalysisConfig, TailPolicy};
use crate::error::AnalysisError;
use crate::pitch::Pitch;
use crate::queue::SampleSender;
use crate::window::SampleWindow;

/// Outcome of a single pitch pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassSummary {
    pub pitch: Pitch,
    pub sample_rate: f64,
    pub windows: usize,
}

/// What ingestion produced across all pitch passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestSummary {
    pub passes: Vec<PassSummary>,
    /// Pitches whose pass was abandoned, with the reason.
    pub failed: Vec<(Pitch, String)>,
}

impl IngestSummary {
    pub fn total_windows(&self) -> usize {
        self.passes.iter().map(|p| p.windows).sum()
    }
}

/// Producer side of the pipeline.
#[derive(Debug, Clone)]
pub struct Ingestor {
    config: AnalysisConfig,
}

impl Ingestor {
    pub fn new(config: AnalysisConfig) -> Self {
        Ingestor { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Checks the configuration and the source format before any pass runs.
    ///
    /// # Errors
    /// * any error from [`AnalysisConfig::validate`]
    /// * `UnsupportedBitDepth` / `NoChannels` for a source that is not
    ///   16-bit PCM
    /// * `Decode` if the source cannot even be probed
    pub fn prepare(&self, source: &impl AudioSource) -> Result<PcmFormat, AnalysisError> {
        self.config.validate()?;
        let format = source.format()?;
        format.ensure_supported()?;
        info!(
            "Source: {} Hz, {} bit, {} channel(s)",
            format.sample_rate, format.bits_per_sample, format.channels
        );
        Ok(format)
    }

    /// Runs every pitch pass in configuration order, pushing windows to
    /// `sender`. The sender is dropped on return, which closes the queue.
    pub fn run(
        &self,
        source: &impl AudioSource,
        resampler: &impl Resample,
        sender: SampleSender,
    ) -> Result<IngestSummary, AnalysisError> {
        self.prepare(source)?;

        let mut summary = IngestSummary::default();
        for &pitch in &self.config.pitches {
            match self.run_pass(pitch, source, resampler, &sender) {
                Ok(pass) => {
                    debug!("{} pass pushed {} window(s)", pitch, pass.windows);
                    summary.passes.push(pass);
                }
                Err(err) if !err.is_fatal() => {
                    warn!("Skipping {} pass: {}", pitch, err);
                    summary.failed.push((pitch, err.to_string()));
                }
                Err(err) => return Err(err),
            }
        }
        sender.close();

        info!(
            "Ingestion finished: {} window(s) over {} pass(es), {} failed",
            summary.total_windows(),
            summary.passes.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    fn run_pass(
        &self,
        pitch: Pitch,
        source: &impl AudioSource,
        resampler: &impl Resample,
        sender: &SampleSender,
    ) -> Result<PassSummary, AnalysisError> {
        let target_rate = pitch.sample_rate_for(self.config.window_size);
        info!("{} pass: resampling to {:.3} Hz", pitch, target_rate);

        let decoded = source.decode()?;
        let resampled = resampler.resample(decoded, target_rate)?;
        let windows = slice_windows(
            &resampled,
            pitch,
            self.config.window_size,
            self.config.tail_policy,
        )?;

        let mut pushed = 0;
        for window in windows {
            if !sender.push(window) {
                warn!("{} pass: consumer hung up after {} window(s)", pitch, pushed);
                break;
            }
            pushed += 1;
        }

        Ok(PassSummary {
            pitch,
            sample_rate: resampled.format().sample_rate,
            windows: pushed,
        })
    }
}

/// Splits interleaved little-endian 16-bit PCM into per-channel windows of
/// `window_size` samples.
///
/// The stream is read in byte chunks of `window_size` frames; every channel
/// of chunk `k` becomes a window with index `k`, so channels of the same
/// chunk share a time span. A final chunk shorter than `window_size` frames
/// is dropped or zero-padded according to `tail`.
pub fn slice_windows(
    audio: &DecodedAudio,
    pitch: Pitch,
    window_size: usize,
    tail: TailPolicy,
) -> Result<Vec<SampleWindow>, AnalysisError> {
    let format = audio.format();
    format.ensure_supported()?;

    let channels = format.channels as usize;
    let bytes_per_sample = format.bytes_per_sample();
    let chunk_bytes = window_size * format.bytes_per_frame();
    let frame_bytes = format.bytes_per_frame();

    let mut windows = Vec::with_capacity(audio.bytes().len() / chunk_bytes.max(1) * channels + channels);
    for (index, chunk) in audio.bytes().chunks(chunk_bytes).enumerate() {
        let frames = chunk.len() / frame_bytes;
        if frames < window_size && (tail == TailPolicy::Drop || frames == 0) {
            break;
        }

        for channel in 0..channels {
            let mut samples = vec![0i16; window_size];
            for (frame, sample) in samples.iter_mut().enumerate().take(frames) {
                let offset = (frame * channels + channel) * bytes_per_sample;
                *sample = i16::from_le_bytes([chunk[offset], chunk[offset + 1]]);
            }
            windows.push(SampleWindow::new(
                pitch,
                channel,
                index,
                samples,
                format.sample_rate,
            ));
        }
    }
    Ok(windows)
}
