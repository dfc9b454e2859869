//! # Audio Source Module
//!
//! This module provides the decode and resample collaborators used by
//! ingestion. Audio travels between them as interleaved little-endian 16-bit
//! PCM bytes together with its format, so the ingestion stage can slice raw
//! byte chunks exactly as they would come off a PCM stream.
//!
//! ## Features
//! - WAV decoding through `hound`
//! - In-memory sources for synthetic signals
//! - Band-limited sinc resampling through `rubato`

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::{Path, PathBuf};

use crate::error::AnalysisError;

/// Bit depth accepted by the analysis pipeline.
pub const SUPPORTED_BITS_PER_SAMPLE: u16 = 16;

/// Number of input frames fed to the resampler per call.
const RESAMPLE_CHUNK_FRAMES: usize = 1024;

/// Layout of a PCM stream. Byte order is always little-endian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcmFormat {
    pub sample_rate: f64,
    pub bits_per_sample: u16,
    pub channels: u16,
}

impl PcmFormat {
    /// Bytes taken by one sample of one channel.
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample as usize).div_ceil(8)
    }

    /// Bytes taken by one frame (one sample of every channel).
    pub fn bytes_per_frame(&self) -> usize {
        self.bytes_per_sample() * self.channels as usize
    }

    /// Fails unless this is 16-bit PCM with at least one channel.
    pub fn ensure_supported(&self) -> Result<(), AnalysisError> {
        if self.bits_per_sample != SUPPORTED_BITS_PER_SAMPLE {
            return Err(AnalysisError::UnsupportedBitDepth(self.bits_per_sample));
        }
        if self.channels == 0 {
            return Err(AnalysisError::NoChannels);
        }
        Ok(())
    }
}

/// A fully decoded PCM stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    format: PcmFormat,
    data: Vec<u8>,
}

impl DecodedAudio {
    /// Encodes interleaved 16-bit samples as little-endian bytes.
    pub fn from_interleaved(sample_rate: f64, channels: u16, samples: &[i16]) -> Self {
        let data = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        DecodedAudio {
            format: PcmFormat {
                sample_rate,
                bits_per_sample: SUPPORTED_BITS_PER_SAMPLE,
                channels,
            },
            data,
        }
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Raw interleaved little-endian bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of complete frames in the stream.
    pub fn frames(&self) -> usize {
        match self.format.bytes_per_frame() {
            0 => 0,
            bytes => self.data.len() / bytes,
        }
    }

    /// One vector per channel, scaled into `[-1, 1]`.
    fn to_planar(&self) -> Vec<Vec<f64>> {
        let channels = self.format.channels as usize;
        let mut planar = vec![Vec::with_capacity(self.frames()); channels];
        for (i, pair) in self.data.chunks_exact(2).enumerate() {
            let sample = i16::from_le_bytes([pair[0], pair[1]]);
            planar[i % channels].push(sample as f64 / i16::MAX as f64);
        }
        planar
    }

    /// Re-interleaves planar channels back into 16-bit PCM at `sample_rate`.
    fn from_planar(sample_rate: f64, planar: &[Vec<f64>]) -> Self {
        let frames = planar.iter().map(Vec::len).min().unwrap_or(0);
        let mut samples = Vec::with_capacity(frames * planar.len());
        for frame in 0..frames {
            for channel in planar {
                let scaled = (channel[frame] * i16::MAX as f64).round();
                samples.push(scaled.clamp(i16::MIN as f64, i16::MAX as f64) as i16);
            }
        }
        DecodedAudio::from_interleaved(sample_rate, planar.len() as u16, &samples)
    }
}

/// Something that can be decoded, once per pitch pass, into PCM.
pub trait AudioSource {
    /// Reports the stream layout without decoding the samples.
    fn format(&self) -> Result<PcmFormat, AnalysisError>;

    /// Decodes the whole stream.
    fn decode(&self) -> Result<DecodedAudio, AnalysisError>;
}

/// A WAV file on disk.
#[derive(Debug, Clone)]
pub struct WavSource {
    path: PathBuf,
}

impl WavSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        WavSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioSource for WavSource {
    fn format(&self) -> Result<PcmFormat, AnalysisError> {
        let reader = hound::WavReader::open(&self.path)?;
        let spec = reader.spec();
        Ok(PcmFormat {
            sample_rate: spec.sample_rate as f64,
            bits_per_sample: spec.bits_per_sample,
            channels: spec.channels,
        })
    }

    fn decode(&self) -> Result<DecodedAudio, AnalysisError> {
        let mut reader = hound::WavReader::open(&self.path)?;
        let spec = reader.spec();
        if spec.sample_format != hound::SampleFormat::Int
            || spec.bits_per_sample != SUPPORTED_BITS_PER_SAMPLE
        {
            return Err(AnalysisError::UnsupportedBitDepth(spec.bits_per_sample));
        }

        let samples = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;
        Ok(DecodedAudio::from_interleaved(
            spec.sample_rate as f64,
            spec.channels,
            &samples,
        ))
    }
}

/// Interleaved 16-bit samples held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    audio: DecodedAudio,
}

impl MemorySource {
    pub fn new(sample_rate: f64, channels: u16, samples: Vec<i16>) -> Self {
        MemorySource {
            audio: DecodedAudio::from_interleaved(sample_rate, channels, &samples),
        }
    }
}

impl AudioSource for MemorySource {
    fn format(&self) -> Result<PcmFormat, AnalysisError> {
        Ok(self.audio.format())
    }

    fn decode(&self) -> Result<DecodedAudio, AnalysisError> {
        Ok(self.audio.clone())
    }
}

/// Converts a PCM stream to another sample rate, keeping bit depth and
/// channel count.
pub trait Resample {
    fn resample(&self, audio: DecodedAudio, target_rate: f64) -> Result<DecodedAudio, AnalysisError>;
}

/// Sinc-interpolating resampler backed by `rubato::SincFixedIn`.
#[derive(Debug, Clone)]
pub struct SincResampler {
    sinc_len: usize,
    oversampling_factor: usize,
    f_cutoff: f32,
}

impl Default for SincResampler {
    fn default() -> Self {
        SincResampler {
            sinc_len: 256,
            oversampling_factor: 256,
            f_cutoff: 0.95,
        }
    }
}

impl SincResampler {
    fn parameters(&self) -> SincInterpolationParameters {
        SincInterpolationParameters {
            sinc_len: self.sinc_len,
            f_cutoff: self.f_cutoff,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: self.oversampling_factor,
            window: WindowFunction::BlackmanHarris2,
        }
    }
}

impl Resample for SincResampler {
    fn resample(&self, audio: DecodedAudio, target_rate: f64) -> Result<DecodedAudio, AnalysisError> {
        let format = audio.format();
        format.ensure_supported()?;
        if !(target_rate.is_finite() && target_rate > 0.0) {
            return Err(AnalysisError::Resample(format!(
                "invalid target rate {target_rate}"
            )));
        }
        if (target_rate - format.sample_rate).abs() <= f64::EPSILON * target_rate {
            return Ok(audio);
        }

        let ratio = target_rate / format.sample_rate;
        let channels = format.channels as usize;
        let input = audio.to_planar();
        let frames = audio.frames();
        let expected = (frames as f64 * ratio).round() as usize;

        let mut resampler = SincFixedIn::<f64>::new(
            ratio,
            1.0,
            self.parameters(),
            RESAMPLE_CHUNK_FRAMES,
            channels,
        )?;
        let delay = resampler.output_delay();
        let mut output: Vec<Vec<f64>> = vec![Vec::with_capacity(expected + delay); channels];

        let mut position = 0;
        while position < frames {
            let end = (position + RESAMPLE_CHUNK_FRAMES).min(frames);
            let chunk: Vec<&[f64]> = input.iter().map(|c| &c[position..end]).collect();
            let produced = if end - position == RESAMPLE_CHUNK_FRAMES {
                resampler.process(chunk.as_slice(), None)?
            } else {
                resampler.process_partial(Some(chunk.as_slice()), None)?
            };
            append(&mut output, produced);
            position = end;
        }

        // Flush the filter's delay line with silence until the tail is out.
        while output[0].len() < expected + delay {
            let produced = resampler.process_partial(None::<&[Vec<f64>]>, None)?;
            if produced[0].is_empty() {
                break;
            }
            append(&mut output, produced);
        }

        for channel in &mut output {
            channel.drain(..delay.min(channel.len()));
            channel.truncate(expected);
        }
        Ok(DecodedAudio::from_planar(target_rate, &output))
    }
}

fn append(output: &mut [Vec<f64>], produced: Vec<Vec<f64>>) {
    for (dst, src) in output.iter_mut().zip(produced) {
        dst.extend(src);
    }
}
