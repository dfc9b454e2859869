//! # Pipeline Module
//!
//! Wires ingestion, the transport queue and the aggregation worker together.
//!
//! ## Architecture
//! - **Producer**: ingestion, one pass per pitch, on a scoped thread
//! - **Consumer**: the aggregation worker on the calling thread
//! - **Communication**: the transport queue; dropping the producer's sender
//!   closes it and ends the consumer's drain

use anyhow::{Context, Result, anyhow};
use log::info;
use std::io::Write;
use std::thread;

use crate::aggregation::{AggregationWorker, DrainMode};
use crate::audio::{AudioSource, Resample};
use crate::config::AnalysisConfig;
use crate::detector::SpectralDetector;
use crate::ingest::{IngestSummary, Ingestor};
use crate::queue::sample_queue;
use crate::Detection;

/// How producer and consumer are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// Ingestion and aggregation overlap on two threads.
    #[default]
    Concurrent,
    /// Ingestion runs to completion, then the worker drains the queue.
    Sequential,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Detections sorted by start time.
    pub detections: Vec<Detection>,
    pub summary: IngestSummary,
}

/// A configured analysis run.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: AnalysisConfig,
    schedule: Schedule,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Pipeline {
            config,
            schedule: Schedule::default(),
        }
    }

    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyses `source`, writing the report to `out`.
    ///
    /// Configuration and format errors abort before any window is produced.
    /// Failed pitch passes are listed in the returned summary.
    pub fn run<S, R, W>(&self, source: &S, resampler: &R, out: &mut W) -> Result<PipelineOutput>
    where
        S: AudioSource + Sync,
        R: Resample + Sync,
        W: Write,
    {
        let detector =
            SpectralDetector::new(&self.config).context("Invalid analysis configuration")?;
        let ingestor = Ingestor::new(self.config.clone());
        ingestor
            .prepare(source)
            .context("Audio source cannot be analysed")?;

        let mut worker = AggregationWorker::new(detector, self.config.power_threshold);
        let (sender, receiver) = sample_queue();

        let (detections, summary) = match self.schedule {
            Schedule::Concurrent => thread::scope(|scope| -> Result<_> {
                let producer = scope.spawn(|| ingestor.run(source, resampler, sender));
                let detections = worker.run(&receiver, DrainMode::UntilClosed, out);
                // Unblocks the producer if the worker bailed out early.
                drop(receiver);
                let summary = producer
                    .join()
                    .map_err(|_| anyhow!("Ingestion thread panicked"))?
                    .context("Ingestion failed")?;
                Ok((detections.context("Analysis failed")?, summary))
            })?,
            Schedule::Sequential => {
                let summary = ingestor
                    .run(source, resampler, sender)
                    .context("Ingestion failed")?;
                let detections = worker
                    .run(&receiver, DrainMode::UntilEmpty, out)
                    .context("Analysis failed")?;
                (detections, summary)
            }
        };

        info!(
            "Reported {} detection(s) from {} window(s)",
            detections.len(),
            summary.total_windows()
        );
        Ok(PipelineOutput {
            detections,
            summary,
        })
    }
}
