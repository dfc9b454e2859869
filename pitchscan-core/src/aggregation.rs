//! # Aggregation Module
//!
//! The consumer side of the pipeline. The worker drains sample windows from
//! the transport queue, runs the detector on each one, then sorts and reports
//! everything it found.
//!
//! Every pitch pass has its own time axis starting at zero, so the final
//! sort by start time interleaves detections from different pitches that
//! cover the same stretch of audio. That merge is intended.

use log::debug;
use std::io::{self, Write};

use crate::Detection;
use crate::detector::SpectralDetector;
use crate::error::AnalysisError;
use crate::queue::SampleReceiver;

/// Stages the worker moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Pulling windows off the queue and detecting.
    Draining,
    /// Ordering the accumulated detections by start time.
    Sorting,
    /// Writing the report.
    Reporting,
    Done,
}

/// How the worker decides the queue is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainMode {
    /// Block until the producer closes the queue. Safe with a concurrent
    /// producer.
    UntilClosed,
    /// Stop as soon as the queue is empty. Only correct once the producer
    /// has already finished.
    UntilEmpty,
}

/// Sole consumer of the transport queue.
#[derive(Debug)]
pub struct AggregationWorker {
    detector: SpectralDetector,
    power_threshold: f64,
    state: WorkerState,
}

impl AggregationWorker {
    pub fn new(detector: SpectralDetector, power_threshold: f64) -> Self {
        AggregationWorker {
            detector,
            power_threshold,
            state: WorkerState::Draining,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    fn enter(&mut self, state: WorkerState) {
        debug!("Aggregation worker: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Detects on every window until the queue is exhausted per `mode`.
    pub fn drain(
        &mut self,
        receiver: &SampleReceiver,
        mode: DrainMode,
    ) -> Result<Vec<Detection>, AnalysisError> {
        let mut detections = Vec::new();
        let mut windows = 0usize;
        loop {
            let next = match mode {
                DrainMode::UntilClosed => receiver.recv(),
                DrainMode::UntilEmpty => receiver.get(),
            };
            let Some(window) = next else { break };
            detections.extend(self.detector.detect(&window, self.power_threshold)?);
            windows += 1;
        }
        debug!(
            "Drained {} window(s), {} detection(s)",
            windows,
            detections.len()
        );
        Ok(detections)
    }

    /// Runs the full cycle: drain, sort, report to `out`, done.
    ///
    /// Returns the sorted detections so callers can reuse them.
    pub fn run(
        &mut self,
        receiver: &SampleReceiver,
        mode: DrainMode,
        out: &mut impl Write,
    ) -> Result<Vec<Detection>, AnalysisError> {
        self.enter(WorkerState::Draining);
        let mut detections = self.drain(receiver, mode)?;

        self.enter(WorkerState::Sorting);
        sort_by_start_time(&mut detections);

        self.enter(WorkerState::Reporting);
        report(&detections, out)?;

        self.enter(WorkerState::Done);
        Ok(detections)
    }
}

/// Stable sort by start time ascending; equal times keep arrival order.
pub fn sort_by_start_time(detections: &mut [Detection]) {
    detections.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
}

/// Writes one line per detection: `[time] label (frequency) power`.
pub fn report(detections: &[Detection], out: &mut impl Write) -> io::Result<()> {
    for detection in detections {
        writeln!(out, "{}", detection)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::pitch::Pitch;
    use crate::queue::sample_queue;
    use crate::window::SampleWindow;
    use std::f64::consts::PI;

    const SIZE: usize = 4096;

    fn tone(pitch: Pitch, index: usize, bin: usize) -> SampleWindow {
        let samples = (0..SIZE)
            .map(|n| {
                let v = 0.5 * (2.0 * PI * bin as f64 * n as f64 / SIZE as f64).sin();
                (v * i16::MAX as f64).round() as i16
            })
            .collect();
        SampleWindow::new(pitch, 0, index, samples, pitch.sample_rate_for(SIZE))
    }

    fn worker() -> AggregationWorker {
        let config = AnalysisConfig::default();
        let detector = SpectralDetector::new(&config).unwrap();
        AggregationWorker::new(detector, config.power_threshold)
    }

    fn detection(start_time: f64, label: &str) -> Detection {
        Detection {
            start_time,
            label: label.to_string(),
            frequency: 55.0,
            power: 200.0,
            pitch: Pitch::A,
            harmonic: 1,
            channel: 0,
        }
    }

    #[test]
    fn sort_is_stable_for_equal_times() {
        let mut detections = vec![
            detection(0.4, "A1"),
            detection(0.0, "E1"),
            detection(0.4, "A2"),
            detection(0.0, "A1"),
        ];
        sort_by_start_time(&mut detections);
        let labels: Vec<&str> = detections.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["E1", "A1", "A1", "A2"]);
    }

    #[test]
    fn report_lines_follow_detection_format() {
        let mut out = Vec::new();
        report(&[detection(0.2, "A1")], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[0.200000] A1 (55.000000) 200\n"
        );
    }

    #[test]
    fn run_merges_independent_time_axes() {
        let (tx, rx) = sample_queue();
        // Two passes over the same audio: A windows then E windows, each
        // starting from zero.
        tx.push(tone(Pitch::A, 0, 11));
        tx.push(tone(Pitch::A, 1, 11));
        tx.push(tone(Pitch::E, 0, 11));
        tx.push(tone(Pitch::E, 1, 22));
        drop(tx);

        let mut worker = worker();
        let mut out = Vec::new();
        let detections = worker.run(&rx, DrainMode::UntilClosed, &mut out).unwrap();

        let labels: Vec<&str> = detections.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["A1", "E1", "A1", "E2"]);
        assert_eq!(worker.state(), WorkerState::Done);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 4);
    }

    #[test]
    fn until_empty_stops_on_an_open_but_empty_queue() {
        let (tx, rx) = sample_queue();
        tx.push(tone(Pitch::A, 0, 11));

        let mut worker = worker();
        let detections = worker.drain(&rx, DrainMode::UntilEmpty).unwrap();
        assert_eq!(detections.len(), 1);
        drop(tx);
    }

    #[test]
    fn silence_reports_nothing() {
        let (tx, rx) = sample_queue();
        let rate = Pitch::C.sample_rate_for(SIZE);
        for i in 0..3 {
            tx.push(SampleWindow::new(Pitch::C, 0, i, vec![0; SIZE], rate));
        }
        drop(tx);

        let mut out = Vec::new();
        let detections = worker().run(&rx, DrainMode::UntilClosed, &mut out).unwrap();
        assert!(detections.is_empty());
        assert!(out.is_empty());
    }
}
