//! # pitchscan - Harmonic Pitch Scanner
//!
//! Command-line frontend for `pitchscan-core`. Reads a WAV file, runs one
//! resampled pass per target pitch, and prints every harmonic found above
//! the power threshold in time order.
//!
//! ## Architecture
//! - **Producer thread**: per-pitch decode, resample and windowing
//! - **Main thread**: detection, sorting and reporting
//! - **Communication**: the core's transport queue

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use args::Args;
use pitchscan_core::AnalysisConfig;
use pitchscan_core::audio::{SincResampler, WavSource};
use pitchscan_core::pipeline::{Pipeline, Schedule};

/// Main entry point for the pitchscan binary.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = build_config(&args)?;
    info!(
        "Scanning {} with window {} and threshold {}",
        args.input.display(),
        config.window_size,
        config.power_threshold
    );

    let schedule = if args.sequential {
        Schedule::Sequential
    } else {
        Schedule::Concurrent
    };
    let source = WavSource::new(&args.input);
    let pipeline = Pipeline::new(config).schedule(schedule);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let output = if args.json {
        let output = pipeline.run(&source, &SincResampler::default(), &mut io::sink())?;
        serde_json::to_writer_pretty(&mut out, &output.detections)
            .context("Failed to write JSON report")?;
        writeln!(out)?;
        output
    } else {
        pipeline.run(&source, &SincResampler::default(), &mut out)?
    };

    for (pitch, reason) in &output.summary.failed {
        warn!("No results for {}: {}", pitch, reason);
    }
    Ok(())
}

/// Sets up `env_logger`; `RUST_LOG` wins over the verbosity flag.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Loads the optional config file, then applies command-line overrides.
fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(window_size) = args.window_size {
        config.window_size = window_size;
    }
    if let Some(threshold) = args.threshold {
        config.power_threshold = threshold;
    }
    if let Some(tail) = args.tail {
        config.tail_policy = tail.into();
    }
    if let Some(pitches) = &args.pitches {
        config.pitches = pitches.clone();
    }

    config.validate().context("Invalid analysis configuration")?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchscan_core::{Pitch, TailPolicy};

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = build_config(&parse(&["pitchscan", "in.wav"])).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "pitchscan",
            "in.wav",
            "--window-size",
            "8192",
            "--threshold",
            "50",
            "--tail",
            "zero-pad",
            "--pitches",
            "E,A,f#",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.window_size, 8192);
        assert_eq!(config.power_threshold, 50.0);
        assert_eq!(config.tail_policy, TailPolicy::ZeroPad);
        assert_eq!(config.pitches, vec![Pitch::E, Pitch::A, Pitch::Gb]);
    }

    #[test]
    fn invalid_window_size_is_reported() {
        let args = parse(&["pitchscan", "in.wav", "--window-size", "1000"]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn config_file_is_merged_under_flags() {
        let path = std::env::temp_dir().join(format!("pitchscan-cli-{}.json", std::process::id()));
        fs::write(&path, r#"{ "window_size": 16384, "power_threshold": 20.0, "pitches": ["G"] }"#)
            .unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let args = parse(&["pitchscan", "in.wav", "--config", &path_arg, "--threshold", "30"]);
        let config = build_config(&args).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.window_size, 16384);
        assert_eq!(config.power_threshold, 30.0);
        assert_eq!(config.pitches, vec![Pitch::G]);
        assert_eq!(config.tail_policy, TailPolicy::Drop);
    }
}
