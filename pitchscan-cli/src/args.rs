//! Command-line arguments.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use pitchscan_core::{Pitch, TailPolicy};

/// Detect guitar-string pitches and their octave harmonics in a WAV file.
#[derive(Debug, Parser)]
#[command(name = "pitchscan", version, about)]
pub struct Args {
    /// 16-bit PCM WAV file to analyse.
    pub input: PathBuf,

    /// JSON file with analysis settings; flags below override it.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Samples per analysis window (power of two).
    #[arg(short, long)]
    pub window_size: Option<usize>,

    /// Minimum bin magnitude reported as a detection.
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// What to do with an incomplete final window.
    #[arg(long, value_enum)]
    pub tail: Option<Tail>,

    /// Comma-separated pitches to scan, e.g. `E,A,D,G,B`.
    #[arg(short, long, value_delimiter = ',')]
    pub pitches: Option<Vec<Pitch>>,

    /// Print detections as JSON instead of text lines.
    #[arg(long)]
    pub json: bool,

    /// Finish ingestion before starting detection.
    #[arg(long)]
    pub sequential: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tail {
    Drop,
    ZeroPad,
}

impl From<Tail> for TailPolicy {
    fn from(tail: Tail) -> Self {
        match tail {
            Tail::Drop => TailPolicy::Drop,
            Tail::ZeroPad => TailPolicy::ZeroPad,
        }
    }
}
