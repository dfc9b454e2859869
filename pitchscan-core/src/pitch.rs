//! # Pitch Catalog Module
//!
//! The fixed table of target pitch classes. Each pitch carries a frequency
//! step and a fundamental bin: resampling the source to
//! `step * window_size` puts the fundamental exactly on that bin, and because
//! the window size stays fixed, every octave harmonic lands on
//! `fundamental_bin * 2^i`.
//!
//! ## Features
//! - Twelve pitch classes, C through B, in declaration order
//! - Target sample rate derivation for a window size
//! - Harmonic bin enumeration (fundamental plus four octaves)
//! - Name parsing with sharp aliases

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Number of bins scanned per pitch: the fundamental and four octave harmonics.
pub const HARMONIC_COUNT: u32 = 5;

/// One of the twelve semitone classes scanned by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pitch {
    C,
    Db,
    D,
    Eb,
    E,
    F,
    Gb,
    G,
    Ab,
    A,
    Bb,
    B,
}

impl Pitch {
    /// Every pitch, in catalog order. Ingestion walks this order.
    pub const ALL: [Pitch; 12] = [
        Pitch::C,
        Pitch::Db,
        Pitch::D,
        Pitch::Eb,
        Pitch::E,
        Pitch::F,
        Pitch::Gb,
        Pitch::G,
        Pitch::Ab,
        Pitch::A,
        Pitch::Bb,
        Pitch::B,
    ];

    /// Hz per transform bin once the audio is resampled for this pitch.
    pub const fn base_frequency_step(self) -> f64 {
        match self {
            Pitch::C => 2.973095938,
            Pitch::Db => 3.149876222,
            Pitch::D => 3.337167863,
            Pitch::Eb => 3.535595864,
            Pitch::E => 3.745822394,
            Pitch::F => 3.968548993,
            Pitch::Gb => 4.204518916,
            Pitch::G => 7.0,
            Pitch::Ab => 4.719385347,
            Pitch::A => 5.0,
            Pitch::Bb => 5.2973,
            Pitch::B => 5.612277458,
        }
    }

    /// The bin the fundamental must land on after resampling.
    pub const fn fundamental_bin(self) -> usize {
        match self {
            Pitch::G => 7,
            _ => 11,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Pitch::C => "C",
            Pitch::Db => "Db",
            Pitch::D => "D",
            Pitch::Eb => "Eb",
            Pitch::E => "E",
            Pitch::F => "F",
            Pitch::Gb => "Gb",
            Pitch::G => "G",
            Pitch::Ab => "Ab",
            Pitch::A => "A",
            Pitch::Bb => "Bb",
            Pitch::B => "B",
        }
    }

    /// Frequency of the fundamental in Hz.
    pub fn fundamental_frequency(self) -> f64 {
        self.base_frequency_step() * self.fundamental_bin() as f64
    }

    /// Sample rate that aligns this pitch's harmonics with bins of a
    /// `window_size`-point transform.
    pub fn sample_rate_for(self, window_size: usize) -> f64 {
        self.base_frequency_step() * window_size as f64
    }

    /// Bin index of harmonic `order` (0 = fundamental).
    pub fn harmonic_bin(self, order: u32) -> usize {
        self.fundamental_bin() << order
    }

    /// Bins of the fundamental and its four octave harmonics.
    pub fn harmonic_bins(self) -> impl Iterator<Item = usize> {
        (0..HARMONIC_COUNT).map(move |order| self.harmonic_bin(order))
    }

    /// Checks that the highest scanned harmonic stays below the Nyquist bin.
    pub fn check_harmonic_range(self, window_size: usize) -> Result<(), AnalysisError> {
        let top_bin = self.harmonic_bin(HARMONIC_COUNT - 1);
        if top_bin >= window_size / 2 {
            return Err(AnalysisError::HarmonicOutOfRange {
                pitch: self,
                bin: top_bin,
                window_size,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercase name lookup, including sharp spellings of the flat classes.
static PITCH_NAMES: Lazy<BTreeMap<String, Pitch>> = Lazy::new(|| {
    const SHARPS: [(&str, Pitch); 5] = [
        ("c#", Pitch::Db),
        ("d#", Pitch::Eb),
        ("f#", Pitch::Gb),
        ("g#", Pitch::Ab),
        ("a#", Pitch::Bb),
    ];
    Pitch::ALL
        .iter()
        .map(|&pitch| (pitch.name().to_ascii_lowercase(), pitch))
        .chain(SHARPS.iter().map(|&(name, pitch)| (name.to_string(), pitch)))
        .collect()
});

impl FromStr for Pitch {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PITCH_NAMES
            .get(&s.trim().to_ascii_lowercase())
            .copied()
            .ok_or_else(|| AnalysisError::UnknownPitch(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_over_window_size_is_the_step() {
        for window_size in [1024usize, 4096, 16384] {
            for pitch in Pitch::ALL {
                let ratio = pitch.sample_rate_for(window_size) / window_size as f64;
                assert!(
                    (ratio - pitch.base_frequency_step()).abs() < 1e-9,
                    "{pitch} at {window_size}"
                );
            }
        }
    }

    #[test]
    fn harmonic_bins_fit_below_nyquist_for_default_window() {
        for pitch in Pitch::ALL {
            for bin in pitch.harmonic_bins() {
                assert!(bin < 4096 / 2, "{pitch} bin {bin}");
            }
            assert!(pitch.check_harmonic_range(4096).is_ok());
        }
    }

    #[test]
    fn harmonic_bins_double_each_octave() {
        let bins: Vec<usize> = Pitch::A.harmonic_bins().collect();
        assert_eq!(bins, vec![11, 22, 44, 88, 176]);
        let bins: Vec<usize> = Pitch::G.harmonic_bins().collect();
        assert_eq!(bins, vec![7, 14, 28, 56, 112]);
    }

    #[test]
    fn small_window_rejects_top_harmonic() {
        // 11 * 16 = 176 is past the Nyquist bin of a 256-point window.
        let err = Pitch::A.check_harmonic_range(256).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::HarmonicOutOfRange { bin: 176, window_size: 256, .. }
        ));
        assert!(Pitch::A.check_harmonic_range(512).is_ok());
    }

    #[test]
    fn guitar_string_fundamentals() {
        assert!((Pitch::A.fundamental_frequency() - 55.0).abs() < 1e-9);
        assert!((Pitch::E.fundamental_frequency() - 41.2040).abs() < 1e-3);
        assert!((Pitch::G.fundamental_frequency() - 49.0).abs() < 1e-9);
    }

    #[test]
    fn parses_names_and_sharp_aliases() {
        assert_eq!("A".parse::<Pitch>().unwrap(), Pitch::A);
        assert_eq!("bb".parse::<Pitch>().unwrap(), Pitch::Bb);
        assert_eq!("F#".parse::<Pitch>().unwrap(), Pitch::Gb);
        assert!("H".parse::<Pitch>().is_err());
    }

    #[test]
    fn catalog_order_is_chromatic() {
        let names: Vec<&str> = Pitch::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"]
        );
    }
}
