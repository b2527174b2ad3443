//! Frequency values with unit parsing, display, and period conversion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A frequency value stored in Hertz.
///
/// Parses strings like "50MHz", "100KHz", "1GHz", "48000Hz" and bare numbers
/// (interpreted as Hz). A critical path delay converts into the highest clock
/// frequency it allows through [`Frequency::from_period_ns`].
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Frequency(f64);

impl Frequency {
    /// Creates a new frequency from a value in Hertz.
    pub fn new(hz: f64) -> Self {
        Self(hz)
    }

    /// Returns the frequency whose period is `period_ns` nanoseconds.
    ///
    /// Returns `None` for non-positive or non-finite periods.
    pub fn from_period_ns(period_ns: f64) -> Option<Self> {
        if period_ns.is_finite() && period_ns > 0.0 {
            Some(Self(1_000_000_000.0 / period_ns))
        } else {
            None
        }
    }

    /// Returns the clock period in nanoseconds.
    pub fn period_ns(&self) -> f64 {
        1_000_000_000.0 / self.0
    }

    /// Returns the frequency in Hertz.
    pub fn hz(&self) -> f64 {
        self.0
    }

    /// Returns the frequency in kilohertz.
    pub fn khz(&self) -> f64 {
        self.0 / 1_000.0
    }

    /// Returns the frequency in megahertz.
    pub fn mhz(&self) -> f64 {
        self.0 / 1_000_000.0
    }

    /// Returns the frequency in gigahertz.
    pub fn ghz(&self) -> f64 {
        self.0 / 1_000_000_000.0
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({self})")
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.0;
        if hz >= 1_000_000_000.0 {
            write!(f, "{:.3}GHz", hz / 1_000_000_000.0)
        } else if hz >= 1_000_000.0 {
            write!(f, "{:.3}MHz", hz / 1_000_000.0)
        } else if hz >= 1_000.0 {
            write!(f, "{:.3}KHz", hz / 1_000.0)
        } else {
            write!(f, "{hz:.3}Hz")
        }
    }
}

/// Error type for parsing frequency strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid frequency: '{input}'")]
pub struct ParseFrequencyError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseFrequencyError {
            input: s.to_string(),
        };

        const SUFFIXES: [(&str, f64); 4] = [
            ("ghz", 1_000_000_000.0),
            ("mhz", 1_000_000.0),
            ("khz", 1_000.0),
            ("hz", 1.0),
        ];

        let lower = s.to_ascii_lowercase();
        let (num, scale) = SUFFIXES
            .iter()
            .find_map(|(suffix, scale)| lower.strip_suffix(suffix).map(|n| (n, *scale)))
            .unwrap_or((lower.as_str(), 1.0));

        let val: f64 = num.trim().parse().map_err(|_| err())?;
        if !val.is_finite() || val <= 0.0 {
            return Err(err());
        }
        Ok(Frequency(val * scale))
    }
}
