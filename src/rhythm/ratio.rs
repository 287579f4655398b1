use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::ParseRatioError, rhythm::tempo::TempoRange};

/// Backswing-to-downswing timing ratio.
///
/// The ratio fixes how many beats make up one swing cycle. The last beat of
/// the cycle is the impact:
///
/// ```text
/// 3:1   0 ── 1 ── 2 ── [3]   (three approach beats, then impact)
/// 2:1   0 ── 1 ── [2]        (two approach beats, then impact)
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ratio {
    /// Full swing (driver). Four beats per cycle.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "3:1"))]
    ThreeToOne,
    /// Short game (approach). Three beats per cycle.
    #[cfg_attr(feature = "serde", serde(rename = "2:1"))]
    TwoToOne,
}

impl Ratio {
    /// Number of beats in one cycle.
    pub const fn cycle_length(self) -> usize {
        match self {
            Ratio::ThreeToOne => 4,
            Ratio::TwoToOne => 3,
        }
    }

    /// Index of the impact beat, always the last of the cycle.
    pub const fn impact_index(self) -> usize {
        self.cycle_length() - 1
    }

    /// Tempo range a trainer offers for this ratio. The default is the
    /// reference tempo of a tour-level swing.
    pub const fn tempo_range(self) -> TempoRange {
        match self {
            Ratio::ThreeToOne => TempoRange {
                min: 70.0,
                max: 210.0,
                default: 207.0,
            },
            Ratio::TwoToOne => TempoRange {
                min: 70.0,
                max: 170.0,
                default: 118.0,
            },
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Ratio::ThreeToOne => Ratio::TwoToOne,
            Ratio::TwoToOne => Ratio::ThreeToOne,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Ratio::ThreeToOne => "3:1",
            Ratio::TwoToOne => "2:1",
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ratio {
    type Err = ParseRatioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "3:1" => Ok(Ratio::ThreeToOne),
            "2:1" => Ok(Ratio::TwoToOne),
            other => Err(ParseRatioError(other.to_string())),
        }
    }
}
