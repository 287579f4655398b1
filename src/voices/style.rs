#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{rhythm::Ratio, voices};

/// The three sound styles a trainer offers, each mapped to a variant per
/// ratio (driver voices for 3:1, approach voices for 2:1).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SoundStyle {
    #[default]
    Beep,
    Whistle,
    Metronome,
}

impl SoundStyle {
    pub const ALL: [SoundStyle; 3] = [SoundStyle::Beep, SoundStyle::Whistle, SoundStyle::Metronome];

    /// Variant id this style plays under `ratio`.
    pub fn variant(self, ratio: Ratio) -> &'static str {
        match (ratio, self) {
            (Ratio::ThreeToOne, SoundStyle::Beep) => voices::DRIVER1,
            (Ratio::ThreeToOne, SoundStyle::Whistle) => voices::DRIVER2,
            (Ratio::ThreeToOne, SoundStyle::Metronome) => voices::DRIVER3,
            (Ratio::TwoToOne, SoundStyle::Beep) => voices::APPROACH1,
            (Ratio::TwoToOne, SoundStyle::Whistle) => voices::APPROACH2,
            (Ratio::TwoToOne, SoundStyle::Metronome) => voices::APPROACH3,
        }
    }

    pub fn next(self) -> Self {
        match self {
            SoundStyle::Beep => SoundStyle::Whistle,
            SoundStyle::Whistle => SoundStyle::Metronome,
            SoundStyle::Metronome => SoundStyle::Beep,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SoundStyle::Beep => "beep",
            SoundStyle::Whistle => "whistle",
            SoundStyle::Metronome => "metronome",
        }
    }
}
