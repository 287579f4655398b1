//! Built-in sound variants.
//!
//! Each variant is a synthesis function `is_impact → Patch` built entirely
//! from oscillators, noise, a filter and exponential ramps. The registry maps
//! identifiers to these functions.
//!
//! | id          | voice       | impact                        | approach        |
//! |-------------|-------------|-------------------------------|-----------------|
//! | `driver1`   | titanium    | swept sine ping + reverb      | high tick       |
//! | `driver2`   | carbon      | falling saw whoosh + reverb   | square beep     |
//! | `driver3`   | pro-rhythm  | 1.2 kHz sine + reverb         | 800 Hz sine     |
//! | `approach1` | wedge       | high-passed noise + reverb    | triangle click  |
//! | `approach2` | soft-touch  | 1.2 kHz sine bell + reverb    | 800 Hz sine     |
//! | `approach3` | precision   | 1.5 kHz square                | 1 kHz square    |
//!
//! # Example
//!
//! ```ignore
//! use swing_tempo::voices::{self, SoundRegistry};
//!
//! let sounds = SoundRegistry::builtin();
//! let impact = sounds.patch(voices::DRIVER1, true);
//! ```

mod carbon;
mod precision;
mod pro_rhythm;
mod registry;
mod soft_touch;
mod style;
mod ticks;
mod titanium;
mod wedge;

pub use carbon::carbon;
pub use precision::precision;
pub use pro_rhythm::pro_rhythm;
pub use registry::{SoundRegistry, SynthFn};
pub use soft_touch::soft_touch;
pub use style::SoundStyle;
pub use ticks::{click, high_tick};
pub use titanium::titanium;
pub use wedge::wedge;

pub const DRIVER1: &str = "driver1";
pub const DRIVER2: &str = "driver2";
pub const DRIVER3: &str = "driver3";
pub const APPROACH1: &str = "approach1";
pub const APPROACH2: &str = "approach2";
pub const APPROACH3: &str = "approach3";

/// Level of the parallel room send on reverberant cues.
pub const REVERB_SEND: f32 = 0.2;
