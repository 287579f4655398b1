use std::{collections::HashMap, fmt, sync::Arc};

use crate::{synth::Patch, voices};

/// A synthesis function: `is_impact` → cue.
pub type SynthFn = dyn Fn(bool) -> Patch + Send + Sync;

/// Sound variants by identifier.
///
/// The scheduler only ever asks the registry for a patch, so new variants
/// can be added without touching it:
///
/// ```ignore
/// let mut sounds = SoundRegistry::builtin();
/// sounds.register("woodblock", |is_impact| {
///     Patch::new(OscNode::triangle().with_frequency(if is_impact { 900.0 } else { 600.0 })
///         .amplify(EnvNode::decay(0.5, 0.08)), 0.1)
/// });
/// ```
///
/// Lookups of unknown identifiers resolve to the fallback variant.
#[derive(Clone)]
pub struct SoundRegistry {
    sounds: HashMap<String, Arc<SynthFn>>,
    fallback: String,
}

impl SoundRegistry {
    /// Registry with no variants. `fallback` is used for unknown ids once it
    /// is registered.
    pub fn empty(fallback: impl Into<String>) -> Self {
        Self {
            sounds: HashMap::new(),
            fallback: fallback.into(),
        }
    }

    /// The six built-in variants, falling back to `driver1`.
    pub fn builtin() -> Self {
        let mut registry = Self::empty(voices::DRIVER1);
        registry
            .register(voices::DRIVER1, voices::titanium)
            .register(voices::DRIVER2, voices::carbon)
            .register(voices::DRIVER3, voices::pro_rhythm)
            .register(voices::APPROACH1, voices::wedge)
            .register(voices::APPROACH2, voices::soft_touch)
            .register(voices::APPROACH3, voices::precision);
        registry
    }

    /// Add or replace a variant.
    pub fn register<F>(&mut self, id: impl Into<String>, synth: F) -> &mut Self
    where
        F: Fn(bool) -> Patch + Send + Sync + 'static,
    {
        self.sounds.insert(id.into(), Arc::new(synth));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sounds.contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sounds.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// The identifier a lookup of `id` actually plays.
    pub fn resolve<'a>(&'a self, id: &'a str) -> Option<&'a str> {
        if self.contains(id) {
            Some(id)
        } else if self.contains(&self.fallback) {
            Some(&self.fallback)
        } else {
            None
        }
    }

    /// Build the cue `id` plays for a beat.
    pub fn patch(&self, id: &str, is_impact: bool) -> Option<Patch> {
        let synth = self
            .sounds
            .get(id)
            .or_else(|| self.sounds.get(&self.fallback))?;
        Some(synth(is_impact))
    }
}

impl Default for SoundRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for SoundRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundRegistry")
            .field("ids", &self.ids())
            .field("fallback", &self.fallback)
            .finish()
    }
}
