use crate::rhythm::ratio::Ratio;

/// One scheduled beat, as handed to listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beat {
    /// Position within the cycle, `0..cycle_length`.
    pub index: usize,
    /// Last beat of the cycle.
    pub is_impact: bool,
    /// Cycle counter since `start()`, from 0.
    pub cycle: u64,
    /// Audio-clock time the beat sounds at, in seconds.
    pub time: f64,
}

/// Position within a repeating cycle of beats.
///
/// `index` is always `< length`, and `index == length - 1` is the impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatCycle {
    index: usize,
    length: usize,
}

impl BeatCycle {
    pub fn new(ratio: Ratio) -> Self {
        Self {
            index: 0,
            length: ratio.cycle_length(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_impact(&self) -> bool {
        self.index == self.length - 1
    }

    /// Move to the next beat. Returns `true` when the cycle wrapped to 0.
    pub fn advance(&mut self) -> bool {
        self.index += 1;
        if self.index >= self.length {
            self.index = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Switch cycle length now, clamping the position into the new cycle.
    pub fn set_ratio(&mut self, ratio: Ratio) {
        self.length = ratio.cycle_length();
        self.index = self.index.min(self.length - 1);
    }
}
