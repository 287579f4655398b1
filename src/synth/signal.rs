/// A rendered mono cue, ready to be mixed at a given start frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signal {
    samples: Vec<f32>,
}

impl Signal {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// `frames` samples of digital silence.
    pub fn silence(frames: usize) -> Self {
        Self {
            samples: vec![0.0; frames],
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, x| acc.max(x.abs()))
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

impl From<Vec<f32>> for Signal {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}
