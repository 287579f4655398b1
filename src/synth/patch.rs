use crate::graph::node::GraphNode;

/// A one-shot cue: a graph, how long it sounds, and how much of it is sent
/// to the room.
///
/// The graph is rendered from its trigger for `length` seconds and then cut,
/// the way a scheduled source is stopped at `start + length`.
pub struct Patch {
    node: Box<dyn GraphNode>,
    length: f32,
    reverb_send: Option<f32>,
}

impl Patch {
    pub fn new(node: impl GraphNode + 'static, length: f32) -> Self {
        Self {
            node: Box::new(node),
            length: length.max(0.0),
            reverb_send: None,
        }
    }

    /// Route an attenuated copy of the dry cue through the room response.
    pub fn with_reverb(mut self, send: f32) -> Self {
        self.reverb_send = Some(send.max(0.0));
        self
    }

    /// Seconds between trigger and stop.
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn reverb_send(&self) -> Option<f32> {
        self.reverb_send
    }

    /// Number of frames the dry cue covers at `sample_rate`.
    pub fn frames(&self, sample_rate: f32) -> usize {
        (self.length * sample_rate).round() as usize
    }

    pub(crate) fn node_mut(&mut self) -> &mut dyn GraphNode {
        self.node.as_mut()
    }
}

impl std::fmt::Debug for Patch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Patch")
            .field("length", &self.length)
            .field("reverb_send", &self.reverb_send)
            .finish_non_exhaustive()
    }
}
