/// Weighted connection feeding a node; owned by the destination node.
///
/// `activation` is a per-row working value staged during the forward pass.
/// `prev_deltas` buffers the deltas of the current minibatch window.
#[derive(Debug, Clone, Default)]
pub struct Edge {
    pub weight: f64,
    activation: f64,
    activated: bool,
    prev_deltas: Vec<f64>,
}

impl Edge {
    pub fn new(weight: f64) -> Edge {
        Edge { weight, ..Edge::default() }
    }

    pub fn set_activation(&mut self, value: f64) {
        self.activation = value;
        self.activated = true;
    }

    pub fn deactivate(&mut self) {
        self.activation = 0.0;
        self.activated = false;
    }

    /// Staged contribution, or `None` if nothing was staged this row.
    pub fn activation(&self) -> Option<f64> {
        self.activated.then_some(self.activation)
    }

    /// Most recently buffered delta, 0 when the window is empty.
    pub fn last_delta(&self) -> f64 {
        self.prev_deltas.last().copied().unwrap_or(0.0)
    }

    pub fn delta_count(&self) -> usize {
        self.prev_deltas.len()
    }

    pub fn push_delta(&mut self, delta: f64) {
        self.prev_deltas.push(delta);
    }

    pub fn clear_deltas(&mut self) {
        self.prev_deltas.clear();
    }

    /// Subtracts the mean of the oldest `window` buffered deltas from the
    /// weight and empties the buffer. No-op when fewer than `window` deltas
    /// are buffered.
    pub fn apply_deltas(&mut self, window: usize) {
        let window = window.max(1);
        if self.prev_deltas.len() < window {
            return;
        }
        let mean = self.prev_deltas[..window].iter().sum::<f64>() / window as f64;
        self.weight -= mean;
        self.prev_deltas.clear();
    }
}
