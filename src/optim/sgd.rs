use crate::layers::Edge;

/// Minibatched gradient descent with momentum and L2-style weight decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
    pub weight_decay: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64, momentum: f64, weight_decay: f64) -> Sgd {
        Sgd { learning_rate, momentum, weight_decay }
    }

    /// lr·err·in + momentum·last + decay·lr·in
    pub fn delta(&self, error: f64, input: f64, last_delta: f64) -> f64 {
        self.learning_rate * error * input
            + self.momentum * last_delta
            + self.weight_decay * self.learning_rate * input
    }

    /// Buffers this row's delta on `edge`. At a minibatch boundary
    /// (`row % minibatch == 0`) with a full window, the oldest `minibatch`
    /// deltas are averaged into the weight and the buffer is emptied first.
    /// Returns whether the weight changed.
    pub fn step(&self, edge: &mut Edge, error: f64, input: f64, row: usize, minibatch: usize) -> bool {
        let minibatch = minibatch.max(1);
        let delta = self.delta(error, input, edge.last_delta());

        let applied = row % minibatch == 0 && edge.delta_count() >= minibatch;
        if applied {
            edge.apply_deltas(minibatch);
        }
        edge.push_delta(delta);
        applied
    }

    pub fn bias_delta(&self, error: f64) -> f64 {
        self.learning_rate * error
    }
}
