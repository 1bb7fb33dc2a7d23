/// Stopping policy checked once per epoch.
///
/// Each condition is disabled while its value is zero (or negative for
/// accuracy); with all of them disabled the policy never fires.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Terminator {
    /// Fires when the unix time in seconds is a multiple of this.
    pub timestamp: u64,
    /// Fires when the epoch count is a multiple of this.
    pub epoch: u64,
    /// Fires once accuracy (percent) reaches this.
    pub accuracy: f64,
}

impl Terminator {
    pub fn new() -> Terminator {
        Terminator::default()
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Terminator {
        self.timestamp = timestamp;
        self
    }

    pub fn with_epoch(mut self, epoch: u64) -> Terminator {
        self.epoch = epoch;
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Terminator {
        self.accuracy = accuracy;
        self
    }

    pub fn triggered(&self, now: u64, epoch: u64, accuracy: f64) -> bool {
        (self.timestamp > 0 && now % self.timestamp == 0)
            || (self.epoch > 0 && epoch % self.epoch == 0)
            || (self.accuracy > 0.0 && accuracy >= self.accuracy)
    }
}
