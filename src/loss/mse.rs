/// Squared-error cost for regression outputs.
pub struct MseLoss;

impl MseLoss {
    /// (expected - predicted)²
    pub fn loss(expected: f64, predicted: f64) -> f64 {
        let err = expected - predicted;
        err * err
    }

    /// 2 · (predicted - expected)
    pub fn derivative(expected: f64, predicted: f64) -> f64 {
        2.0 * (predicted - expected)
    }
}
