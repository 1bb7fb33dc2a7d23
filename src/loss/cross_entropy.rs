/// Binary cross-entropy cost for classification outputs.
pub struct CrossEntropyLoss;

/// Predictions are clamped into [EPS, 1 - EPS] before any log or division.
pub(crate) const EPS: f64 = 1e-7;

pub(crate) fn clamp_probability(p: f64) -> f64 {
    p.clamp(EPS, 1.0 - EPS)
}

impl CrossEntropyLoss {
    /// -(e·ln(p) + (1 - e)·ln(1 - p))
    pub fn loss(expected: f64, predicted: f64) -> f64 {
        let p = clamp_probability(predicted);
        -(expected * p.ln() + (1.0 - expected) * (1.0 - p).ln())
    }

    /// Gradient w.r.t. the prediction:
    ///   (p - e) / ((1 - p) · p)
    pub fn derivative(expected: f64, predicted: f64) -> f64 {
        let p = clamp_probability(predicted);
        (p - expected) / ((1.0 - p) * p)
    }
}
