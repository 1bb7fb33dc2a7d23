use super::cross_entropy::clamp_probability;

/// Kullback-Leibler divergence term for a single output.
pub struct KlDivergence;

impl KlDivergence {
    /// e · ln(e / p); zero when the expected mass is zero.
    pub fn loss(expected: f64, predicted: f64) -> f64 {
        if expected <= 0.0 {
            return 0.0;
        }
        expected * (expected / clamp_probability(predicted)).ln()
    }

    /// -(e / p)
    pub fn derivative(expected: f64, predicted: f64) -> f64 {
        -(expected / clamp_probability(predicted))
    }
}
