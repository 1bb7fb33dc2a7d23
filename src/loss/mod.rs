pub mod cross_entropy;
pub mod kl;
pub mod loss_type;
pub mod mse;

pub use cross_entropy::CrossEntropyLoss;
pub use kl::KlDivergence;
pub use loss_type::OutputType;
pub use mse::MseLoss;

/// Per-output accuracy contribution in percent: `max(0, 1 - min(1, |p - e|)) · 100`.
pub fn accuracy_contribution(expected: f64, predicted: f64) -> f64 {
    let miss = (predicted - expected).abs().min(1.0);
    (1.0 - miss).max(0.0) * 100.0
}
