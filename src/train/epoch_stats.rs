use serde::{Deserialize, Serialize};

use crate::metrics::ConfusionMatrix;

/// Confusion-matrix summary for classification and KL outputs.
///
/// All rates are percentages in [0, 100], averaged over classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub specificity: f64,
    pub false_alarm: f64,
    pub f1: f64,
    /// Rows are expected classes, columns predicted classes.
    pub matrix: Vec<Vec<u64>>,
}

impl ClassificationStats {
    pub fn from_matrix(cm: &ConfusionMatrix) -> ClassificationStats {
        ClassificationStats {
            accuracy: cm.overall_accuracy() * 100.0,
            precision: cm.overall_precision() * 100.0,
            recall: cm.overall_recall() * 100.0,
            specificity: cm.overall_specificity() * 100.0,
            false_alarm: cm.overall_false_alarm() * 100.0,
            f1: cm.overall_f1() * 100.0,
            matrix: cm.matrix().to_vec(),
        }
    }
}

/// Per-epoch statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the loop
/// sends one `EpochStats` value at the end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// Epochs completed by the network so far, this one included.
    pub epoch: u64,
    /// Sum over rows and outputs of the normalised cost.
    pub total_error: f64,
    /// Mean clipped per-output accuracy, in percent.
    pub accuracy: f64,
    /// Only set for classification and KL outputs.
    pub classification: Option<ClassificationStats>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
