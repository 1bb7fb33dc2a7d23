use serde::{Deserialize, Serialize};

use super::{CrossEntropyLoss, KlDivergence, MseLoss};

/// Kind of output layer, which also selects the cost function the
/// training loop uses.
///
/// - `Regression`:     squared error.
/// - `Classification`: binary cross-entropy per output node; enables the
///   confusion matrix.
/// - `Kl`:             KL divergence; also tracked with a confusion matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    Regression,
    Classification,
    Kl,
}

impl Default for OutputType {
    fn default() -> Self {
        OutputType::Regression
    }
}

impl OutputType {
    pub fn loss(&self, expected: f64, predicted: f64) -> f64 {
        match self {
            OutputType::Regression => MseLoss::loss(expected, predicted),
            OutputType::Classification => CrossEntropyLoss::loss(expected, predicted),
            OutputType::Kl => KlDivergence::loss(expected, predicted),
        }
    }

    pub fn derivative(&self, expected: f64, predicted: f64) -> f64 {
        match self {
            OutputType::Regression => MseLoss::derivative(expected, predicted),
            OutputType::Classification => CrossEntropyLoss::derivative(expected, predicted),
            OutputType::Kl => KlDivergence::derivative(expected, predicted),
        }
    }

    /// Cost of one output node normalised by `data_size` (rows × output width).
    pub fn node_cost(&self, expected: f64, predicted: f64, data_size: usize) -> f64 {
        if data_size == 0 {
            return 0.0;
        }
        self.loss(expected, predicted) / data_size as f64
    }

    pub fn uses_confusion_matrix(&self) -> bool {
        matches!(self, OutputType::Classification | OutputType::Kl)
    }
}
