use log::warn;
use serde::{Deserialize, Serialize};

/// Net inputs below this are treated as "off" by the rectifier variants.
pub const OUTLIER: f64 = 1e-4;

/// Output values produced by the clipped sigmoid outside its linear band.
const CLIPPED_SIGMOID_LOW: f64 = 0.01;
const CLIPPED_SIGMOID_HIGH: f64 = 0.99;

/// Node activation ("squash") function.
///
/// Every variant takes a scalar parameter alongside the net input; what it
/// means depends on the variant:
///
/// - `ClippedTanh`:    inputs beyond `±(1 - param)` saturate to `±1`.
/// - `ClippedSigmoid`: inputs below `param` map to 0.01, above `1 - param` to 0.99.
/// - `LeakyReLU`:      slope applied below [`OUTLIER`]; should stay ≤ 0.1.
/// - `Linear`:         scale factor.
/// - `Step`:           threshold.
///
/// The remaining variants ignore the parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Tanh,
    ClippedTanh,
    Sigmoid,
    ClippedSigmoid,
    ReLU,
    LeakyReLU,
    Linear,
    Step,
}

impl Default for ActivationFunction {
    fn default() -> Self {
        ActivationFunction::Sigmoid
    }
}

impl ActivationFunction {
    pub fn squash(&self, x: f64, param: f64) -> f64 {
        match self {
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::ClippedTanh => {
                if x > 1.0 - param {
                    1.0
                } else if x < param - 1.0 {
                    -1.0
                } else {
                    x.tanh()
                }
            }
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::ClippedSigmoid => {
                if x < param {
                    CLIPPED_SIGMOID_LOW
                } else if x > 1.0 - param {
                    CLIPPED_SIGMOID_HIGH
                } else {
                    sigmoid(x)
                }
            }
            ActivationFunction::ReLU => if x < OUTLIER { 0.0 } else { x },
            ActivationFunction::LeakyReLU => {
                warn_leaky_param(param);
                if x < OUTLIER { param * x } else { x }
            }
            ActivationFunction::Linear => param * x,
            ActivationFunction::Step => if x < param { 0.0 } else { 1.0 },
        }
    }

    /// Inverse of [`squash`](Self::squash), mapping an activation back to a net input.
    ///
    /// Saturated outputs of the clipped variants map to their clip thresholds.
    /// `Step` cannot be inverted and yields 0.
    pub fn unsquash(&self, y: f64, param: f64) -> f64 {
        match self {
            ActivationFunction::Tanh => y.atanh(),
            ActivationFunction::ClippedTanh => {
                if y <= -1.0 {
                    param - 1.0
                } else if y >= 1.0 {
                    1.0 - param
                } else {
                    y.atanh()
                }
            }
            ActivationFunction::Sigmoid => logit(y),
            ActivationFunction::ClippedSigmoid => {
                if y <= CLIPPED_SIGMOID_LOW {
                    param
                } else if y >= CLIPPED_SIGMOID_HIGH {
                    1.0 - param
                } else {
                    logit(y)
                }
            }
            ActivationFunction::ReLU => if y <= 0.0 { OUTLIER } else { y },
            ActivationFunction::LeakyReLU => {
                warn_leaky_param(param);
                if y <= OUTLIER * param && param != 0.0 { y / param } else { y }
            }
            ActivationFunction::Linear => if param == 0.0 { 0.0 } else { y / param },
            ActivationFunction::Step => {
                warn!("step activation is non-invertible; unsquash yields 0");
                0.0
            }
        }
    }

    /// Derivative expressed in terms of the post-activation value `y`.
    pub fn derivative(&self, y: f64, param: f64) -> f64 {
        match self {
            ActivationFunction::Tanh | ActivationFunction::ClippedTanh => 1.0 - y * y,
            ActivationFunction::Sigmoid | ActivationFunction::ClippedSigmoid => y * (1.0 - y),
            ActivationFunction::ReLU => if y > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::LeakyReLU => if y > 0.0 { 1.0 } else { param },
            ActivationFunction::Linear => param,
            ActivationFunction::Step => 0.0,
        }
    }

    /// Whether layers using this activation start from non-negative weights.
    pub fn prefers_positive_weights(&self) -> bool {
        matches!(
            self,
            ActivationFunction::Sigmoid | ActivationFunction::ReLU | ActivationFunction::LeakyReLU
        )
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn logit(y: f64) -> f64 {
    (y / (1.0 - y)).ln()
}

fn warn_leaky_param(param: f64) {
    if param > 0.1 {
        warn!("leaky ReLU parameter {param} is larger than 0.1");
    }
}
