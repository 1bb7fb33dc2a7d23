use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::activation::ActivationFunction;
use crate::error::NetworkError;
use crate::loss::OutputType;

pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

/// Hyper-parameters of one hidden or output layer.
///
/// Fields:
/// - `size`             — number of nodes
/// - `learning_rate`    — step size for the edges feeding this layer
/// - `momentum`         — fraction of the previous delta carried over
/// - `weight_decay`     — L2-style decay factor
/// - `p_dropout`        — per-row drop probability for this layer's nodes
/// - `activation`       — squash function applied to each node sum
/// - `activation_param` — variant-specific parameter (slope, scale, threshold)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub size: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub momentum: f64,
    #[serde(default)]
    pub weight_decay: f64,
    #[serde(default)]
    pub p_dropout: f64,
    #[serde(default)]
    pub activation: ActivationFunction,
    #[serde(default)]
    pub activation_param: f64,
}

impl LayerInfo {
    pub fn new(size: usize, activation: ActivationFunction) -> LayerInfo {
        LayerInfo {
            size,
            learning_rate: DEFAULT_LEARNING_RATE,
            momentum: 0.0,
            weight_decay: 0.0,
            p_dropout: 0.0,
            activation,
            activation_param: 0.0,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> LayerInfo {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_momentum(mut self, momentum: f64) -> LayerInfo {
        self.momentum = momentum;
        self
    }

    pub fn with_weight_decay(mut self, weight_decay: f64) -> LayerInfo {
        self.weight_decay = weight_decay;
        self
    }

    pub fn with_dropout(mut self, p_dropout: f64) -> LayerInfo {
        self.p_dropout = p_dropout;
        self
    }

    pub fn with_activation_param(mut self, activation_param: f64) -> LayerInfo {
        self.activation_param = activation_param;
        self
    }
}

impl Default for LayerInfo {
    fn default() -> Self {
        LayerInfo::new(0, ActivationFunction::default())
    }
}

/// Settings for the per-row input layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputLayerInfo {
    #[serde(default)]
    pub p_dropout: f64,
    /// Rows per minibatch; 0 means the whole training set.
    #[serde(default)]
    pub batch_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputLayerInfo {
    #[serde(flatten)]
    pub layer: LayerInfo,
    pub output_type: OutputType,
}

/// Serializable description of a network: input settings, hidden layers
/// and the output layer.
///
/// Layer-indexed accessors take a stage index `k` in `0..=num_hidden()`:
/// hidden layer `k`, or the output layer when `k == num_hidden()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NNInfo {
    pub name: String,
    #[serde(default)]
    pub input: InputLayerInfo,
    #[serde(default)]
    pub hidden: Vec<LayerInfo>,
    pub output: OutputLayerInfo,
    /// Remap all initial weights to a common range after building.
    #[serde(default)]
    pub standardize_weights: bool,
    /// Seed for weight init and dropout; `None` draws from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NNInfo {
    pub fn new(name: &str, output: LayerInfo, output_type: OutputType) -> NNInfo {
        NNInfo {
            name: name.to_string(),
            input: InputLayerInfo::default(),
            hidden: Vec::new(),
            output: OutputLayerInfo { layer: output, output_type },
            standardize_weights: false,
            seed: None,
        }
    }

    pub fn with_hidden(mut self, layer: LayerInfo) -> NNInfo {
        self.hidden.push(layer);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> NNInfo {
        self.input.batch_size = batch_size;
        self
    }

    pub fn with_input_dropout(mut self, p_dropout: f64) -> NNInfo {
        self.input.p_dropout = p_dropout;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> NNInfo {
        self.seed = Some(seed);
        self
    }

    pub fn with_standardized_weights(mut self) -> NNInfo {
        self.standardize_weights = true;
        self
    }

    pub fn num_hidden(&self) -> usize {
        self.hidden.len()
    }

    pub fn output_type(&self) -> OutputType {
        self.output.output_type
    }

    pub fn output_width(&self) -> usize {
        self.output.layer.size
    }

    pub fn batch_size(&self) -> usize {
        self.input.batch_size
    }

    pub fn p_input(&self) -> f64 {
        self.input.p_dropout
    }

    /// Layer produced by stage `index`.
    pub fn layer(&self, index: usize) -> Option<&LayerInfo> {
        if index < self.hidden.len() {
            self.hidden.get(index)
        } else if index == self.hidden.len() {
            Some(&self.output.layer)
        } else {
            None
        }
    }

    pub fn learning_rate(&self, index: usize) -> f64 {
        self.layer(index).map_or(DEFAULT_LEARNING_RATE, |l| l.learning_rate)
    }

    pub fn momentum(&self, index: usize) -> f64 {
        self.layer(index).map_or(0.0, |l| l.momentum)
    }

    pub fn weight_decay(&self, index: usize) -> f64 {
        self.layer(index).map_or(0.0, |l| l.weight_decay)
    }

    /// Dropout probability of hidden layer `index`; the output layer never drops.
    pub fn p_dropout(&self, index: usize) -> f64 {
        self.hidden.get(index).map_or(0.0, |l| l.p_dropout)
    }

    pub fn activation(&self, index: usize) -> ActivationFunction {
        self.layer(index).map_or_else(ActivationFunction::default, |l| l.activation)
    }

    pub fn activation_param(&self, index: usize) -> f64 {
        self.layer(index).map_or(0.0, |l| l.activation_param)
    }

    pub fn from_json_str(json: &str) -> Result<NNInfo, NetworkError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the specification to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), NetworkError> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<NNInfo, NetworkError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
