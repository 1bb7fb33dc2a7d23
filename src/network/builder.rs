use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::spec::NNInfo;
use super::state::NetworkState;
use crate::data::DataInput;
use crate::error::BuildError;
use crate::layers::{Layer, LayerType, WeightInit};
use crate::loss::OutputType;
use crate::math::Ziggurat;

/// Owns the graph: one input layer per training row plus the shared
/// hidden and output layers.
///
/// Stage `k` reads from `input_layers[row]` when `k == 0`, otherwise from
/// `layers[k - 1]`, and writes into `layers[k]`.
#[derive(Debug, Clone)]
pub struct LayerBuilder {
    input_layers: Vec<Layer>,
    expected: Vec<Vec<f64>>,
    layers: Vec<Layer>,
    positive: bool,
    weight_min: f64,
    weight_range: f64,
    rng: StdRng,
    ziggurat: Ziggurat,
}

impl LayerBuilder {
    /// Seeded builders are fully reproducible; `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> LayerBuilder {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        LayerBuilder {
            input_layers: Vec::new(),
            expected: Vec::new(),
            layers: Vec::new(),
            positive: false,
            weight_min: 0.0,
            weight_range: 0.0,
            rng,
            ziggurat: Ziggurat::new(),
        }
    }

    pub fn is_built(&self) -> bool {
        !self.layers.is_empty()
    }

    pub fn input_layers(&self) -> &[Layer] {
        &self.input_layers
    }

    /// Expected outputs of training row `row`; empty when out of range.
    pub fn expected_row(&self, row: usize) -> &[f64] {
        self.expected.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn num_stages(&self) -> usize {
        self.layers.len()
    }

    pub fn is_positive(&self) -> bool {
        self.positive
    }

    /// Builds the input layers from `data` and, on first use, the hidden and
    /// output layers from `info`. Later calls only rebuild the inputs so
    /// trained weights carry over.
    pub fn build(&mut self, info: &NNInfo, data: &dyn DataInput) -> Result<(), BuildError> {
        if info.output_width() == 0 {
            warn!("{}: output layer has no nodes", info.name);
            return Err(BuildError::EmptyOutput);
        }

        self.build_input_layers(info, data)?;
        if self.is_built() {
            return Ok(());
        }

        let fan_in = data.feature_count();
        if let Err(e) = self.build_hidden_layers(info, fan_in) {
            self.input_layers.clear();
            self.expected.clear();
            self.layers.clear();
            return Err(e);
        }
        self.build_output_layer(info, fan_in);

        if info.standardize_weights {
            self.standardize_weights();
        }

        info!(
            "{}: built {} input rows, {} hidden layers, {} outputs ({} weights)",
            info.name,
            self.input_layers.len(),
            info.num_hidden(),
            info.output_width(),
            if self.positive { "positive" } else { "signed" }
        );
        Ok(())
    }

    /// One input layer per row. Any invalid row clears all input layers.
    pub fn build_input_layers(&mut self, info: &NNInfo, data: &dyn DataInput) -> Result<(), BuildError> {
        self.input_layers.clear();
        self.expected.clear();
        match self.collect_input_layers(info, data) {
            Ok((layers, expected)) => {
                self.input_layers = layers;
                self.expected = expected;
                Ok(())
            }
            Err(e) => {
                warn!("{}: input build failed: {e}", info.name);
                Err(e)
            }
        }
    }

    fn collect_input_layers(
        &self,
        info: &NNInfo,
        data: &dyn DataInput,
    ) -> Result<(Vec<Layer>, Vec<Vec<f64>>), BuildError> {
        if data.train_size() == 0 || data.feature_count() == 0 {
            return Err(BuildError::EmptyInput);
        }

        // a built topology fixes the feature width
        let width = match self.layers.first().and_then(|l| l.node(0)) {
            Some(node) => node.num_edges(),
            None => data.feature_count(),
        };
        let output_width = info.output_width();

        let mut layers = Vec::with_capacity(data.train_size());
        let mut expected_rows = Vec::with_capacity(data.train_size());
        for row in 0..data.train_size() {
            let features = data.train_row(row);
            if features.len() != width {
                return Err(BuildError::RowWidthMismatch { row, expected: width, actual: features.len() });
            }
            if let Some(col) = (0..width).find(|&c| data.feature_is_text(row, c) && !data.is_categorical(c)) {
                return Err(BuildError::CategoricalInNumericColumn { row, col });
            }
            let expected = data.train_expected_row(row);
            if expected.len() != output_width {
                return Err(BuildError::ExpectedWidthMismatch {
                    row,
                    expected: output_width,
                    actual: expected.len(),
                });
            }
            layers.push(Layer::from_features(&features));
            expected_rows.push(expected);
        }
        Ok((layers, expected_rows))
    }

    /// Positive weights are used for the whole network if any hidden layer
    /// prefers them or a network with hidden layers has a classification
    /// output. Without hidden layers the weights are always signed.
    pub fn uses_positive_weights(info: &NNInfo) -> bool {
        let classification = info.output_type() == OutputType::Classification;
        info.hidden
            .iter()
            .any(|l| classification || l.activation.prefers_positive_weights())
    }

    fn weight_init(&self) -> WeightInit {
        if self.positive {
            WeightInit::PosXavier
        } else {
            WeightInit::Xavier
        }
    }

    fn build_hidden_layers(&mut self, info: &NNInfo, fan_in: usize) -> Result<(), BuildError> {
        self.positive = Self::uses_positive_weights(info);
        let init = self.weight_init();

        self.layers.clear();
        let mut prev = fan_in;
        for (index, spec) in info.hidden.iter().enumerate() {
            if spec.size == 0 {
                return Err(BuildError::EmptyHiddenLayer { index });
            }
            let mut layer = Layer::new(LayerType::Hidden);
            layer.init_weights(prev, spec.size, init, spec.activation, &mut self.rng, &self.ziggurat);
            self.layers.push(layer);
            prev = spec.size;
        }
        Ok(())
    }

    fn build_output_layer(&mut self, info: &NNInfo, fan_in: usize) {
        let prev = info.hidden.last().map_or(fan_in, |l| l.size);
        let init = self.weight_init();
        let mut layer = Layer::new(LayerType::Output);
        layer.init_weights(
            prev,
            info.output_width(),
            init,
            info.output.layer.activation,
            &mut self.rng,
            &self.ziggurat,
        );
        self.layers.push(layer);
    }

    /// Min-max remaps every non-input edge weight into [0, 1] (positive
    /// networks) or [-0.5, 0.5]. No-op when all weights are equal.
    pub fn standardize_weights(&mut self) {
        let (min, max) = self
            .layers
            .iter()
            .flat_map(Layer::edge_weights)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), w| (lo.min(w), hi.max(w)));

        let range = max - min;
        if !range.is_finite() || range <= 0.0 {
            return;
        }
        self.weight_min = min;
        self.weight_range = range;

        let shift = if self.positive { 0.0 } else { 0.5 };
        for layer in &mut self.layers {
            layer.for_each_edge_weight(|w| (w - min) / range - shift);
        }
    }

    /// Maps a standardized weight back onto the pre-standardization range.
    pub fn unstandardize(&self, value: f64) -> f64 {
        let shift = if self.positive { 0.0 } else { 0.5 };
        (value + shift) * self.weight_range + self.weight_min
    }

    /// Fresh dropout masks for the row's input layer and every hidden layer.
    pub fn scramble_dropout(&mut self, row: usize, info: &NNInfo) {
        if let Some(input) = self.input_layers.get_mut(row) {
            input.generate_dropout(info.p_input(), &mut self.rng);
        }
        for (index, layer) in self.layers.iter_mut().enumerate() {
            if layer.layer_type() == LayerType::Hidden {
                layer.generate_dropout(info.p_dropout(index), &mut self.rng);
            }
        }
    }

    pub fn clear_dropout(&mut self, row: usize) {
        if let Some(input) = self.input_layers.get_mut(row) {
            input.clear_dropout();
        }
        self.layers.iter_mut().for_each(Layer::clear_dropout);
    }

    /// Layer read by `stage` for `row`.
    pub fn source_layer(&self, row: usize, stage: usize) -> Option<&Layer> {
        if stage == 0 {
            self.input_layers.get(row)
        } else {
            self.layers.get(stage - 1)
        }
    }

    /// Source and destination layers of `stage`, mutably.
    pub fn stage_layers_mut(&mut self, row: usize, stage: usize) -> Option<(&mut Layer, &mut Layer)> {
        if stage >= self.layers.len() {
            return None;
        }
        if stage == 0 {
            let source = self.input_layers.get_mut(row)?;
            let dest = self.layers.first_mut()?;
            Some((source, dest))
        } else {
            let (before, after) = self.layers.split_at_mut(stage);
            Some((&mut before[stage - 1], &mut after[0]))
        }
    }

    pub fn network_state(&self, row: usize, stage: usize, input_node: usize, output_node: usize) -> Option<NetworkState> {
        let source = self.source_layer(row, stage)?;
        let dest = self.layers.get(stage)?;
        NetworkState::new(row, stage, input_node, output_node, source, dest)
    }

    /// Appends an ad-hoc input layer and returns its row index.
    pub(crate) fn push_input_layer(&mut self, layer: Layer) -> usize {
        self.input_layers.push(layer);
        self.input_layers.len() - 1
    }

    pub(crate) fn pop_input_layer(&mut self) {
        self.input_layers.pop();
    }

    pub fn output_layer(&self) -> Option<&Layer> {
        self.layers.last()
    }
}
