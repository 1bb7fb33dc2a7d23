use std::time::Instant;

use super::builder::LayerBuilder;
use super::spec::NNInfo;
use crate::data::DataInput;
use crate::error::BuildError;
use crate::layers::{Layer, LayerType};
use crate::loss::accuracy_contribution;
use crate::metrics::ConfusionMatrix;
use crate::optim::Sgd;
use crate::train::{ClassificationStats, EpochStats, RunType};

/// A trainable node/edge network plus the running state of its current run.
///
/// The topology is built on the first [`prepare`](Self::prepare); later calls
/// only swap in new input rows, so training can continue across runs.
#[derive(Debug, Clone)]
pub struct Network {
    info: NNInfo,
    builder: LayerBuilder,
    confusion: ConfusionMatrix,
    results: Vec<(f64, f64)>,
    epochs: u64,
    total_error: f64,
    total_accuracy: f64,
    learning_curve: Vec<(u64, f64)>,
}

impl Network {
    pub fn new(info: NNInfo) -> Network {
        let builder = LayerBuilder::new(info.seed);
        Network {
            info,
            builder,
            confusion: ConfusionMatrix::default(),
            results: Vec::new(),
            epochs: 0,
            total_error: 0.0,
            total_accuracy: 0.0,
            learning_curve: Vec::new(),
        }
    }

    pub fn info(&self) -> &NNInfo {
        &self.info
    }

    pub fn builder(&self) -> &LayerBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut LayerBuilder {
        &mut self.builder
    }

    pub fn confusion_matrix(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    /// `(expected, predicted)` pairs of the most recently processed row.
    pub fn results(&self) -> &[(f64, f64)] {
        &self.results
    }

    /// Epochs completed over the network's lifetime.
    pub fn epochs(&self) -> u64 {
        self.epochs
    }

    /// Summed normalised cost of the last epoch.
    pub fn total_error(&self) -> f64 {
        self.total_error
    }

    /// Mean clipped accuracy of the last epoch, in percent.
    pub fn accuracy(&self) -> f64 {
        self.total_accuracy
    }

    /// `(epoch, total_error)` after every completed epoch.
    pub fn learning_curve(&self) -> &[(u64, f64)] {
        &self.learning_curve
    }

    /// Loads `data` into the graph, building hidden and output layers if
    /// this is the first run.
    pub fn prepare(&mut self, data: &dyn DataInput) -> Result<(), BuildError> {
        self.builder.build(&self.info, data)?;
        if self.info.output_type().uses_confusion_matrix() {
            self.confusion.build(self.info.output_width());
        } else {
            self.confusion.clean();
        }
        Ok(())
    }

    /// Runs every loaded row once. Training rows also backpropagate.
    pub fn run_epoch(&mut self, run_type: RunType) -> Result<EpochStats, BuildError> {
        let rows = self.builder.input_layers().len();
        if !self.builder.is_built() || rows == 0 {
            return Err(BuildError::NotBuilt);
        }

        let started = Instant::now();
        let training = run_type == RunType::Train;
        let data_size = rows * self.info.output_width();
        let minibatch = match self.info.batch_size() {
            0 => rows,
            n => n,
        };
        let uses_confusion = self.info.output_type().uses_confusion_matrix();

        self.total_error = 0.0;
        self.total_accuracy = 0.0;
        self.confusion.reset();

        for row in 0..rows {
            let expected = self.builder.expected_row(row).to_vec();

            if training {
                self.builder.scramble_dropout(row, &self.info);
            }
            self.results.clear();
            self.forward_pass(row, Some(&expected), data_size);

            if uses_confusion {
                self.confusion.add_result(&self.results);
            }

            if training {
                self.backward_pass(row, &expected, minibatch);
                self.builder.clear_dropout(row);
            }
        }

        self.epochs += 1;
        if data_size > 0 {
            self.total_accuracy /= data_size as f64;
        }
        if uses_confusion {
            self.confusion.update_result_params();
        }
        self.learning_curve.push((self.epochs, self.total_error));

        Ok(EpochStats {
            epoch: self.epochs,
            total_error: self.total_error,
            accuracy: self.total_accuracy,
            classification: uses_confusion.then(|| ClassificationStats::from_matrix(&self.confusion)),
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Forward traversal for one row: stage by stage, input node by input
    /// node, output node fastest. Each destination node sum gets the source
    /// layer's bias before squashing.
    ///
    /// With `expected` set, output values are recorded into the results and
    /// the epoch's cost and accuracy totals.
    pub fn forward_pass(&mut self, row: usize, expected: Option<&[f64]>, data_size: usize) {
        let output_type = self.info.output_type();

        for stage in 0..self.builder.num_stages() {
            let activation = self.info.activation(stage);
            let param = self.info.activation_param(stage);
            let Some((src_len, dst_len)) = self.stage_widths(row, stage) else {
                continue;
            };

            for i in 0..src_len {
                for o in 0..dst_len {
                    let Some(state) = self.builder.network_state(row, stage, i, o) else {
                        continue;
                    };
                    let Some((source, dest)) = self.builder.stage_layers_mut(row, stage) else {
                        continue;
                    };
                    let input = source.node(i).map_or(0.0, |n| n.weight);
                    // input layers report no bias
                    let bias = source.bias();
                    let Some(node) = dest.node_mut(o) else {
                        continue;
                    };

                    if !state.dropped() {
                        let staged = input * node.edge_weight(i);
                        node.set_activation(i, staged);
                    }

                    if !(state.last_valid_input && state.valid_output) {
                        continue;
                    }

                    let sum = node.activation() + bias;
                    node.clear_activation();
                    node.weight = activation.squash(sum, param);

                    if state.output_type != LayerType::Output {
                        continue;
                    }
                    let predicted = node.weight;
                    if let Some(e) = expected.and_then(|e| e.get(o)).copied() {
                        self.results.push((e, predicted));
                        self.total_error += output_type.node_cost(e, predicted, data_size);
                        self.total_accuracy += accuracy_contribution(e, predicted);
                    }
                }
            }
        }
    }

    /// Backward traversal for one row, last stage first.
    ///
    /// Output nodes take the cost derivative directly; hidden nodes scale
    /// their accumulated error by the activation derivative. Each live edge
    /// buffers a delta and steps the source layer's bias (input layers have
    /// none). The error flows back through the edge weight as it was before
    /// this row's update.
    pub fn backward_pass(&mut self, row: usize, expected: &[f64], minibatch: usize) {
        let output_type = self.info.output_type();

        for stage in (0..self.builder.num_stages()).rev() {
            let sgd = Sgd::new(
                self.info.learning_rate(stage),
                self.info.momentum(stage),
                self.info.weight_decay(stage),
            );
            let activation = self.info.activation(stage);
            let param = self.info.activation_param(stage);
            let Some((src_len, dst_len)) = self.stage_widths(row, stage) else {
                continue;
            };

            for i in 0..src_len {
                for o in 0..dst_len {
                    let Some(state) = self.builder.network_state(row, stage, i, o) else {
                        continue;
                    };
                    if state.dropped() {
                        continue;
                    }
                    let Some((source, dest)) = self.builder.stage_layers_mut(row, stage) else {
                        continue;
                    };
                    let Some(node) = dest.node(o) else {
                        continue;
                    };

                    let error = match state.output_type {
                        LayerType::Output => {
                            let e = expected.get(o).copied().unwrap_or(0.0);
                            output_type.derivative(e, node.weight)
                        }
                        _ => node.error_der() * activation.derivative(node.weight, param),
                    };
                    let input = source.node(i).map_or(0.0, |n| n.weight);
                    let old_weight = node.edge_weight(i);

                    if let Some(edge) = dest.node_mut(o).and_then(|n| n.edge_mut(i)) {
                        sgd.step(edge, error, input, row, minibatch);
                    }
                    if state.input_type != LayerType::Input {
                        source.set_bias(source.bias() - sgd.bias_delta(error));
                        if let Some(src_node) = source.node_mut(i) {
                            src_node.set_error_der(o, error * old_weight);
                        }
                    }
                }
            }

            if let Some(dest) = self.builder.layers_mut().get_mut(stage) {
                dest.nodes.iter_mut().for_each(|n| n.clear_error_der());
            }
        }
    }

    /// Runs `features` through the trained network without dropout, metrics
    /// or weight updates and returns the output layer's values.
    pub fn predict(&mut self, features: &[f64]) -> Result<Vec<f64>, BuildError> {
        let width = self
            .builder
            .layers()
            .first()
            .and_then(|l| l.node(0))
            .map(|n| n.num_edges())
            .ok_or(BuildError::NotBuilt)?;
        if features.len() != width {
            return Err(BuildError::RowWidthMismatch { row: 0, expected: width, actual: features.len() });
        }

        let row = self.builder.push_input_layer(Layer::from_features(features));
        self.forward_pass(row, None, 0);
        self.builder.pop_input_layer();

        Ok(self
            .builder
            .output_layer()
            .map(|l| l.nodes.iter().map(|n| n.weight).collect())
            .unwrap_or_default())
    }

    /// Inverse of the output activation, mapping a predicted value back to
    /// the output node's net input.
    pub fn unsquash_output(&self, value: f64) -> f64 {
        let stage = self.info.num_hidden();
        self.info.activation(stage).unsquash(value, self.info.activation_param(stage))
    }

    fn stage_widths(&self, row: usize, stage: usize) -> Option<(usize, usize)> {
        let source = self.builder.source_layer(row, stage)?;
        let dest = self.builder.layers().get(stage)?;
        Some((source.len(), dest.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction;
    use crate::data::VecDataInput;
    use crate::loss::OutputType;
    use crate::network::LayerInfo;
    use approx::assert_relative_eq;

    /// 2-1 linear network with hand-set weights.
    fn linear_net(batch_size: usize) -> (Network, VecDataInput) {
        let info = NNInfo::new(
            "linear",
            LayerInfo::new(1, ActivationFunction::Linear).with_activation_param(1.0).with_learning_rate(0.1),
            OutputType::Regression,
        )
        .with_batch_size(batch_size)
        .with_seed(1);
        let data = VecDataInput::from_numeric(vec![vec![1.0, 2.0], vec![0.5, -1.0]], vec![vec![1.0], vec![0.0]]);

        let mut net = Network::new(info);
        net.prepare(&data).unwrap();
        let node = &mut net.builder_mut().layers_mut()[0].nodes[0];
        node.set_edge_weight(0, 0.5);
        node.set_edge_weight(1, 0.25);
        (net, data)
    }

    #[test]
    fn forward_pass_sums_weighted_inputs() {
        let (mut net, _) = linear_net(1);
        let expected = [1.0];
        net.forward_pass(0, Some(&expected), 2);

        // 1·0.5 + 2·0.25
        assert_eq!(net.results(), &[(1.0, 1.0)]);
        assert_relative_eq!(net.total_error(), 0.0);
        assert_relative_eq!(net.accuracy(), 100.0);
        assert_relative_eq!(net.predict(&[0.5, -1.0]).unwrap()[0], 0.0);
    }

    #[test]
    fn backward_pass_buffers_then_applies_at_the_boundary() {
        let (mut net, _) = linear_net(2);
        let expected = [0.0];
        let edge = |net: &Network| net.builder().layers()[0].nodes[0].edges()[0].clone();

        // prediction 1.0 against 0: error 2, delta 0.1·2·1 buffered
        net.forward_pass(0, Some(&expected), 2);
        net.backward_pass(0, &expected, 2);
        assert_relative_eq!(edge(&net).weight, 0.5);
        assert_eq!(edge(&net).delta_count(), 1);

        // boundary row but the window is not full yet
        net.forward_pass(0, Some(&expected), 2);
        net.backward_pass(0, &expected, 2);
        assert_relative_eq!(edge(&net).weight, 0.5);
        assert_eq!(edge(&net).delta_count(), 2);

        // full window at a boundary: mean(0.2, 0.2) is applied
        net.forward_pass(0, Some(&expected), 2);
        net.backward_pass(0, &expected, 2);
        assert_relative_eq!(edge(&net).weight, 0.3, epsilon = 1e-12);
        assert_eq!(edge(&net).delta_count(), 1);
    }

    #[test]
    fn input_layers_never_carry_bias() {
        let info = NNInfo::new(
            "no-hidden",
            LayerInfo::new(1, ActivationFunction::Linear).with_activation_param(1.0).with_learning_rate(0.1),
            OutputType::Regression,
        )
        .with_seed(4);
        let data = VecDataInput::from_numeric(vec![vec![1.0, 2.0]], vec![vec![5.0]]);
        let mut net = Network::new(info);
        net.prepare(&data).unwrap();

        net.run_epoch(RunType::Train).unwrap();
        net.run_epoch(RunType::Train).unwrap();

        assert_eq!(net.builder().layers()[0].bias(), 0.0);
        assert_eq!(net.builder().input_layers()[0].bias(), 0.0);
    }

    /// 2-1-1 linear network: hidden weights 0.5/0.25, output weight 2.
    fn hidden_net() -> Network {
        let linear = |lr: f64| {
            LayerInfo::new(1, ActivationFunction::Linear).with_activation_param(1.0).with_learning_rate(lr)
        };
        let info = NNInfo::new("hidden", linear(0.1), OutputType::Regression)
            .with_hidden(linear(0.1))
            .with_batch_size(1)
            .with_seed(2);
        let data = VecDataInput::from_numeric(vec![vec![1.0, 2.0]], vec![vec![2.0]]);
        let mut net = Network::new(info);
        net.prepare(&data).unwrap();

        let layers = net.builder_mut().layers_mut();
        layers[0].nodes[0].set_edge_weight(0, 0.5);
        layers[0].nodes[0].set_edge_weight(1, 0.25);
        layers[1].nodes[0].set_edge_weight(0, 2.0);
        net
    }

    #[test]
    fn hidden_bias_feeds_the_next_layer() {
        let mut net = hidden_net();
        net.builder_mut().layers_mut()[0].set_bias(0.5);
        net.builder_mut().layers_mut()[1].set_bias(10.0);

        // hidden: 1·0.5 + 2·0.25 = 1, no bias from the input layer
        // output: 2·1 + 0.5, the output layer's own bias is never read
        assert_relative_eq!(net.predict(&[1.0, 2.0]).unwrap()[0], 2.5);
        assert_relative_eq!(net.builder().layers()[0].nodes[0].weight, 1.0);
    }

    #[test]
    fn hidden_bias_steps_once_per_live_edge() {
        let mut net = hidden_net();
        net.builder_mut().layers_mut()[0].set_bias(0.5);

        // prediction 2.5 against 2: output error 2·0.5 = 1
        let expected = [2.0];
        net.forward_pass(0, Some(&expected), 1);
        net.backward_pass(0, &expected, 1);

        // one edge into the output: 0.5 - 0.1·1
        assert_relative_eq!(net.builder().layers()[0].bias(), 0.4, epsilon = 1e-12);
        assert_eq!(net.builder().layers()[1].bias(), 0.0);
    }

    #[test]
    fn run_epoch_requires_a_build() {
        let info = NNInfo::new("empty", LayerInfo::new(1, ActivationFunction::Sigmoid), OutputType::Regression);
        let mut net = Network::new(info);
        assert_eq!(net.run_epoch(RunType::Test).unwrap_err(), BuildError::NotBuilt);
        assert_eq!(net.predict(&[1.0]).unwrap_err(), BuildError::NotBuilt);
    }

    #[test]
    fn test_epochs_leave_weights_alone() {
        let (mut net, _) = linear_net(1);
        let before: Vec<f64> = net.builder().layers()[0].edge_weights().collect();
        let stats = net.run_epoch(RunType::Test).unwrap();
        let after: Vec<f64> = net.builder().layers()[0].edge_weights().collect();

        assert_eq!(before, after);
        assert_eq!(stats.epoch, 1);
        assert!(stats.classification.is_none());
        assert_eq!(net.learning_curve(), &[(1, stats.total_error)]);
        // row 1: 0.5·0.5 - 1·0.25 = 0 against 0 → exact
        assert_relative_eq!(stats.total_error, 0.0);
    }

    #[test]
    fn training_reduces_regression_error() {
        let (mut net, _) = linear_net(1);
        net.builder_mut().layers_mut()[0].nodes[0].set_edge_weight(0, -0.4);
        let first = net.run_epoch(RunType::Train).unwrap().total_error;
        for _ in 0..50 {
            net.run_epoch(RunType::Train).unwrap();
        }
        assert!(net.total_error() < first);
        assert_eq!(net.epochs(), 51);
    }

    #[test]
    fn predict_checks_width() {
        let (mut net, _) = linear_net(1);
        assert_eq!(
            net.predict(&[1.0]).unwrap_err(),
            BuildError::RowWidthMismatch { row: 0, expected: 2, actual: 1 }
        );
        assert_eq!(net.builder().input_layers().len(), 2);
    }

    #[test]
    fn unsquash_output_inverts_the_output_activation() {
        let (net, _) = linear_net(1);
        assert_relative_eq!(net.unsquash_output(0.75), 0.75);
    }
}
