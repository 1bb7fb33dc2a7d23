use rand::Rng;
use serde::{Deserialize, Serialize};

use super::node::{Node, WeightInit};
use crate::activation::ActivationFunction;
use crate::math::Ziggurat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerType {
    Input,
    Hidden,
    Output,
}

/// Ordered group of nodes sharing a role and a bias weight. The bias is
/// added to every node sum of the layer this one feeds.
///
/// `dropout[i] == true` marks node `i` as excluded for the current row. An
/// empty mask means nothing is dropped; output layers never drop.
#[derive(Debug, Clone)]
pub struct Layer {
    layer_type: LayerType,
    bias: f64,
    pub nodes: Vec<Node>,
    dropout: Vec<bool>,
}

impl Layer {
    pub fn new(layer_type: LayerType) -> Layer {
        Layer { layer_type, bias: 0.0, nodes: Vec::new(), dropout: Vec::new() }
    }

    /// Input layer whose node values are the row's features.
    pub fn from_features(features: &[f64]) -> Layer {
        let mut layer = Layer::new(LayerType::Input);
        layer.nodes = features.iter().map(|&f| Node::new(f)).collect();
        layer
    }

    pub fn layer_type(&self) -> LayerType {
        self.layer_type
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    /// Input layers have no bias.
    pub fn bias(&self) -> f64 {
        match self.layer_type {
            LayerType::Input => 0.0,
            _ => self.bias,
        }
    }

    pub fn set_bias(&mut self, bias: f64) {
        if self.layer_type != LayerType::Input {
            self.bias = bias;
        }
    }

    /// Draws a fresh Bernoulli(`p`) mask, one flag per node, redrawing the
    /// whole mask whenever every node would be dropped. `p` outside (0, 1)
    /// leaves the layer without a mask.
    pub fn generate_dropout<R: Rng + ?Sized>(&mut self, p: f64, rng: &mut R) {
        self.clear_dropout();
        if p <= 0.0 || p >= 1.0 || self.nodes.is_empty() {
            return;
        }

        loop {
            self.dropout = (0..self.nodes.len()).map(|_| rng.gen::<f64>() < p).collect();
            if self.dropout.iter().any(|dropped| !dropped) {
                break;
            }
        }
    }

    pub fn clear_dropout(&mut self) {
        self.dropout.clear();
    }

    pub fn dropout_mask(&self) -> &[bool] {
        &self.dropout
    }

    pub fn possible_path(&self, index: usize) -> bool {
        if self.layer_type == LayerType::Output {
            return true;
        }
        !self.dropout.get(index).copied().unwrap_or(false)
    }

    /// Index of the first live node, `None` for an empty layer.
    pub fn first_valid_path(&self) -> Option<usize> {
        (0..self.nodes.len()).find(|&i| self.possible_path(i))
    }

    /// Index of the last live node, `None` for an empty layer.
    pub fn last_valid_path(&self) -> Option<usize> {
        (0..self.nodes.len()).rev().find(|&i| self.possible_path(i))
    }

    /// Adds nodes until the layer holds `size`, each with `fan_in` edges.
    pub fn init_weights<R: Rng + ?Sized>(
        &mut self,
        fan_in: usize,
        size: usize,
        init: WeightInit,
        activation: ActivationFunction,
        rng: &mut R,
        ziggurat: &Ziggurat,
    ) {
        while self.nodes.len() < size {
            let mut node = Node::default();
            node.init_edges(fan_in, init, activation, rng, ziggurat);
            self.nodes.push(node);
        }
    }

    /// All edge weights feeding this layer.
    pub fn edge_weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.nodes.iter().flat_map(|n| n.edges().iter().map(|e| e.weight))
    }

    pub fn for_each_edge_weight(&mut self, mut f: impl FnMut(f64) -> f64) {
        for node in &mut self.nodes {
            for i in 0..node.num_edges() {
                let w = node.edge_weight(i);
                node.set_edge_weight(i, f(w));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hidden(size: usize) -> Layer {
        let mut layer = Layer::new(LayerType::Hidden);
        let mut rng = StdRng::seed_from_u64(0);
        layer.init_weights(2, size, WeightInit::Empty, ActivationFunction::Sigmoid, &mut rng, &Ziggurat::new());
        layer
    }

    #[test]
    fn dropout_never_removes_every_node() {
        let mut rng = StdRng::seed_from_u64(42);
        for size in 1..6 {
            let mut layer = hidden(size);
            for _ in 0..200 {
                layer.generate_dropout(0.9, &mut rng);
                assert_eq!(layer.dropout_mask().len(), size);
                assert!((0..size).any(|i| layer.possible_path(i)));
                assert!(layer.first_valid_path().is_some());
            }
        }
    }

    #[test]
    fn out_of_range_probability_clears_the_mask() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut layer = hidden(4);
        layer.generate_dropout(0.5, &mut rng);
        layer.generate_dropout(1.0, &mut rng);
        assert!(layer.dropout_mask().is_empty());
        layer.generate_dropout(-0.1, &mut rng);
        assert!(layer.dropout_mask().is_empty());
        assert_eq!(layer.first_valid_path(), Some(0));
        assert_eq!(layer.last_valid_path(), Some(3));
    }

    #[test]
    fn valid_paths_follow_the_mask() {
        let mut layer = hidden(4);
        layer.dropout = vec![true, false, false, true];
        assert!(!layer.possible_path(0));
        assert!(layer.possible_path(9));
        assert_eq!(layer.first_valid_path(), Some(1));
        assert_eq!(layer.last_valid_path(), Some(2));
    }

    #[test]
    fn output_layers_ignore_dropout() {
        let mut layer = Layer::new(LayerType::Output);
        layer.nodes = vec![Node::default(), Node::default()];
        layer.dropout = vec![true, true];
        assert!(layer.possible_path(0));
        assert_eq!(layer.first_valid_path(), Some(0));
        assert_eq!(layer.last_valid_path(), Some(1));
    }

    #[test]
    fn input_layers_have_no_bias() {
        let mut input = Layer::from_features(&[0.1, 0.2]);
        input.set_bias(3.0);
        assert_eq!(input.bias(), 0.0);

        let mut layer = hidden(1);
        layer.set_bias(0.5);
        assert_eq!(layer.bias(), 0.5);
        assert!(Layer::new(LayerType::Hidden).first_valid_path().is_none());
    }
}
