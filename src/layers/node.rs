use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::edge::Edge;
use crate::activation::ActivationFunction;
use crate::math::Ziggurat;

/// How a node's incoming edge weights are initialised.
///
/// - `Empty`:     all zero.
/// - `Random` / `PosRandom`: uniform in (0, 1].
/// - `Xavier`:    Gaussian (ziggurat) with random sign, scaled by `sqrt(1/fan_in)`
///   or `sqrt(2/fan_in)` when the destination uses ReLU.
/// - `PosXavier`: same magnitude as `Xavier`, always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    Empty,
    Random,
    PosRandom,
    Xavier,
    PosXavier,
}

/// A neuron: its current value, incoming edges and the error derivatives
/// pushed back onto it by downstream nodes.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub weight: f64,
    edges: Vec<Edge>,
    error_der: BTreeMap<usize, f64>,
}

impl Node {
    pub fn new(weight: f64) -> Node {
        Node { weight, ..Node::default() }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_mut(&mut self, index: usize) -> Option<&mut Edge> {
        self.edges.get_mut(index)
    }

    /// Weight of edge `index`, 0 when out of range.
    pub fn edge_weight(&self, index: usize) -> f64 {
        self.edges.get(index).map_or(0.0, |e| e.weight)
    }

    pub fn set_edge_weight(&mut self, index: usize, weight: f64) {
        if let Some(edge) = self.edges.get_mut(index) {
            edge.weight = weight;
        }
    }

    pub fn set_activation(&mut self, index: usize, value: f64) {
        if let Some(edge) = self.edges.get_mut(index) {
            edge.set_activation(value);
        }
    }

    /// Sum of the contributions staged on this node's edges.
    pub fn activation(&self) -> f64 {
        self.edges.iter().filter_map(Edge::activation).sum()
    }

    pub fn clear_activation(&mut self) {
        self.edges.iter_mut().for_each(Edge::deactivate);
    }

    /// Stores the error derivative coming from downstream node `key`,
    /// replacing any earlier value for that key.
    pub fn set_error_der(&mut self, key: usize, value: f64) {
        self.error_der.insert(key, value);
    }

    /// Total error derivative across all downstream contributors.
    pub fn error_der(&self) -> f64 {
        self.error_der.values().sum()
    }

    pub fn clear_error_der(&mut self) {
        self.error_der.clear();
    }

    /// Appends edges until the node has `fan_in` of them.
    pub fn init_edges<R: Rng + ?Sized>(
        &mut self,
        fan_in: usize,
        init: WeightInit,
        activation: ActivationFunction,
        rng: &mut R,
        ziggurat: &Ziggurat,
    ) {
        let scale = match activation {
            ActivationFunction::ReLU => (2.0 / fan_in.max(1) as f64).sqrt(),
            _ => (1.0 / fan_in.max(1) as f64).sqrt(),
        };

        while self.edges.len() < fan_in {
            let weight = match init {
                WeightInit::Empty => 0.0,
                // gen() is in [0, 1); flip it so zero is never drawn
                WeightInit::Random | WeightInit::PosRandom => 1.0 - rng.gen::<f64>(),
                WeightInit::Xavier => ziggurat.sample(rng) * scale,
                WeightInit::PosXavier => ziggurat.sample_magnitude(rng) * scale,
            };
            self.edges.push(Edge::new(weight));
        }
    }
}
