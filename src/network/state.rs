use crate::layers::{Layer, LayerType};

/// Snapshot of one (row, stage, input node, output node) coordinate.
///
/// Stage `k` connects the source layer (the row's input layer for `k == 0`,
/// otherwise layer `k - 1`) to layer `k`. All flags are evaluated against
/// the dropout masks current at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkState {
    pub row: usize,
    pub stage: usize,
    pub input_node: usize,
    pub output_node: usize,
    pub input_type: LayerType,
    pub output_type: LayerType,
    pub first_valid_input: bool,
    pub last_valid_input: bool,
    pub first_valid_output: bool,
    pub last_valid_output: bool,
    pub valid_input: bool,
    pub valid_output: bool,
}

impl NetworkState {
    /// `None` when either node index falls outside its layer.
    pub fn new(
        row: usize,
        stage: usize,
        input_node: usize,
        output_node: usize,
        source: &Layer,
        dest: &Layer,
    ) -> Option<NetworkState> {
        if input_node >= source.len() || output_node >= dest.len() {
            return None;
        }
        Some(NetworkState {
            row,
            stage,
            input_node,
            output_node,
            input_type: source.layer_type(),
            output_type: dest.layer_type(),
            first_valid_input: source.first_valid_path() == Some(input_node),
            last_valid_input: source.last_valid_path() == Some(input_node),
            first_valid_output: dest.first_valid_path() == Some(output_node),
            last_valid_output: dest.last_valid_path() == Some(output_node),
            valid_input: source.possible_path(input_node),
            valid_output: dest.possible_path(output_node),
        })
    }

    /// True when either end of the edge is dropped for this row.
    pub fn dropped(&self) -> bool {
        !(self.valid_input && self.valid_output)
    }
}
