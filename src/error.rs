use thiserror::Error;

/// Reasons a `LayerBuilder` refuses to produce a trainable graph.
///
/// A build failure leaves the builder without input layers; the training
/// loop must not be started afterwards.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("training data has no rows or no features")]
    EmptyInput,

    #[error("output layer has no nodes")]
    EmptyOutput,

    #[error("hidden layer {index} has no nodes")]
    EmptyHiddenLayer { index: usize },

    #[error("row {row}, column {col}: text value in a column not declared categorical")]
    CategoricalInNumericColumn { row: usize, col: usize },

    #[error("row {row} has {actual} features, expected {expected}")]
    RowWidthMismatch { row: usize, expected: usize, actual: usize },

    #[error("expected row {row} has {actual} values, output layer has {expected} nodes")]
    ExpectedWidthMismatch { row: usize, expected: usize, actual: usize },

    #[error("network has not been built yet")]
    NotBuilt,
}

/// Top-level error for network runs and specification loading.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("build failed: {0}")]
    Build(#[from] BuildError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid network specification: {0}")]
    Json(#[from] serde_json::Error),
}
