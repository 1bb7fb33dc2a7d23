pub mod activation;
pub mod data;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod metrics;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use activation::ActivationFunction;
pub use data::{Cell, DataInput, VecDataInput};
pub use error::{BuildError, NetworkError};
pub use layers::{Edge, Layer, LayerType, Node, WeightInit};
pub use loss::OutputType;
pub use metrics::ConfusionMatrix;
pub use network::{LayerBuilder, LayerInfo, NNInfo, Network, NetworkState};
pub use optim::Sgd;
pub use train::{test_network, train_loop, train_network, EpochStats, RunType, Terminator, TrainConfig};
