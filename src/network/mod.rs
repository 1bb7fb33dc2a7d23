pub mod builder;
pub mod network;
pub mod spec;
pub mod state;

pub use builder::LayerBuilder;
pub use network::Network;
pub use spec::{InputLayerInfo, LayerInfo, NNInfo, OutputLayerInfo};
pub use state::NetworkState;
