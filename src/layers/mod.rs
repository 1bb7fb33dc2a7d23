pub mod edge;
pub mod layer;
pub mod node;

pub use edge::Edge;
pub use layer::{Layer, LayerType};
pub use node::{Node, WeightInit};
