pub mod epoch_stats;
pub mod loop_fn;
pub mod terminator;
pub mod train_config;
pub mod trainer;

pub use epoch_stats::{ClassificationStats, EpochStats};
pub use loop_fn::train_loop;
pub use terminator::Terminator;
pub use train_config::{RunType, TrainConfig};
pub use trainer::{test_network, train_network};
