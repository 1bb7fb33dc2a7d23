use crate::data::DataInput;
use crate::error::NetworkError;
use crate::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::loop_fn::train_loop;
use crate::train::terminator::Terminator;
use crate::train::train_config::{RunType, TrainConfig};

/// Trains until `terminator` fires.
pub fn train_network(
    network: &mut Network,
    data: &dyn DataInput,
    terminator: &Terminator,
) -> Result<Option<EpochStats>, NetworkError> {
    train_loop(network, data, terminator, &TrainConfig::new(RunType::Train))
}

/// One forward-only pass over `data` with the current weights.
pub fn test_network(network: &mut Network, data: &dyn DataInput) -> Result<Option<EpochStats>, NetworkError> {
    train_loop(network, data, &Terminator::new(), &TrainConfig::new(RunType::Test))
}
