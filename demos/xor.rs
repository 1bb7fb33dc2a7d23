use std::sync::mpsc;
use std::thread;

use synapse_nn::{
    test_network, train_loop, ActivationFunction, LayerInfo, NNInfo, Network, OutputType, RunType,
    Terminator, TrainConfig, VecDataInput,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let inputs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let expected_outputs = vec![
        vec![0.0],
        vec![1.0],
        vec![1.0],
        vec![0.0],
    ];
    let data = VecDataInput::from_numeric(inputs.clone(), expected_outputs);

    let info = NNInfo::new(
        "xor",
        LayerInfo::new(1, ActivationFunction::Sigmoid).with_learning_rate(0.03),
        OutputType::Classification,
    )
    .with_hidden(LayerInfo::new(2, ActivationFunction::ReLU).with_learning_rate(0.03))
    .with_batch_size(1)
    .with_seed(1);

    let mut network = Network::new(info);
    network.prepare(&data)?;

    // fixed starting point; later runs keep the built layers
    let layers = network.builder_mut().layers_mut();
    for (node, weights) in layers[0].nodes.iter_mut().zip([[0.25, 0.02], [-0.87, 0.97]]) {
        node.set_edge_weight(0, weights[0]);
        node.set_edge_weight(1, weights[1]);
    }
    layers[1].nodes[0].set_edge_weight(0, 0.58);
    layers[1].nodes[0].set_edge_weight(1, 0.94);

    let terminator = Terminator::new().with_epoch(10_000).with_accuracy(95.0);

    let (tx, rx) = mpsc::channel::<synapse_nn::EpochStats>();
    let printer = thread::spawn(move || {
        for stats in rx {
            if stats.epoch % 10 == 0 {
                println!("Epoch {}: error = {:.6}, accuracy = {:.2}%", stats.epoch, stats.total_error, stats.accuracy);
            }
        }
    });

    let config = TrainConfig::new(RunType::Train).with_progress(tx);
    train_loop(&mut network, &data, &terminator, &config)?;
    drop(config);
    printer.join().ok();

    if let Some(stats) = test_network(&mut network, &data)? {
        println!("Test accuracy: {:.2}%", stats.accuracy);
    }
    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, network.predict(input)?[0]);
    }
    Ok(())
}
