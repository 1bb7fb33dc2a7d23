use synapse_nn::{
    test_network, train_network, ActivationFunction, LayerInfo, NNInfo, Network, OutputType, Terminator,
    VecDataInput,
};

fn xor_data() -> VecDataInput {
    VecDataInput::from_numeric(
        vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
        vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]],
    )
}

/// 2-2-1 classifier starting from fixed weights, so a run is fully
/// deterministic.
fn xor_net(hidden: ActivationFunction) -> Network {
    let output = LayerInfo::new(1, ActivationFunction::Sigmoid).with_learning_rate(0.03);
    let info = NNInfo::new("xor", output, OutputType::Classification)
        .with_hidden(LayerInfo::new(2, hidden).with_learning_rate(0.03))
        .with_batch_size(1)
        .with_seed(0);

    let mut net = Network::new(info);
    net.prepare(&xor_data()).unwrap();

    let layers = net.builder_mut().layers_mut();
    for (node, weights) in layers[0].nodes.iter_mut().zip([[0.25, 0.02], [-0.87, 0.97]]) {
        node.set_edge_weight(0, weights[0]);
        node.set_edge_weight(1, weights[1]);
    }
    layers[1].nodes[0].set_edge_weight(0, 0.58);
    layers[1].nodes[0].set_edge_weight(1, 0.94);
    net
}

fn all_weights_finite(net: &Network) -> bool {
    net.builder()
        .layers()
        .iter()
        .all(|l| l.bias().is_finite() && l.edge_weights().all(f64::is_finite))
}

#[test]
fn xor_converges_on_held_out_rows() {
    let terminator = Terminator::new().with_epoch(10_000).with_accuracy(95.0);
    let mut net = xor_net(ActivationFunction::ReLU);

    let last = train_network(&mut net, &xor_data(), &terminator).unwrap().unwrap();
    assert!(last.accuracy >= 95.0, "stopped at epoch {} with {}%", last.epoch, last.accuracy);
    assert!(last.epoch < 10_000);

    let held_out = test_network(&mut net, &xor_data()).unwrap().unwrap();
    assert!(held_out.accuracy >= 90.0, "held-out accuracy {}", held_out.accuracy);
}

#[test]
fn trained_network_predicts_the_truth_table() {
    let terminator = Terminator::new().with_epoch(10_000).with_accuracy(95.0);
    let mut net = xor_net(ActivationFunction::ReLU);
    train_network(&mut net, &xor_data(), &terminator).unwrap();

    for (features, expected) in [([0.0, 0.0], 0.0), ([0.0, 1.0], 1.0), ([1.0, 0.0], 1.0), ([1.0, 1.0], 0.0)] {
        let out = net.predict(&features).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0] - expected).abs() < 0.5, "{features:?} -> {}", out[0]);
    }
}

#[test]
fn sigmoid_hidden_layer_learns_part_of_xor() {
    let mut net = xor_net(ActivationFunction::Sigmoid);
    let untrained = test_network(&mut net, &xor_data()).unwrap().unwrap().accuracy;

    // sigmoid hidden nodes only see the output-side bias, so XOR plateaus short of 95%
    let terminator = Terminator::new().with_epoch(2_000).with_accuracy(95.0);
    train_network(&mut net, &xor_data(), &terminator).unwrap();
    let trained = test_network(&mut net, &xor_data()).unwrap().unwrap().accuracy;

    assert!(all_weights_finite(&net));
    assert!(trained >= untrained + 10.0, "{untrained}% -> {trained}%");
}
