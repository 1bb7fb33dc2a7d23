use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};

use synapse_nn::{
    test_network, train_loop, train_network, ActivationFunction, BuildError, Cell, LayerInfo, NNInfo,
    Network, NetworkError, OutputType, RunType, Terminator, TrainConfig, VecDataInput,
};

fn regression_data() -> VecDataInput {
    let rows: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64 / 8.0, 1.0 - i as f64 / 8.0]).collect();
    let expected = rows.iter().map(|r| vec![0.2 + 0.5 * r[0]]).collect();
    VecDataInput::from_numeric(rows, expected)
}

fn regression_info(seed: u64) -> NNInfo {
    NNInfo::new(
        "line",
        LayerInfo::new(1, ActivationFunction::Linear).with_activation_param(1.0).with_learning_rate(0.05),
        OutputType::Regression,
    )
    .with_hidden(LayerInfo::new(3, ActivationFunction::Tanh).with_learning_rate(0.05))
    .with_seed(seed)
}

fn one_hot_data() -> VecDataInput {
    VecDataInput::from_numeric(
        vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.9, 0.1], vec![0.1, 0.9]],
        vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
    )
}

fn classifier_info(output_type: OutputType) -> NNInfo {
    NNInfo::new(
        "two-class",
        LayerInfo::new(2, ActivationFunction::Sigmoid).with_learning_rate(0.05),
        output_type,
    )
    .with_hidden(LayerInfo::new(3, ActivationFunction::Tanh).with_learning_rate(0.05).with_dropout(0.3))
    .with_batch_size(2)
    .with_seed(11)
}

#[test]
fn test_runs_are_deterministic() {
    let mut net = Network::new(regression_info(5));
    let data = regression_data();

    let first = test_network(&mut net, &data).unwrap().unwrap();
    let first_results = net.results().to_vec();
    let second = test_network(&mut net, &data).unwrap().unwrap();

    assert_eq!(first.total_error, second.total_error);
    assert_eq!(first.accuracy, second.accuracy);
    assert_eq!(net.results(), first_results.as_slice());
    assert_eq!(second.epoch, 2);
}

#[test]
fn same_seed_same_training() {
    let terminator = Terminator::new().with_epoch(25);
    let mut a = Network::new(classifier_info(OutputType::Classification));
    let mut b = Network::new(classifier_info(OutputType::Classification));
    train_network(&mut a, &one_hot_data(), &terminator).unwrap();
    train_network(&mut b, &one_hot_data(), &terminator).unwrap();

    assert_eq!(a.learning_curve(), b.learning_curve());
    assert_eq!(a.predict(&[0.8, 0.2]).unwrap(), b.predict(&[0.8, 0.2]).unwrap());
}

#[test]
fn regression_error_falls() {
    let mut net = Network::new(regression_info(1));
    train_network(&mut net, &regression_data(), &Terminator::new().with_epoch(300)).unwrap();

    let curve = net.learning_curve();
    assert_eq!(curve.len(), 300);
    assert_eq!(curve[0].0, 1);
    assert!(curve[299].1 < curve[0].1);
    assert!(curve.iter().all(|(_, e)| e.is_finite()));
}

#[test]
fn progress_is_reported_every_epoch() {
    let (tx, rx) = mpsc::channel();
    let config = TrainConfig::new(RunType::Train).with_progress(tx);
    let mut net = Network::new(classifier_info(OutputType::Classification));

    let last = train_loop(&mut net, &one_hot_data(), &Terminator::new().with_epoch(5), &config)
        .unwrap()
        .unwrap();
    drop(config);

    let received: Vec<_> = rx.iter().collect();
    assert_eq!(received.len(), 5);
    assert_eq!(received.iter().map(|s| s.epoch).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    assert_eq!(received[4], last);

    let classification = last.classification.expect("classification stats");
    let counted: u64 = classification.matrix.iter().flatten().sum();
    assert!(counted <= 4);
    assert_eq!(classification.matrix.len(), 2);
    assert!((0.0..=100.0).contains(&classification.f1));
}

#[test]
fn raised_stop_flag_prevents_any_epoch() {
    let flag = Arc::new(AtomicBool::new(true));
    let config = TrainConfig::new(RunType::Train).with_stop_flag(flag);
    let mut net = Network::new(regression_info(2));

    // the terminator alone would never fire
    let last = train_loop(&mut net, &regression_data(), &Terminator::new(), &config).unwrap();
    assert!(last.is_none());
    assert_eq!(net.epochs(), 0);
    assert!(net.builder().is_built());
}

#[test]
fn dropped_receiver_ends_training() {
    let (tx, rx) = mpsc::channel();
    drop(rx);
    let config = TrainConfig::new(RunType::Train).with_progress(tx);
    let mut net = Network::new(regression_info(3));

    train_loop(&mut net, &regression_data(), &Terminator::new(), &config).unwrap();
    assert_eq!(net.epochs(), 1);
}

#[test]
fn training_continues_across_runs() {
    let mut net = Network::new(regression_info(4));
    train_network(&mut net, &regression_data(), &Terminator::new().with_epoch(10)).unwrap();
    assert_eq!(net.epochs(), 10);

    let before = net.predict(&[0.5, 0.5]).unwrap();
    let subset = VecDataInput::from_numeric(vec![vec![0.25, 0.75]], vec![vec![0.325]]);
    let stats = test_network(&mut net, &subset).unwrap().unwrap();
    assert_eq!(stats.epoch, 11);
    assert_eq!(net.builder().input_layers().len(), 1);
    assert_eq!(net.predict(&[0.5, 0.5]).unwrap(), before);

    train_network(&mut net, &regression_data(), &Terminator::new().with_epoch(5)).unwrap();
    assert_eq!(net.epochs(), 15);

    let wider = VecDataInput::from_numeric(vec![vec![0.1, 0.2, 0.3]], vec![vec![0.0]]);
    let err = test_network(&mut net, &wider).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::Build(BuildError::RowWidthMismatch { expected: 2, actual: 3, .. })
    ));
}

#[test]
fn text_features_need_categorical_columns() {
    let rows = vec![vec![Cell::from("a"), Cell::from(0.5)], vec![Cell::from("b"), Cell::from(0.1)]];
    let data = VecDataInput::new(rows, vec![vec![1.0], vec![0.0]]);
    let mut net = Network::new(regression_info(6));

    let err = train_network(&mut net, &data, &Terminator::new().with_epoch(1)).unwrap_err();
    assert!(matches!(err, NetworkError::Build(BuildError::CategoricalInNumericColumn { row: 0, col: 0 })));
    assert_eq!(net.epochs(), 0);
    assert!(!net.builder().is_built());
}

#[test]
fn kl_output_tracks_confusion_stats() {
    let mut net = Network::new(classifier_info(OutputType::Kl));
    let last = train_network(&mut net, &one_hot_data(), &Terminator::new().with_epoch(20))
        .unwrap()
        .unwrap();

    assert!(last.total_error.is_finite());
    assert!(last.classification.is_some());
    assert_eq!(net.confusion_matrix().classes(), 2);
    assert!(net.builder().layers().iter().all(|l| l.dropout_mask().is_empty()));
}

#[test]
fn full_batch_when_batch_size_is_zero() {
    let info = regression_info(8);
    assert_eq!(info.batch_size(), 0);
    let mut net = Network::new(info);
    train_network(&mut net, &regression_data(), &Terminator::new().with_epoch(3)).unwrap();

    // 8 rows in one window: each edge holds the deltas since the last boundary
    let edge = &net.builder().layers()[0].nodes[0].edges()[0];
    assert_eq!(edge.delta_count(), 8);
    assert_eq!(net.learning_curve()[2].0, 3);
}
