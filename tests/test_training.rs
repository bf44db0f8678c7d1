// Tests for the training driver and the MNIST directory loader.

use std::path::Path;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use sigmoid_mlp::data::idx::{IMAGE_MAGIC, LABEL_MAGIC};
use sigmoid_mlp::data::mnist::{TEST_IMAGES_FILE, TEST_LABELS_FILE, TRAIN_IMAGES_FILE, TRAIN_LABELS_FILE};
use sigmoid_mlp::train::train_batch;
use sigmoid_mlp::{train_loop, train_network, Dataset, Error, MnistLoader, Network, TrainConfig};

// ============================================================================
// Fixtures
// ============================================================================

// Two well-separated classes in 2D, repeated `copies` times.
fn toy_dataset(copies: usize) -> Dataset {
    let mut inputs = Vec::new();
    let mut targets = Vec::new();
    for _ in 0..copies {
        inputs.push(vec![1.0, 0.0]);
        targets.push(vec![1.0, 0.0]);
        inputs.push(vec![0.0, 1.0]);
        targets.push(vec![0.0, 1.0]);
    }
    Dataset { inputs, targets }
}

fn toy_config(epochs: usize) -> TrainConfig {
    TrainConfig {
        topology: vec![2, 4, 2],
        learning_rate: 0.5,
        epochs,
        batch_size: 3,
        seed: Some(42),
        ..TrainConfig::default()
    }
}

fn run(config: &TrainConfig) -> (Network, Vec<sigmoid_mlp::EpochStats>) {
    let mut rng = StdRng::seed_from_u64(config.seed.unwrap());
    let mut net = Network::new(&config.topology, config.learning_rate, &mut rng).unwrap();
    let data = toy_dataset(10);
    let history = train_loop(&mut net, &data, &data, config, &mut rng).unwrap();
    (net, history)
}

fn write_idx_images(path: &Path, images: &[[u8; 4]]) {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&IMAGE_MAGIC.to_be_bytes());
    bytes.extend_from_slice(&(images.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&2u32.to_be_bytes());
    bytes.extend_from_slice(&2u32.to_be_bytes());
    for image in images {
        bytes.extend_from_slice(image);
    }
    std::fs::write(path, bytes).unwrap();
}

fn write_idx_labels(path: &Path, labels: &[u8]) {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&LABEL_MAGIC.to_be_bytes());
    bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    bytes.extend_from_slice(labels);
    std::fs::write(path, bytes).unwrap();
}

// ============================================================================
// Training driver
// ============================================================================

#[test]
fn test_train_loop_reports_every_epoch() {
    let (_, history) = run(&toy_config(4));
    assert_eq!(history.len(), 4);
    for (i, stats) in history.iter().enumerate() {
        assert_eq!(stats.epoch, i + 1);
        assert_eq!(stats.total_epochs, 4);
        assert!(stats.avg_error.is_finite() && stats.avg_error >= 0.0);
        assert!((0.0..=100.0).contains(&stats.test_accuracy));
    }
}

#[test]
fn test_train_loop_is_reproducible_for_a_seed() {
    let (net_a, hist_a) = run(&toy_config(3));
    let (net_b, hist_b) = run(&toy_config(3));
    assert_eq!(net_a, net_b);
    let errors = |h: &[sigmoid_mlp::EpochStats]| h.iter().map(|s| s.avg_error).collect::<Vec<_>>();
    assert_eq!(errors(&hist_a), errors(&hist_b));
}

#[test]
fn test_train_loop_learns_separable_classes() {
    let (_, history) = run(&toy_config(60));
    let first = &history[0];
    let last = history.last().unwrap();
    assert!(last.avg_error < first.avg_error);
    assert_eq!(last.test_accuracy, 100.0);
}

#[test]
fn test_train_loop_rejects_empty_training_set() {
    let config = toy_config(1);
    let mut rng = StdRng::seed_from_u64(1);
    let mut net = Network::new(&config.topology, config.learning_rate, &mut rng).unwrap();
    let err = train_loop(&mut net, &Dataset::default(), &toy_dataset(1), &config, &mut rng).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn test_train_loop_surfaces_bad_examples() {
    let config = toy_config(1);
    let mut rng = StdRng::seed_from_u64(1);
    let mut net = Network::new(&config.topology, config.learning_rate, &mut rng).unwrap();
    let bad = Dataset { inputs: vec![vec![1.0, 0.0, 0.0]], targets: vec![vec![1.0, 0.0]] };
    let err = train_loop(&mut net, &bad, &bad, &config, &mut rng).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { .. }));
}

#[test]
fn test_partial_batch_counts_as_a_full_batch() {
    // 5 examples in batches of 2: sizes 2, 2, 1, each batch mean weighted equally.
    let config = TrainConfig { batch_size: 2, epochs: 1, ..toy_config(1) };
    let mut data = toy_dataset(2);
    data.inputs.push(vec![0.5, 0.5]);
    data.targets.push(vec![1.0, 0.0]);

    let mut rng = StdRng::seed_from_u64(17);
    let mut net = Network::new(&config.topology, config.learning_rate, &mut rng).unwrap();

    let mut replay_net = net.clone();
    let mut replay_rng = rng.clone();
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.shuffle(&mut replay_rng);
    let batch_means: Vec<f64> = order.chunks(2)
        .map(|chunk| train_batch(&mut replay_net, &data.inputs, &data.targets, chunk).unwrap())
        .collect();
    assert_eq!(batch_means.len(), 3);
    let expected = batch_means.iter().sum::<f64>() / 3.0;

    let history = train_loop(&mut net, &data, &data, &config, &mut rng).unwrap();
    assert_eq!(history[0].avg_error, expected);
    assert_eq!(net, replay_net);
}

#[test]
fn test_train_network_returns_mean_error() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut net = Network::new(&[2, 3, 2], 0.1, &mut rng).unwrap();
    let data = toy_dataset(2);

    let expected: f64 = {
        let mut copy = net.clone();
        data.inputs.iter().zip(&data.targets)
            .map(|(x, t)| copy.train_step(x, t).unwrap())
            .sum::<f64>() / data.len() as f64
    };
    let mean = train_network(&mut net, &data.inputs, &data.targets).unwrap();
    assert_eq!(mean, expected);
}

// ============================================================================
// MNIST loader
// ============================================================================

#[test]
fn test_mnist_loader_reads_both_splits() {
    let dir = tempfile::tempdir().unwrap();
    write_idx_images(&dir.path().join(TRAIN_IMAGES_FILE), &[[0, 255, 0, 255], [255, 0, 255, 0], [0; 4]]);
    write_idx_labels(&dir.path().join(TRAIN_LABELS_FILE), &[7, 2, 0]);
    write_idx_images(&dir.path().join(TEST_IMAGES_FILE), &[[255; 4]]);
    write_idx_labels(&dir.path().join(TEST_LABELS_FILE), &[9]);

    let loader = MnistLoader::new(dir.path());
    let train = loader.load_training(Some(2)).unwrap();
    assert_eq!(train.len(), 2);
    assert_eq!(train.inputs[0], vec![0.0, 1.0, 0.0, 1.0]);
    assert_eq!(train.targets[0].len(), 10);
    assert_eq!(train.targets[0][7], 1.0);
    assert_eq!(train.targets[1][2], 1.0);

    let test = loader.load_test(None).unwrap();
    assert_eq!(test.len(), 1);
    assert_eq!(test.inputs[0], vec![1.0; 4]);
    assert_eq!(test.targets[0][9], 1.0);
}

#[test]
fn test_mnist_loader_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let err = MnistLoader::new(dir.path()).load_training(None).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains(TRAIN_IMAGES_FILE));
}

#[test]
fn test_mnist_loader_rejects_swapped_files() {
    let dir = tempfile::tempdir().unwrap();
    // Label file where the image file should be.
    write_idx_labels(&dir.path().join(TEST_IMAGES_FILE), &[1, 2]);
    write_idx_labels(&dir.path().join(TEST_LABELS_FILE), &[1, 2]);
    let err = MnistLoader::new(dir.path()).load_test(None).unwrap_err();
    assert!(matches!(err, Error::Format(_)));
    assert!(err.to_string().contains("magic"));
}
