use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;
use crate::train::trainer::train_batch;

/// Trains `network` for `config.epochs` epochs and returns one `EpochStats`
/// per epoch.
///
/// Each epoch shuffles the example order with `rng`, walks it in batches of
/// `config.batch_size` (the last batch may be short), and evaluates on `test`
/// once the epoch is done. Batches only group examples for reporting: every
/// example updates the weights as soon as it is seen.
///
/// # Errors
/// `InvalidConfig` for an empty training set or unusable batch settings,
/// `LengthMismatch` for ragged datasets, and any `DimensionMismatch` raised
/// by the network on a malformed example.
pub fn train_loop<R: Rng + ?Sized>(
    network: &mut Network,
    train: &Dataset,
    test: &Dataset,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<Vec<EpochStats>> {
    config.validate()?;
    if train.is_empty() {
        return Err(Error::InvalidConfig("training set is empty".to_owned()));
    }
    if train.inputs.len() != train.targets.len() {
        return Err(Error::LengthMismatch { inputs: train.inputs.len(), targets: train.targets.len() });
    }

    let n = train.len();
    let num_batches = n.div_ceil(config.batch_size);
    let mut indices: Vec<usize> = (0..n).collect();
    let mut history = Vec::with_capacity(config.epochs);

    info!(
        epochs = config.epochs,
        batch_size = config.batch_size,
        examples = n,
        "training started"
    );

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();
        indices.shuffle(rng);

        let mut total_error = 0.0;
        for (batch, chunk) in indices.chunks(config.batch_size).enumerate() {
            let batch_error = train_batch(network, &train.inputs, &train.targets, chunk)?;
            total_error += batch_error;

            if (batch + 1) % config.report_every == 0 {
                debug!(epoch, batch = batch + 1, num_batches, error = batch_error, "batch done");
            }
        }

        let avg_error = total_error / num_batches as f64;
        let test_accuracy = network.evaluate(&test.inputs, &test.targets)?;
        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        info!(
            "Epoch {}/{} completed, Avg Error: {:.6}, Test Accuracy: {:.2}%",
            epoch, config.epochs, avg_error, test_accuracy
        );

        history.push(EpochStats {
            epoch,
            total_epochs: config.epochs,
            avg_error,
            test_accuracy,
            elapsed_ms,
        });
    }

    Ok(history)
}
