use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

/// Configuration for a `train_loop` run and the dataset it reads.
///
/// Every field has a default, so a JSON config file only needs to name the
/// fields it changes.
///
/// # Fields
/// - `data_dir`      — directory holding the four MNIST IDX files
/// - `topology`      — neuron count per layer, input first
/// - `learning_rate` — SGD step size
/// - `epochs`        — total number of full passes over the training data
/// - `batch_size`    — examples per reporting batch; gradients are never averaged
/// - `train_limit`   — keep at most this many training examples (`None` = all)
/// - `test_limit`    — keep at most this many test examples (`None` = all)
/// - `seed`          — RNG seed for initialization and shuffling (`None` = random)
/// - `report_every`  — log batch progress every this many batches
/// - `preview`       — number of test predictions to print after training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub data_dir: PathBuf,
    pub topology: Vec<usize>,
    pub learning_rate: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub train_limit: Option<usize>,
    pub test_limit: Option<usize>,
    pub seed: Option<u64>,
    pub report_every: usize,
    pub preview: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            data_dir: PathBuf::from("./data"),
            topology: vec![784, 30, 10],
            learning_rate: 0.1,
            epochs: 10,
            batch_size: 100,
            train_limit: Some(10_000),
            test_limit: Some(1_000),
            seed: None,
            report_every: 10,
            preview: 5,
        }
    }
}

impl TrainConfig {
    /// Checks the driver-level settings. Topology and learning rate are
    /// checked again when the network is built.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".to_owned()));
        }
        if self.report_every == 0 {
            return Err(Error::InvalidConfig("report_every must be at least 1".to_owned()));
        }
        if self.topology.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "topology needs an input and an output layer, got {:?}",
                self.topology
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be finite and positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Reads a config from JSON; missing fields keep their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<TrainConfig> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let config: TrainConfig = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_mnist_run() {
        let config = TrainConfig::default();
        assert_eq!(config.topology, vec![784, 30, 10]);
        assert_eq!(config.epochs, 10);
        assert_eq!(config.batch_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: TrainConfig = serde_json::from_str(r#"{ "epochs": 3, "seed": 42 }"#).unwrap();
        assert_eq!(config.epochs, 3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.learning_rate, 0.1);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = TrainConfig { batch_size: 0, ..TrainConfig::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = TrainConfig { epochs: 2, train_limit: None, ..TrainConfig::default() };
        config.save_json(&path).unwrap();
        assert_eq!(TrainConfig::load_json(&path).unwrap(), config);
    }
}
