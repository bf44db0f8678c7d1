use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::data::{idx::parse_idx_pair, Dataset};
use crate::error::{Error, Result};

pub const TRAIN_IMAGES_FILE: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS_FILE: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES_FILE: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS_FILE: &str = "t10k-labels-idx1-ubyte";

/// Number of digit classes.
pub const MNIST_CLASSES: usize = 10;

/// Loads the four standard MNIST files from one directory.
#[derive(Debug, Clone)]
pub struct MnistLoader {
    data_dir: PathBuf,
}

impl MnistLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> MnistLoader {
        MnistLoader { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Training split, keeping at most `limit` examples.
    pub fn load_training(&self, limit: Option<usize>) -> Result<Dataset> {
        self.load_pair(TRAIN_IMAGES_FILE, TRAIN_LABELS_FILE, limit)
    }

    /// Test split, keeping at most `limit` examples.
    pub fn load_test(&self, limit: Option<usize>) -> Result<Dataset> {
        self.load_pair(TEST_IMAGES_FILE, TEST_LABELS_FILE, limit)
    }

    fn load_pair(&self, images_file: &str, labels_file: &str, limit: Option<usize>) -> Result<Dataset> {
        let images_path = self.data_dir.join(images_file);
        let labels_path = self.data_dir.join(labels_file);

        let image_bytes = fs::read(&images_path).map_err(|e| Error::io(&images_path, e))?;
        let label_bytes = fs::read(&labels_path).map_err(|e| Error::io(&labels_path, e))?;

        let dataset = parse_idx_pair(&image_bytes, &label_bytes, MNIST_CLASSES, limit)
            .map_err(|e| match e {
                Error::Format(msg) => Error::Format(format!(
                    "{} ({} / {}): {}",
                    self.data_dir.display(), images_file, labels_file, msg
                )),
                other => other,
            })?;
        debug!(path = %images_path.display(), examples = dataset.len(), "loaded IDX pair");
        Ok(dataset)
    }
}
