use serde::{Serialize, Deserialize};

use crate::{error::{Error, Result}, layers::dense::Layer};

/// Plain per-example gradient descent; carries only the learning rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Result<Sgd> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::InvalidLearningRate(learning_rate));
        }
        Ok(Sgd { learning_rate })
    }

    /// Applies one update to a layer from its δ and the activations it was fed.
    pub fn step(&self, layer: &mut Layer, delta: &[f64], inputs: &[f64]) {
        layer.apply_gradients(delta, inputs, self.learning_rate);
    }
}
