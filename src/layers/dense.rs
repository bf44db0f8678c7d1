use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{activation::sigmoid::Sigmoid, error::{Error, Result}, math::matrix::Matrix};

/// Scale applied to N(0, 1) samples when drawing initial biases.
pub const BIAS_INIT_SCALE: f64 = 0.1;

/// A fully-connected sigmoid layer. `weights` is `[size][input_size]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer{
    pub weights: Matrix,
    pub biases: Vec<f64>,
}

impl Layer {
    /// Draws weights from N(0, 1) scaled by `sqrt(2 / (input_size + size))`
    /// and biases from N(0, 1) scaled by `BIAS_INIT_SCALE`.
    ///
    /// Samples are drawn neuron by neuron: a neuron's incoming weights, then
    /// its bias.
    pub fn new<R: Rng + ?Sized>(input_size: usize, size: usize, rng: &mut R) -> Layer {
        let scale = (2.0 / (input_size + size) as f64).sqrt();
        let mut weights = Matrix::zeros(size, input_size);
        let mut biases = vec![0.0; size];

        for (row, bias) in weights.data.iter_mut().zip(biases.iter_mut()) {
            for w in row.iter_mut() {
                *w = Matrix::sample_standard_normal(rng) * scale;
            }
            *bias = Matrix::sample_standard_normal(rng) * BIAS_INIT_SCALE;
        }

        Layer { weights, biases }
    }

    /// Wraps explicit parameters, checking them with `validate`.
    pub fn from_parts(weights: Matrix, biases: Vec<f64>) -> Result<Layer> {
        let layer = Layer { weights, biases };
        layer.validate()?;
        Ok(layer)
    }

    /// Checks that the weight matrix is non-empty and really has the shape
    /// it claims, and that there is one bias per weight row.
    pub fn validate(&self) -> Result<()> {
        let weights = &self.weights;
        if !weights.is_consistent() {
            return Err(Error::InvalidTopology(format!(
                "weight matrix claims {}x{} but its data disagrees",
                weights.rows, weights.cols
            )));
        }
        if weights.rows == 0 || weights.cols == 0 {
            return Err(Error::InvalidTopology(format!(
                "layer weights must be non-empty, got {}x{}",
                weights.rows, weights.cols
            )));
        }
        if self.biases.len() != weights.rows {
            return Err(Error::InvalidTopology(format!(
                "layer has {} weight rows but {} biases",
                weights.rows, self.biases.len()
            )));
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.weights.rows
    }

    pub fn input_size(&self) -> usize {
        self.weights.cols
    }

    /// Returns `(z, a)` where `z = b + W·input` and `a = σ(z)`.
    pub fn feed_from(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let z = self.weights.mul_vec_add(input, &self.biases);
        let a = z.iter().map(|&x| Sigmoid::function(x)).collect();
        (z, a)
    }

    /// δ = error ⊙ σ'(z), where `error` is ∂L/∂a for this layer.
    pub fn layer_delta(error: &[f64], z: &[f64]) -> Vec<f64> {
        error.iter().zip(z.iter())
            .map(|(e, &x)| e * Sigmoid::derivative(x))
            .collect()
    }

    /// Carries this layer's δ back through Wᵀ, giving ∂L/∂a of the layer below.
    pub fn propagate_error(&self, delta: &[f64]) -> Vec<f64> {
        self.weights.transpose_mul_vec(delta)
    }

    /// `W[j][k] -= lr * δ[j] * input[k]`, `b[j] -= lr * δ[j]`.
    pub fn apply_gradients(&mut self, delta: &[f64], inputs: &[f64], lr: f64) {
        for ((row, bias), &d) in self.weights.data.iter_mut().zip(self.biases.iter_mut()).zip(delta.iter()) {
            *bias -= lr * d;
            for (w, &x) in row.iter_mut().zip(inputs.iter()) {
                *w -= lr * d * x;
            }
        }
    }
}
