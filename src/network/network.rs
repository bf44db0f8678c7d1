use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::Rng;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::layers::dense::Layer;
use crate::loss::mse::MseLoss;
use crate::math::vector::argmax;
use crate::network::forward_pass::ForwardPass;
use crate::optim::sgd::Sgd;

pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// A fully-connected sigmoid network trained with per-example SGD on MSE.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Network {
    topology: Vec<usize>,
    #[serde(rename = "learning_rate")]
    optimizer: Sgd,
    layers: Vec<Layer>,
}

/// On-disk form; only becomes a `Network` after its shapes are checked.
#[derive(Deserialize)]
struct StoredNetwork {
    topology: Vec<usize>,
    learning_rate: f64,
    layers: Vec<Layer>,
}

impl Network {
    /// Builds a randomly initialized network.
    ///
    /// `topology` lists the neuron count of every layer, input first. It must
    /// have at least two entries, none of them zero.
    pub fn new<R: Rng + ?Sized>(topology: &[usize], learning_rate: f64, rng: &mut R) -> Result<Network> {
        validate_topology(topology)?;
        let optimizer = Sgd::new(learning_rate)?;

        let layers = topology.windows(2)
            .map(|pair| Layer::new(pair[0], pair[1], &mut *rng))
            .collect();

        debug!(?topology, learning_rate, "initialized network");
        Ok(Network { topology: topology.to_vec(), optimizer, layers })
    }

    /// Builds a network from explicit layers, e.g. fixed weights for a test.
    /// Every layer must pass `Layer::validate`, and each layer's input size
    /// must equal the previous layer's size.
    pub fn from_parameters(layers: Vec<Layer>, learning_rate: f64) -> Result<Network> {
        let first = layers.first()
            .ok_or_else(|| Error::InvalidTopology("a network needs at least one weight layer".to_owned()))?;
        let mut topology = vec![first.input_size()];
        for (i, layer) in layers.iter().enumerate() {
            layer.validate()?;
            let expected = topology[i];
            if layer.input_size() != expected {
                return Err(Error::InvalidTopology(format!(
                    "layer {} expects {} inputs but the layer below has {} neurons",
                    i + 1, layer.input_size(), expected
                )));
            }
            topology.push(layer.size());
        }
        validate_topology(&topology)?;
        let optimizer = Sgd::new(learning_rate)?;
        Ok(Network { topology, optimizer, layers })
    }

    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate
    }

    pub fn input_size(&self) -> usize {
        self.topology[0]
    }

    pub fn output_size(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    /// Runs the input through every layer and keeps all intermediate values.
    pub fn forward_pass(&self, input: &[f64]) -> Result<ForwardPass> {
        if input.len() != self.input_size() {
            return Err(Error::dimension("input", self.input_size(), input.len()));
        }

        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut z_values = Vec::with_capacity(self.layers.len());
        activations.push(input.to_vec());

        for layer in &self.layers {
            let (z, a) = layer.feed_from(&activations[activations.len() - 1]);
            z_values.push(z);
            activations.push(a);
        }

        Ok(ForwardPass { activations, z_values })
    }

    /// Output-layer activations for one input, each in (0, 1).
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        Ok(self.forward_pass(input)?.into_output())
    }

    /// Index of the strongest output unit (lowest index on ties).
    pub fn predict(&self, input: &[f64]) -> Result<usize> {
        let output = self.forward(input)?;
        // forward() never returns an empty output for a validated topology
        Ok(argmax(&output).unwrap_or(0))
    }

    /// Computes δ for every weight layer, output layer last.
    ///
    /// The output δ is `(a - t) ⊙ σ'(z)`; each layer below receives
    /// `(Wᵀ δ) ⊙ σ'(z)` from the layer above.
    pub fn backpropagate(&self, pass: &ForwardPass, target: &[f64]) -> Result<Vec<Vec<f64>>> {
        if target.len() != self.output_size() {
            return Err(Error::dimension("target", self.output_size(), target.len()));
        }
        self.check_pass(pass)?;

        let n = self.layers.len();
        let mut deltas: Vec<Vec<f64>> = vec![Vec::new(); n];

        let error = MseLoss::derivative(pass.output(), target);
        deltas[n - 1] = Layer::layer_delta(&error, &pass.z_values[n - 1]);

        for l in (0..n - 1).rev() {
            let error = self.layers[l + 1].propagate_error(&deltas[l + 1]);
            deltas[l] = Layer::layer_delta(&error, &pass.z_values[l]);
        }

        Ok(deltas)
    }

    /// One online gradient step on a single example.
    ///
    /// Returns the MSE of the output computed *before* the update. Shapes are
    /// checked before any weight is touched, so a failed call leaves the
    /// network unchanged.
    pub fn train_step(&mut self, input: &[f64], target: &[f64]) -> Result<f64> {
        if target.len() != self.output_size() {
            return Err(Error::dimension("target", self.output_size(), target.len()));
        }
        let pass = self.forward_pass(input)?;
        let deltas = self.backpropagate(&pass, target)?;

        // Borrow-checker ordering: all δ are computed from pre-update weights first.
        let optimizer = self.optimizer;
        for (l, (layer, delta)) in self.layers.iter_mut().zip(deltas.iter()).enumerate() {
            optimizer.step(layer, delta, &pass.activations[l]);
        }

        Ok(MseLoss::loss(pass.output(), target))
    }

    /// Percentage of examples, in [0, 100], whose predicted class matches the
    /// argmax of the target. An empty set scores 0.
    pub fn evaluate(&self, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<f64> {
        if inputs.len() != targets.len() {
            return Err(Error::LengthMismatch { inputs: inputs.len(), targets: targets.len() });
        }
        if inputs.is_empty() {
            return Ok(0.0);
        }

        let mut correct = 0usize;
        for (input, target) in inputs.iter().zip(targets.iter()) {
            if target.len() != self.output_size() {
                return Err(Error::dimension("target", self.output_size(), target.len()));
            }
            if Some(self.predict(input)?) == argmax(target) {
                correct += 1;
            }
        }

        Ok(100.0 * correct as f64 / inputs.len() as f64)
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network previously written by `save_json`, re-checking
    /// every shape.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Network> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let reader = BufReader::new(file);
        let stored: StoredNetwork = serde_json::from_reader(reader)?;

        let network = Network::from_parameters(stored.layers, stored.learning_rate)?;
        if network.topology != stored.topology {
            return Err(Error::InvalidTopology(format!(
                "stored topology {:?} does not match layer shapes {:?}",
                stored.topology, network.topology
            )));
        }
        Ok(network)
    }

    fn check_pass(&self, pass: &ForwardPass) -> Result<()> {
        if pass.z_values.len() != self.layers.len() || pass.activations.len() != self.layers.len() + 1 {
            return Err(Error::dimension("forward pass layer count", self.layers.len(), pass.z_values.len()));
        }
        for (l, layer) in self.layers.iter().enumerate() {
            if pass.activations[l].len() != layer.input_size() {
                return Err(Error::dimension("forward pass activation", layer.input_size(), pass.activations[l].len()));
            }
            if pass.z_values[l].len() != layer.size() {
                return Err(Error::dimension("forward pass z-value", layer.size(), pass.z_values[l].len()));
            }
        }
        if pass.output().len() != self.output_size() {
            return Err(Error::dimension("forward pass output", self.output_size(), pass.output().len()));
        }
        Ok(())
    }
}

fn validate_topology(topology: &[usize]) -> Result<()> {
    if topology.len() < 2 {
        return Err(Error::InvalidTopology(format!(
            "need at least 2 layers, got {}",
            topology.len()
        )));
    }
    if let Some(i) = topology.iter().position(|&size| size == 0) {
        return Err(Error::InvalidTopology(format!("layer {} has zero neurons", i)));
    }
    Ok(())
}
