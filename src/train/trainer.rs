use crate::{
    error::{Error, Result},
    network::network::Network,
};

/// One in-order pass of online SGD over `inputs`, returning the mean
/// per-example MSE.
pub fn train_network(
    network: &mut Network,
    inputs: &[Vec<f64>],
    expected_outputs: &[Vec<f64>],
) -> Result<f64> {
    let order: Vec<usize> = (0..inputs.len()).collect();
    train_batch(network, inputs, expected_outputs, &order)
}

/// Runs `train_step` on the examples named by `indices`, in that order, and
/// returns their mean MSE. Each example updates the weights immediately.
pub fn train_batch(
    network: &mut Network,
    inputs: &[Vec<f64>],
    expected_outputs: &[Vec<f64>],
    indices: &[usize],
) -> Result<f64> {
    if inputs.len() != expected_outputs.len() {
        return Err(Error::LengthMismatch { inputs: inputs.len(), targets: expected_outputs.len() });
    }
    if indices.is_empty() {
        return Ok(0.0);
    }

    let mut total_error = 0.0;
    for &idx in indices {
        let (input, expected) = inputs.get(idx).zip(expected_outputs.get(idx))
            .ok_or_else(|| Error::InvalidConfig(format!(
                "example index {} out of range for {} examples",
                idx, inputs.len()
            )))?;
        total_error += network.train_step(input, expected)?;
    }

    Ok(total_error / indices.len() as f64)
}
