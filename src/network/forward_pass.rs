/// Everything one forward pass computed, kept for the backward pass.
///
/// `activations` has one entry per layer including the raw input at index 0;
/// `z_values` has one entry per weight layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    pub(crate) activations: Vec<Vec<f64>>,
    pub(crate) z_values: Vec<Vec<f64>>,
}

impl ForwardPass {
    pub fn activations(&self) -> &[Vec<f64>] {
        &self.activations
    }

    pub fn z_values(&self) -> &[Vec<f64>] {
        &self.z_values
    }

    /// Activations of the output layer.
    pub fn output(&self) -> &[f64] {
        self.activations.last().map_or(&[], |a| a.as_slice())
    }

    pub fn into_output(mut self) -> Vec<f64> {
        self.activations.pop().unwrap_or_default()
    }
}
