use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Row-major dense matrix. A layer's weights are stored `[out][in]`, so
/// `rows` is the layer size and `cols` its fan-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Builds a matrix from row vectors, rejecting ragged input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = data.first().map_or(0, |row| row.len());
        if let Some((i, row)) = data.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(Error::InvalidTopology(format!(
                "matrix row {} has {} columns, expected {}",
                i, row.len(), cols
            )));
        }
        Ok(Matrix {
            rows: data.len(),
            cols,
            data
        })
    }

    /// True when `data` really has `rows` rows of `cols` entries each.
    /// Deserialized matrices are not trusted until this holds.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|row| row.len() == self.cols)
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    pub fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Both uniforms on (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// `offset + self · v`, accumulated left to right starting from the offset.
    ///
    /// `v.len()` must equal `cols` and `offset.len()` must equal `rows`;
    /// callers validate before getting here.
    pub fn mul_vec_add(&self, v: &[f64], offset: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.cols);
        debug_assert_eq!(offset.len(), self.rows);
        self.data.iter().zip(offset.iter())
            .map(|(row, &start)| {
                row.iter().zip(v.iter()).fold(start, |acc, (w, x)| acc + w * x)
            })
            .collect()
    }

    /// `selfᵀ · v` without materializing the transpose.
    pub fn transpose_mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.rows);
        (0..self.cols)
            .map(|j| {
                self.data.iter().zip(v.iter()).fold(0.0, |acc, (row, x)| acc + row[j] * x)
            })
            .collect()
    }
}
