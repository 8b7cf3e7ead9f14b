//! Dense vector/matrix primitives for the scoring network.
//!
//! Thin, shape-checked helpers over `ndarray`. A shape mismatch here means
//! the loaded weights disagree with the feature extractor's layout, which
//! is a fatal configuration error, not a recoverable runtime condition.

use ndarray::{Array1, Array2, ArrayView1};

use crate::{Error, Result};

/// Apply an affine map `kernel · input + bias` with shape checking.
///
/// `context` names the layer for the error message on mismatch.
pub fn affine(
    kernel: &Array2<f64>,
    bias: &Array1<f64>,
    input: &Array1<f64>,
    context: &str,
) -> Result<Array1<f64>> {
    if kernel.ncols() != input.len() {
        return Err(Error::dimension(
            format!("{context} input"),
            kernel.ncols(),
            input.len(),
        ));
    }
    if kernel.nrows() != bias.len() {
        return Err(Error::dimension(
            format!("{context} bias"),
            kernel.nrows(),
            bias.len(),
        ));
    }
    Ok(kernel.dot(input) + bias)
}

/// Elementwise rectified-linear activation.
#[must_use]
pub fn relu(v: &Array1<f64>) -> Array1<f64> {
    v.mapv(|x| x.max(0.0))
}

/// Concatenate vectors in order into one dense vector.
#[must_use]
pub fn concatenate(parts: &[ArrayView1<'_, f64>]) -> Array1<f64> {
    let len: usize = parts.iter().map(|p| p.len()).sum();
    let mut out = Array1::zeros(len);
    let mut offset = 0;
    for part in parts {
        out.slice_mut(ndarray::s![offset..offset + part.len()])
            .assign(part);
        offset += part.len();
    }
    out
}

/// Sum of all entries.
///
/// The final network layer has dimension 1, but summing explicitly
/// tolerates alternate topologies rather than assuming a single entry.
#[must_use]
pub fn element_sum(v: &Array1<f64>) -> f64 {
    v.sum()
}
