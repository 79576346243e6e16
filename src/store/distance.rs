//! Distance functions over raw `f64` embeddings.
//!
//! When compiled with the `simd` feature, the squared distance uses SIMD
//! kernels and falls back to the scalar loop if they are unavailable.

use crate::error::{CartographError, Result};

/// Euclidean distance `sqrt(Σ (aᵢ − bᵢ)²)`.
///
/// Fails with [`CartographError::DimensionMismatch`] on unequal lengths.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    Ok(squared_euclidean(a, b)?.sqrt())
}

/// Squared Euclidean distance.
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(CartographError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(squared_euclidean_unchecked(a, b))
}

#[cfg(feature = "simd")]
fn squared_euclidean_unchecked(a: &[f64], b: &[f64]) -> f64 {
    use simsimd::SpatialSimilarity;
    f64::l2sq(a, b).unwrap_or_else(|| scalar_squared_euclidean(a, b))
}

#[cfg(not(feature = "simd"))]
fn squared_euclidean_unchecked(a: &[f64], b: &[f64]) -> f64 {
    scalar_squared_euclidean(a, b)
}

#[allow(dead_code)]
fn scalar_squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Unit-length copy of `v`. A (near-)zero vector comes back as zeros.
pub fn l2_normalize(v: &[f64]) -> Vec<f64> {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm < 1e-10 {
        return vec![0.0; v.len()];
    }
    v.iter().map(|x| x / norm).collect()
}
