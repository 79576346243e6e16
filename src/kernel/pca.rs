//! Batch principal component analysis on top of [`svd`](super::svd::svd).
//!
//! The covariance matrix of the mean-centered data is square and symmetric
//! positive semi-definite, so its left singular vectors are its eigenvectors
//! and its singular values are the variances along them.
//!
//! # Usage
//!
//! ```rust
//! use cartograph::kernel::{Matrix, PcaEngine};
//!
//! let data = Matrix::from_rows(&[
//!     [4.0, 11.0, 14.0],
//!     [5.0, 6.0, 7.0],
//!     [8.0, 9.0, 10.0],
//!     [11.0, 12.0, 13.0],
//! ]).unwrap();
//!
//! let pca = PcaEngine::default();
//! let fit = pca.fit(&data).unwrap();
//! let reduced = fit.transform(&data, 2).unwrap();
//! assert_eq!(reduced.size(), (4, 2));
//! ```

use super::matrix::Matrix;
use super::svd::{svd, Convergence, SvdOptions};
use crate::error::{CartographError, Result};

/// A fitted principal basis.
#[derive(Clone, Debug)]
pub struct PcaFit {
    /// Column means of the training data.
    pub mean: Vec<f64>,
    /// features × features; row i is the i-th principal direction.
    pub components: Matrix,
    /// Variance captured by each component, in component order.
    pub explained_variance: Vec<f64>,
    pub status: Convergence,
}

impl PcaFit {
    /// Number of input features.
    pub fn features(&self) -> usize {
        self.mean.len()
    }

    /// Fraction of total variance per component (all zero for constant data).
    pub fn explained_variance_ratio(&self) -> Vec<f64> {
        let total: f64 = self.explained_variance.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.explained_variance.len()];
        }
        self.explained_variance.iter().map(|v| v / total).collect()
    }

    /// Project rows of `data` onto the first `n_components` directions.
    ///
    /// Rows are centered with the training mean first. `n_components` is
    /// clamped to the feature count.
    pub fn transform(&self, data: &Matrix, n_components: usize) -> Result<Matrix> {
        let features = self.features();
        if data.cols() != features {
            return Err(CartographError::DimensionMismatch {
                expected: features,
                got: data.cols(),
            });
        }
        let k = n_components.min(features);
        let mut out = Matrix::zeros(data.rows(), k);
        for r in 0..data.rows() {
            let row = data.row(r);
            for c in 0..k {
                out[(r, c)] = self
                    .components
                    .row(c)
                    .iter()
                    .zip(row.iter().zip(&self.mean))
                    .map(|(w, (x, mu))| w * (x - mu))
                    .sum();
            }
        }
        Ok(out)
    }
}

/// Full-batch PCA engine. Stateless between calls.
#[derive(Clone, Debug)]
pub struct PcaEngine {
    options: SvdOptions,
}

impl Default for PcaEngine {
    fn default() -> Self {
        Self::new(SvdOptions::default())
    }
}

impl PcaEngine {
    /// Create an engine that runs the solver with `options`.
    ///
    /// `with_u` is forced on and `with_v` off: only the left vectors of the
    /// covariance are needed.
    pub fn new(options: SvdOptions) -> Self {
        Self {
            options: options.with_u(true).with_v(false),
        }
    }

    pub fn options(&self) -> &SvdOptions {
        &self.options
    }

    /// Covariance matrix `(1/m) · DᵗD` of the deviation matrix
    /// `D = A - (1/m)·J·A` (J the all-ones m × m matrix).
    pub fn covariance(&self, data: &Matrix) -> Result<Matrix> {
        let (m, n) = data.size();
        if m == 0 {
            return Err(CartographError::EmptyInput(
                "PCA needs at least one row".to_string(),
            ));
        }
        // (1/m)·J·A repeats the column means on every row.
        let means = data.column_means();
        let mut deviation = data.clone();
        for r in 0..m {
            for (c, mu) in means.iter().enumerate() {
                deviation[(r, c)] -= *mu;
            }
        }
        let gram = deviation.transpose().multiply(&deviation)?;
        debug_assert_eq!(gram.size(), (n, n));
        Ok(gram.scale(1.0 / m as f64))
    }

    /// Fit a principal basis. Never fails on non-convergence; check
    /// [`PcaFit::status`].
    pub fn fit(&self, data: &Matrix) -> Result<PcaFit> {
        let covariance = self.covariance(data)?;
        let result = svd(&covariance, &self.options)?;
        let u = result.u.ok_or_else(|| {
            CartographError::Precondition("solver returned no left vectors".to_string())
        })?;
        Ok(PcaFit {
            mean: data.column_means(),
            components: u.transpose().scale(-1.0),
            explained_variance: result.q,
            status: result.status,
        })
    }

    /// Principal directions as rows of a features × features matrix
    /// (`-Uᵗ` of the covariance), strongest first.
    ///
    /// Fails with [`CartographError::NonConvergence`] rather than returning a
    /// partially diagonalized basis.
    pub fn eigenvectors(&self, data: &Matrix) -> Result<Matrix> {
        let fit = self.fit(data)?;
        match fit.status {
            Convergence::Converged { .. } => Ok(fit.components),
            Convergence::MaxIterationsReached {
                iterations,
                unconverged,
            } => Err(CartographError::NonConvergence {
                iterations,
                unconverged,
            }),
        }
    }
}
