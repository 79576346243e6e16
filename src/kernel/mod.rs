//! Kernel layer: the numerical core.
//!
//! - [`Matrix`]: dense row-major `f64` matrix
//! - [`svd`]: Golub-Kahan-Reinsch singular value decomposition
//! - [`PcaEngine`]: batch PCA over the covariance matrix
//!
//! This layer has no dependencies on [`store`](crate::store) or
//! [`highlevel`](crate::highlevel), and keeps no state between calls.
//!
//! # Example
//!
//! ```rust
//! use cartograph::kernel::{svd, Matrix, PcaEngine, SvdOptions};
//!
//! let a = Matrix::from_rows(&[[2.0, 0.0], [0.0, 1.0], [0.0, 0.0]]).unwrap();
//! let result = svd(&a, &SvdOptions::default()).unwrap();
//! assert!((result.q[0] - 2.0).abs() < 1e-12);
//!
//! let basis = PcaEngine::default().eigenvectors(&a).unwrap();
//! assert_eq!(basis.size(), (2, 2));
//! ```

pub mod matrix;
pub mod pca;
pub mod svd;

pub use matrix::Matrix;
pub use pca::{PcaEngine, PcaFit};
pub use svd::{svd, Convergence, SvdOptions, SvdResult};
