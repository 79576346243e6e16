//! # Cartograph: document embedding maps
//!
//! Cartograph computes low-dimensional projections of high-dimensional
//! document embeddings and answers exact similarity queries against them.
//!
//! ## Quick Start
//!
//! ```rust
//! use cartograph::kernel::{svd, Matrix, PcaEngine, SvdOptions};
//! use cartograph::store::{EmbeddingRecord, EmbeddingUpdate, VectorStore};
//!
//! // Decompose a matrix
//! let a = Matrix::from_rows(&[
//!     [4.0, 11.0, 14.0],
//!     [5.0, 6.0, 7.0],
//!     [8.0, 9.0, 10.0],
//!     [11.0, 12.0, 13.0],
//! ])?;
//! let result = svd(&a, &SvdOptions::default())?;
//! assert!(result.status.is_converged());
//!
//! // Store embeddings and project them to 2-D
//! let mut store = VectorStore::new("vectors.json");
//! for (i, row) in a.to_rows().into_iter().enumerate() {
//!     store.add(EmbeddingRecord::from_full(format!("doc-{}", i), row));
//! }
//! let data = store.embedding_matrix()?;
//! let fit = PcaEngine::default().fit(&data)?;
//! let reduced = fit.transform(&data, 2)?;
//! store.update("doc-0", EmbeddingUpdate::Reduced(reduced.row(0).to_vec()))?;
//!
//! // Nearest neighbours over the full embeddings
//! let hits = store.search_by_id("doc-1", Some(2))?;
//! assert_eq!(hits[0].record.id, "doc-1");
//! # Ok::<(), cartograph::CartographError>(())
//! ```
//!
//! ## Layers
//!
//! - [`kernel`]: `Matrix`, Golub-Kahan-Reinsch `svd`, batch `PcaEngine`
//! - [`store`]: `VectorStore` with CRUD, exact k-NN search and JSON persistence
//! - [`highlevel`]: `Cartograph`, an owned client wiring a host
//!   `EmbeddingProvider` to the store and the PCA engine
//!
//! Everything is synchronous and single-threaded. An SVD or PCA call is one
//! blocking unit of work; a store expects one writer at a time.

pub mod error;
pub mod highlevel;
pub mod kernel;
pub mod store;

// Re-exports for convenience
pub use error::{CartographError, Result};
pub use highlevel::{Cartograph, CartographConfig, Document, EmbeddingProvider};
pub use kernel::{svd, Convergence, Matrix, PcaEngine, PcaFit, SvdOptions, SvdResult};
pub use store::{
    euclidean_distance, l2_normalize, EmbeddingRecord, EmbeddingUpdate, SearchResult, VectorStore,
};
