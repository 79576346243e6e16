//! Store layer: embedding records, distances and the [`VectorStore`].
//!
//! - [`VectorStore`]: an explicitly owned, keyed collection of
//!   [`EmbeddingRecord`]s with CRUD, exact nearest-neighbour search and JSON
//!   persistence.
//! - [`EmbeddingUpdate`]: closed set of field replacements accepted by
//!   [`VectorStore::update`].
//! - [`euclidean_distance`] / [`l2_normalize`]: plain-slice helpers.
//!
//! This layer depends on [`kernel`](crate::kernel) only for
//! [`VectorStore::embedding_matrix`].

pub mod distance;
pub mod record;
pub mod vector_store;

pub use distance::{euclidean_distance, l2_normalize, squared_euclidean};
pub use record::{EmbeddingRecord, EmbeddingUpdate, SearchResult};
pub use vector_store::VectorStore;
