//! High-level convenience API.
//!
//! This layer provides [`Cartograph`], an explicitly owned client that holds
//! one [`VectorStore`](crate::store::VectorStore), one
//! [`PcaEngine`](crate::kernel::PcaEngine) and the host's
//! [`EmbeddingProvider`], and delegates to the [`kernel`](crate::kernel) and
//! [`store`](crate::store) layers.
//!
//! For library code that already has embeddings, prefer importing from
//! [`kernel`](crate::kernel) and [`store`](crate::store) directly.

pub mod client;
pub mod provider;

pub use client::{Cartograph, CartographConfig};
pub use provider::{Document, EmbeddingProvider};
