//! Record types held by the [`VectorStore`](super::VectorStore).

use serde::{Deserialize, Serialize};

/// One embedded document.
///
/// Serialized with camelCase keys: `id`, `fullEmbedding`, `reducedEmbedding`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingRecord {
    pub id: String,
    /// Raw embedding as returned by the provider.
    pub full_embedding: Vec<f64>,
    /// Low-dimensional projection, empty until a projection has been run.
    #[serde(default)]
    pub reduced_embedding: Vec<f64>,
}

impl EmbeddingRecord {
    pub fn new(id: impl Into<String>, full_embedding: Vec<f64>, reduced_embedding: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            full_embedding,
            reduced_embedding,
        }
    }

    /// Record with a full embedding only.
    pub fn from_full(id: impl Into<String>, full_embedding: Vec<f64>) -> Self {
        Self::new(id, full_embedding, Vec::new())
    }

    /// Length of the full embedding.
    pub fn dimensions(&self) -> usize {
        self.full_embedding.len()
    }

    /// Merge `update` into this record, leaving untouched fields as they are.
    pub fn apply(&mut self, update: EmbeddingUpdate) {
        match update {
            EmbeddingUpdate::Full(full) => self.full_embedding = full,
            EmbeddingUpdate::Reduced(reduced) => self.reduced_embedding = reduced,
            EmbeddingUpdate::Both { full, reduced } => {
                self.full_embedding = full;
                self.reduced_embedding = reduced;
            }
        }
    }
}

/// The fields a [`VectorStore::update`](super::VectorStore::update) may replace.
#[derive(Clone, Debug, PartialEq)]
pub enum EmbeddingUpdate {
    Full(Vec<f64>),
    Reduced(Vec<f64>),
    Both { full: Vec<f64>, reduced: Vec<f64> },
}

/// A record paired with its distance to a search query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub record: EmbeddingRecord,
    /// Euclidean distance to the query (non-negative).
    pub distance: f64,
}
