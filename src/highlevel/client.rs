//! Convenience wrapper that owns a [`VectorStore`], a [`PcaEngine`] and an
//! [`EmbeddingProvider`], and runs the embed → project → search workflow.
//!
//! For full control, import from [`kernel`](crate::kernel) and
//! [`store`](crate::store) directly.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::provider::{Document, EmbeddingProvider};
use crate::error::{CartographError, Result};
use crate::kernel::{Convergence, PcaEngine, PcaFit, SvdOptions};
use crate::store::{EmbeddingRecord, EmbeddingUpdate, SearchResult, VectorStore};

/// Client configuration. Every field has a default, so a partial JSON
/// document is enough.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartographConfig {
    /// Where the vector store is persisted.
    pub store_path: PathBuf,
    /// Length of every reduced embedding.
    pub n_components: usize,
    /// Solver settings used by the PCA engine.
    pub svd: SvdOptions,
}

impl Default for CartographConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("vectors.json"),
            n_components: 2,
            svd: SvdOptions::default(),
        }
    }
}

impl CartographConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Convenience wrapper over the kernel and store layers.
///
/// # Example
///
/// ```rust
/// use cartograph::highlevel::{Cartograph, CartographConfig, Document};
/// use cartograph::Result;
///
/// let provider = |texts: &[&str]| -> Result<Vec<Vec<f64>>> {
///     Ok(texts
///         .iter()
///         .map(|t| vec![t.len() as f64, t.matches('a').count() as f64, 1.0])
///         .collect())
/// };
///
/// let mut atlas = Cartograph::new(CartographConfig::default(), provider);
/// atlas
///     .embed_documents(&[
///         Document::new("one", "alpha"),
///         Document::new("two", "banana bread"),
///         Document::new("three", "cherry"),
///     ])
///     .unwrap();
/// atlas.refresh_projection().unwrap();
///
/// let hits = atlas.nearest("one", Some(2)).unwrap();
/// assert_eq!(hits[0].record.id, "one");
/// assert_eq!(hits[0].record.reduced_embedding.len(), 2);
/// ```
pub struct Cartograph<P> {
    config: CartographConfig,
    store: VectorStore,
    pca: PcaEngine,
    provider: P,
}

impl<P: EmbeddingProvider> Cartograph<P> {
    /// Create a client with an empty store.
    pub fn new(config: CartographConfig, provider: P) -> Self {
        let store = VectorStore::new(config.store_path.clone());
        let pca = PcaEngine::new(config.svd.clone());
        Self {
            config,
            store,
            pca,
            provider,
        }
    }

    /// Create a client and load the store file if it exists.
    pub fn open(config: CartographConfig, provider: P) -> Result<Self> {
        let mut client = Self::new(config, provider);
        client.store.load_from_file()?;
        Ok(client)
    }

    pub fn config(&self) -> &CartographConfig {
        &self.config
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut VectorStore {
        &mut self.store
    }

    // =========================================================================
    // Embedding
    // =========================================================================

    /// Embed a batch of documents with one provider call and store them.
    ///
    /// The whole batch is validated (count and uniform dimension, including
    /// against records already stored) before anything is written. An
    /// existing reduced embedding is kept until the next
    /// [`refresh_projection`](Self::refresh_projection).
    pub fn embed_documents(&mut self, documents: &[Document]) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }
        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let embeddings = self.provider.embed(&texts)?;
        if embeddings.len() != documents.len() {
            return Err(CartographError::Embedding(format!(
                "provider returned {} embeddings for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let expected = self
            .store
            .dimensions()
            .unwrap_or_else(|| embeddings[0].len());
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
            return Err(CartographError::DimensionMismatch {
                expected,
                got: bad.len(),
            });
        }

        for (doc, full) in documents.iter().zip(embeddings) {
            let reduced = self
                .store
                .get(&doc.id)
                .map(|r| r.reduced_embedding.clone())
                .unwrap_or_default();
            self.store.add(EmbeddingRecord::new(doc.id.clone(), full, reduced));
        }
        info!(documents = documents.len(), total = self.store.len(), "embedded batch");
        Ok(documents.len())
    }

    /// Remove a document. Returns whether it was stored.
    pub fn remove_document(&mut self, id: &str) -> bool {
        self.store.delete(id)
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// Fit PCA over every full embedding and rewrite all reduced embeddings.
    ///
    /// All projections are computed before the store is touched; any failure
    /// (including [`CartographError::NonConvergence`]) leaves it unchanged.
    pub fn refresh_projection(&mut self) -> Result<PcaFit> {
        let data = self.store.embedding_matrix()?;
        let fit = self.pca.fit(&data)?;
        if let Convergence::MaxIterationsReached {
            iterations,
            unconverged,
        } = fit.status
        {
            return Err(CartographError::NonConvergence {
                iterations,
                unconverged,
            });
        }
        let reduced = fit.transform(&data, self.config.n_components)?;

        let ids: Vec<String> = self.store.ids().map(str::to_owned).collect();
        for (row, id) in ids.iter().enumerate() {
            self.store
                .update(id, EmbeddingUpdate::Reduced(reduced.row(row).to_vec()))?;
        }
        info!(
            records = ids.len(),
            components = reduced.cols(),
            iterations = fit.status.iterations(),
            "refreshed projection"
        );
        Ok(fit)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Records closest to the stored document `id`, itself included.
    pub fn nearest(&self, id: &str, limit: Option<usize>) -> Result<Vec<SearchResult>> {
        self.store.search_by_id(id, limit)
    }

    /// Embed `text` as a transient query and search with it. The query vector
    /// is never stored.
    pub fn query(&self, text: &str, limit: Option<usize>) -> Result<Vec<SearchResult>> {
        let query = self
            .provider
            .embed(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| CartographError::Embedding("provider returned no embedding".to_string()))?;
        self.store.search(&query, limit)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Persist the store to [`CartographConfig::store_path`].
    pub fn save(&self) -> Result<()> {
        self.store.save_to_file()
    }
}
