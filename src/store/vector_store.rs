//! Keyed, file-backed store of embedding records with exact k-NN search.
//!
//! Records keep their first-insertion order; overwriting an id keeps its
//! slot. Search ties are broken by that order.
//!
//! # Example
//!
//! ```rust
//! use cartograph::store::{EmbeddingRecord, VectorStore};
//!
//! let mut store = VectorStore::new("vectors.json");
//! store.add(EmbeddingRecord::from_full("a", vec![0.0, 0.0]));
//! store.add(EmbeddingRecord::from_full("b", vec![3.0, 4.0]));
//!
//! let hits = store.search(&[0.0, 1.0], Some(1)).unwrap();
//! assert_eq!(hits[0].record.id, "a");
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::distance::euclidean_distance;
use super::record::{EmbeddingRecord, EmbeddingUpdate, SearchResult};
use crate::error::{CartographError, Result};
use crate::kernel::Matrix;

/// An owned collection of [`EmbeddingRecord`]s keyed by id.
///
/// Not internally synchronized: callers serialize writes.
#[derive(Debug)]
pub struct VectorStore {
    path: PathBuf,
    records: Vec<EmbeddingRecord>,
    /// id -> position in `records`
    index: HashMap<String, usize>,
}

impl VectorStore {
    /// Create an empty store persisted at `path`. Nothing is read yet; see
    /// [`VectorStore::load_from_file`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a store and load `path` if it exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::new(path);
        store.load_from_file()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &EmbeddingRecord> {
        self.records.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    /// Full-embedding length of the first record, `None` when empty.
    pub fn dimensions(&self) -> Option<usize> {
        self.records.first().map(EmbeddingRecord::dimensions)
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Insert `record`, replacing any record with the same id.
    pub fn add(&mut self, record: EmbeddingRecord) {
        debug!(id = %record.id, dimensions = record.dimensions(), "adding vector");
        match self.index.get(&record.id) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Merge `update` into the record stored under `id`.
    ///
    /// Fails with [`CartographError::NotFound`] and changes nothing if `id`
    /// is absent.
    pub fn update(&mut self, id: &str, update: EmbeddingUpdate) -> Result<()> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| CartographError::NotFound(id.to_string()))?;
        self.records[pos].apply(update);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&EmbeddingRecord> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn has(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Remove the record under `id`. Returns whether it was present.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(pos) = self.index.remove(id) else {
            return false;
        };
        self.records.remove(pos);
        for record in &self.records[pos..] {
            if let Some(slot) = self.index.get_mut(&record.id) {
                *slot -= 1;
            }
        }
        debug!(id, "deleted vector");
        true
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Exact nearest neighbours of `query` by Euclidean distance over full
    /// embeddings, closest first. `limit = None` returns every record.
    ///
    /// A single record whose length differs from the query aborts the whole
    /// search with [`CartographError::DimensionMismatch`].
    pub fn search(&self, query: &[f64], limit: Option<usize>) -> Result<Vec<SearchResult>> {
        let mut scored = self
            .records
            .iter()
            .enumerate()
            .map(|(pos, r)| Ok((pos, euclidean_distance(query, &r.full_embedding)?)))
            .collect::<Result<Vec<(usize, f64)>>>()?;

        // Stable: equal distances keep iteration order.
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        if let Some(limit) = limit {
            scored.truncate(limit);
        }

        Ok(scored
            .into_iter()
            .map(|(pos, distance)| SearchResult {
                record: self.records[pos].clone(),
                distance,
            })
            .collect())
    }

    /// Search with the full embedding of the stored record `id` as query.
    /// The record itself is part of the results (at distance zero).
    pub fn search_by_id(&self, id: &str, limit: Option<usize>) -> Result<Vec<SearchResult>> {
        let record = self
            .get(id)
            .ok_or_else(|| CartographError::NotFound(id.to_string()))?;
        self.search(&record.full_embedding, limit)
    }

    /// Full embeddings stacked as rows, in iteration order.
    pub fn embedding_matrix(&self) -> Result<Matrix> {
        let rows: Vec<&[f64]> = self
            .records
            .iter()
            .map(|r| r.full_embedding.as_slice())
            .collect();
        Matrix::from_rows(&rows)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Render every record, in iteration order, as a JSON array.
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.records)?)
    }

    /// Parse a JSON array of records and [`add`](Self::add) each one.
    ///
    /// The text is parsed completely before the store is touched.
    pub fn deserialize(&mut self, text: &str) -> Result<usize> {
        let records: Vec<EmbeddingRecord> = serde_json::from_str(text)?;
        let count = records.len();
        for record in records {
            self.add(record);
        }
        Ok(count)
    }

    /// Write [`serialize`](Self::serialize) output to the store path.
    pub fn save_to_file(&self) -> Result<()> {
        let data = self.serialize()?;
        fs::write(&self.path, data)?;
        info!(path = %self.path.display(), records = self.len(), "saved vector store");
        Ok(())
    }

    /// Load the store path if it exists; a missing file is not an error.
    pub fn load_from_file(&mut self) -> Result<()> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no vector store file, starting empty");
            return Ok(());
        }
        let data = fs::read_to_string(&self.path)?;
        let loaded = self.deserialize(&data)?;
        info!(path = %self.path.display(), records = loaded, "loaded vector store");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn store_with(records: &[(&str, Vec<f64>)]) -> VectorStore {
        let mut store = VectorStore::new("unused.json");
        for (id, full) in records {
            store.add(EmbeddingRecord::from_full(*id, full.clone()));
        }
        store
    }

    #[test]
    fn test_add_get_has() {
        let store = store_with(&[("a", vec![1.0, 2.0])]);
        assert!(store.has("a"));
        assert!(!store.has("b"));
        assert_eq!(store.get("a").unwrap().full_embedding, vec![1.0, 2.0]);
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_add_overwrites_in_place() {
        let mut store = store_with(&[("a", vec![1.0]), ("b", vec![2.0])]);
        store.add(EmbeddingRecord::new("a", vec![9.0], vec![0.1]));
        assert_eq!(store.len(), 2);
        assert_eq!(store.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(store.get("a").unwrap().reduced_embedding, vec![0.1]);
    }

    #[test]
    fn test_update_unknown_id() {
        let mut store = store_with(&[("a", vec![1.0, 2.0])]);
        let before = store.serialize().unwrap();
        let err = store
            .update("missing", EmbeddingUpdate::Reduced(vec![0.0, 0.0]))
            .unwrap_err();
        assert!(matches!(err, CartographError::NotFound(id) if id == "missing"));
        assert_eq!(store.serialize().unwrap(), before);
    }

    #[test]
    fn test_update_reduced_preserves_full() {
        let mut store = store_with(&[("a", vec![1.0, 2.0, 3.0])]);
        store
            .update("a", EmbeddingUpdate::Reduced(vec![0.5, 0.25]))
            .unwrap();
        let r = store.get("a").unwrap();
        assert_eq!(r.full_embedding, vec![1.0, 2.0, 3.0]);
        assert_eq!(r.reduced_embedding, vec![0.5, 0.25]);
    }

    #[test]
    fn test_delete() {
        let mut store = store_with(&[("a", vec![1.0]), ("b", vec![2.0]), ("c", vec![3.0])]);
        assert!(store.delete("a"));
        assert!(!store.has("a"));
        assert!(!store.delete("a"));
        assert!(!store.delete("never"));
        // Positions after the removed slot are reindexed.
        assert_eq!(store.get("c").unwrap().full_embedding, vec![3.0]);
        store.update("c", EmbeddingUpdate::Full(vec![4.0])).unwrap();
        assert_eq!(store.get("c").unwrap().full_embedding, vec![4.0]);
        assert_eq!(store.get("b").unwrap().full_embedding, vec![2.0]);
    }

    #[test]
    fn test_search_sorted_and_limited() {
        let store = store_with(&[
            ("far", vec![10.0, 0.0]),
            ("near", vec![1.0, 0.0]),
            ("mid", vec![4.0, 0.0]),
        ]);
        let hits = store.search(&[0.0, 0.0], Some(2)).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record.id, "near");
        assert_eq!(hits[1].record.id, "mid");
        assert_abs_diff_eq!(hits[1].distance, 4.0, epsilon = 1e-12);

        let all = store.search(&[0.0, 0.0], None).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_search_tie_break_by_insertion() {
        let store = store_with(&[("x", vec![1.0]), ("y", vec![-1.0]), ("z", vec![1.0])]);
        let ids: Vec<_> = store
            .search(&[0.0], None)
            .unwrap()
            .into_iter()
            .map(|h| h.record.id)
            .collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_search_empty_store() {
        let store = VectorStore::new("unused.json");
        assert!(store.search(&[1.0, 2.0], None).unwrap().is_empty());
    }

    #[test]
    fn test_search_aborts_on_mismatch() {
        let store = store_with(&[("a", vec![1.0, 2.0]), ("b", vec![1.0])]);
        assert!(matches!(
            store.search(&[0.0, 0.0], Some(1)),
            Err(CartographError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_search_by_id() {
        let store = store_with(&[("a", vec![0.0]), ("b", vec![5.0]), ("c", vec![1.0])]);
        let hits = store.search_by_id("b", Some(2)).unwrap();
        assert_eq!(hits[0].record.id, "b");
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[1].record.id, "c");
        assert!(matches!(
            store.search_by_id("nope", None),
            Err(CartographError::NotFound(_))
        ));
    }

    #[test]
    fn test_embedding_matrix() {
        let store = store_with(&[("a", vec![1.0, 2.0]), ("b", vec![3.0, 4.0])]);
        let m = store.embedding_matrix().unwrap();
        assert_eq!(m.size(), (2, 2));
        assert_eq!(m.row(1), &[3.0, 4.0]);

        let ragged = store_with(&[("a", vec![1.0, 2.0]), ("b", vec![3.0])]);
        assert!(ragged.embedding_matrix().is_err());
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut store = store_with(&[("a", vec![1.0, 2.0]), ("b", vec![3.0, 4.0])]);
        store.update("b", EmbeddingUpdate::Reduced(vec![0.5, 0.5])).unwrap();
        let text = store.serialize().unwrap();

        let mut restored = VectorStore::new("unused.json");
        assert_eq!(restored.deserialize(&text).unwrap(), 2);
        assert_eq!(restored.len(), 2);
        for record in store.iter() {
            assert_eq!(restored.get(&record.id), Some(record));
        }
    }

    #[test]
    fn test_serialize_round_trip_is_bit_exact() {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut store = VectorStore::new("unused.json");
        for i in 0..200 {
            let full: Vec<f64> = (0..16).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let reduced: Vec<f64> = (0..2).map(|_| rng.gen_range(-20.0..20.0)).collect();
            store.add(EmbeddingRecord::new(format!("doc-{i}"), full, reduced));
        }

        let mut restored = VectorStore::new("unused.json");
        restored.deserialize(&store.serialize().unwrap()).unwrap();
        assert_eq!(restored.len(), store.len());
        for (a, b) in store.iter().zip(restored.iter()) {
            assert_eq!(a.id, b.id);
            let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
            assert_eq!(bits(&a.full_embedding), bits(&b.full_embedding));
            assert_eq!(bits(&a.reduced_embedding), bits(&b.reduced_embedding));
        }
    }

    #[test]
    fn test_deserialize_overwrites_same_id() {
        let mut store = store_with(&[("a", vec![1.0]), ("keep", vec![7.0])]);
        store
            .deserialize(r#"[{"id":"a","fullEmbedding":[2.0],"reducedEmbedding":[]}]"#)
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap().full_embedding, vec![2.0]);
    }

    #[test]
    fn test_deserialize_invalid_leaves_store() {
        let mut store = store_with(&[("a", vec![1.0])]);
        assert!(matches!(
            store.deserialize(r#"[{"id":"b","fullEmbedding":[1.0]}, {"oops": 1}]"#),
            Err(CartographError::Json(_))
        ));
        assert_eq!(store.len(), 1);
        assert!(!store.has("b"));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.json");

        let mut store = VectorStore::new(&path);
        store.add(EmbeddingRecord::new("a", vec![1.0, 2.0], vec![0.1, 0.2]));
        store.add(EmbeddingRecord::from_full("b", vec![3.0, 4.0]));
        store.save_to_file().unwrap();

        let loaded = VectorStore::open(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("a"), store.get("a"));
        assert_eq!(loaded.get("b"), store.get("b"));
    }

    #[test]
    fn test_load_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = VectorStore::new(dir.path().join("absent.json"));
        store.add(EmbeddingRecord::from_full("a", vec![1.0]));
        store.load_from_file().unwrap();
        assert_eq!(store.len(), 1);
    }
}
