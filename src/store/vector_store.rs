use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    #[error("Dimension mismatch in {collection}: got {got}, expected {expected}")]
    DimensionMismatch {
        collection: String,
        got: usize,
        expected: usize,
    },
}

struct StoredVector {
    id: String,
    vector: Vec<f32>,
    payload: HashMap<String, serde_json::Value>,
}

struct Collection {
    vector_size: usize,
    points: Vec<StoredVector>,
}

/// Transient in-memory vector index, cosine similarity search.
///
/// Built fresh per loaded document and discarded at session end; nothing
/// is persisted.
#[derive(Clone)]
pub struct VectorStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl Default for VectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Idempotent: recreating an existing collection keeps its contents.
    pub fn create_collection(&self, name: &str, vector_size: usize) {
        let mut collections = self.collections.write();
        collections.entry(name.to_string()).or_insert(Collection {
            vector_size,
            points: Vec::new(),
        });
    }

    pub fn drop_collection(&self, name: &str) {
        self.collections.write().remove(name);
    }

    pub fn store_vector(
        &self,
        collection: &str,
        vector: Vec<f32>,
        payload: HashMap<String, serde_json::Value>,
    ) -> Result<String, VectorStoreError> {
        let mut collections = self.collections.write();
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| VectorStoreError::CollectionNotFound(collection.to_string()))?;

        if vector.len() != entry.vector_size {
            return Err(VectorStoreError::DimensionMismatch {
                collection: collection.to_string(),
                got: vector.len(),
                expected: entry.vector_size,
            });
        }

        let id = Uuid::new_v4().to_string();
        entry.points.push(StoredVector {
            id: id.clone(),
            vector,
            payload,
        });

        Ok(id)
    }

    pub fn search_vectors(
        &self,
        collection: &str,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<(String, f32, HashMap<String, serde_json::Value>)>, VectorStoreError> {
        let collections = self.collections.read();
        let entry = collections
            .get(collection)
            .ok_or_else(|| VectorStoreError::CollectionNotFound(collection.to_string()))?;

        if query_vector.len() != entry.vector_size {
            return Err(VectorStoreError::DimensionMismatch {
                collection: collection.to_string(),
                got: query_vector.len(),
                expected: entry.vector_size,
            });
        }

        let mut scored: Vec<(String, f32, HashMap<String, serde_json::Value>)> = entry
            .points
            .iter()
            .map(|point| {
                (
                    point.id.clone(),
                    cosine_similarity(&point.vector, query_vector),
                    point.payload.clone(),
                )
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored)
    }

    pub fn count(&self, collection: &str) -> Result<usize, VectorStoreError> {
        let collections = self.collections.read();
        collections
            .get(collection)
            .map(|entry| entry.points.len())
            .ok_or_else(|| VectorStoreError::CollectionNotFound(collection.to_string()))
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(text: &str) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert(
            "text".to_string(),
            serde_json::Value::String(text.to_string()),
        );
        map
    }

    #[test]
    fn search_ranks_by_cosine_similarity() {
        let store = VectorStore::new();
        store.create_collection("docs", 3);

        store
            .store_vector("docs", vec![1.0, 0.0, 0.0], payload("x-axis"))
            .unwrap();
        store
            .store_vector("docs", vec![0.0, 1.0, 0.0], payload("y-axis"))
            .unwrap();
        store
            .store_vector("docs", vec![0.9, 0.1, 0.0], payload("near-x"))
            .unwrap();

        let results = store.search_vectors("docs", &[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].2["text"], "x-axis");
        assert_eq!(results[1].2["text"], "near-x");
        assert!(results[0].1 >= results[1].1);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let store = VectorStore::new();
        store.create_collection("docs", 4);

        let err = store
            .store_vector("docs", vec![1.0, 2.0], payload("short"))
            .unwrap_err();
        assert!(matches!(err, VectorStoreError::DimensionMismatch { .. }));
    }

    #[test]
    fn missing_collection_is_an_error() {
        let store = VectorStore::new();
        let err = store.search_vectors("nope", &[1.0], 1).unwrap_err();
        assert!(matches!(err, VectorStoreError::CollectionNotFound(_)));
    }

    #[test]
    fn drop_collection_discards_contents() {
        let store = VectorStore::new();
        store.create_collection("docs", 2);
        store
            .store_vector("docs", vec![1.0, 0.0], payload("a"))
            .unwrap();
        assert_eq!(store.count("docs").unwrap(), 1);

        store.drop_collection("docs");
        assert!(store.count("docs").is_err());
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
