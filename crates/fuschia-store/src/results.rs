use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::NodeResult;

/// Storage of the last-known result per node id.
///
/// Each call is atomic per key; no operation spans several keys.
#[async_trait]
pub trait ResultStore: Send + Sync {
  /// Get the cached result for a node, if any.
  async fn get(&self, node_id: &str) -> Result<Option<NodeResult>, StoreError>;

  /// Store a result under its node id, replacing any previous one.
  async fn set(&self, result: NodeResult) -> Result<(), StoreError>;

  /// Drop a node's cached result.
  async fn remove(&self, node_id: &str) -> Result<(), StoreError>;

  /// All cached results, ordered by node id.
  async fn list(&self) -> Result<Vec<NodeResult>, StoreError>;

  /// Drop every cached result.
  async fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory result store.
///
/// Suitable for embedding in a single editor session or for testing.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
  results: RwLock<HashMap<String, NodeResult>>,
}

impl InMemoryResultStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a store pre-populated with results.
  pub fn with_results(results: impl IntoIterator<Item = NodeResult>) -> Self {
    let results = results
      .into_iter()
      .map(|r| (r.node_id.clone(), r))
      .collect();
    Self {
      results: RwLock::new(results),
    }
  }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
  async fn get(&self, node_id: &str) -> Result<Option<NodeResult>, StoreError> {
    let results = self.results.read().unwrap_or_else(PoisonError::into_inner);
    Ok(results.get(node_id).cloned())
  }

  async fn set(&self, result: NodeResult) -> Result<(), StoreError> {
    let mut results = self.results.write().unwrap_or_else(PoisonError::into_inner);
    results.insert(result.node_id.clone(), result);
    Ok(())
  }

  async fn remove(&self, node_id: &str) -> Result<(), StoreError> {
    let mut results = self.results.write().unwrap_or_else(PoisonError::into_inner);
    results.remove(node_id);
    Ok(())
  }

  async fn list(&self) -> Result<Vec<NodeResult>, StoreError> {
    let results = self.results.read().unwrap_or_else(PoisonError::into_inner);
    let mut all: Vec<NodeResult> = results.values().cloned().collect();
    all.sort_by(|a, b| a.node_id.cmp(&b.node_id));
    Ok(all)
  }

  async fn clear(&self) -> Result<(), StoreError> {
    let mut results = self.results.write().unwrap_or_else(PoisonError::into_inner);
    results.clear();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[tokio::test]
  async fn test_in_memory_result_store() {
    let store = InMemoryResultStore::new();

    assert_eq!(store.get("a").await.unwrap(), None);

    store
      .set(NodeResult::success("a", json!({ "value": 1 })))
      .await
      .unwrap();
    assert_eq!(store.get("a").await.unwrap().unwrap().data, json!({ "value": 1 }));

    store.set(NodeResult::failure("a", "boom")).await.unwrap();
    let updated = store.get("a").await.unwrap().unwrap();
    assert!(!updated.success);

    store.remove("a").await.unwrap();
    assert_eq!(store.get("a").await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_list_is_sorted_and_clear_empties() {
    let store = InMemoryResultStore::with_results([
      NodeResult::success("b", json!(2)),
      NodeResult::success("a", json!(1)),
    ]);

    let ids: Vec<String> = store
      .list()
      .await
      .unwrap()
      .into_iter()
      .map(|r| r.node_id)
      .collect();
    assert_eq!(ids, vec!["a", "b"]);

    store.clear().await.unwrap();
    assert!(store.list().await.unwrap().is_empty());
  }
}
