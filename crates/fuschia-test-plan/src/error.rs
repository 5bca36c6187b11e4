//! Planning error types.

use fuschia_store::StoreError;

/// Structural problems with the graph being tested.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
  /// No node is a trigger by role or kind.
  #[error("missing trigger: workflow has no trigger node")]
  MissingTrigger,

  #[error("node '{0}' not found in workflow")]
  NodeNotFound(String),

  /// The trigger has no outgoing edges into known nodes.
  #[error("nothing connected to trigger '{trigger}'")]
  NothingConnectedToTrigger { trigger: String },

  /// The compiled subgraph contains a feedback edge.
  #[error("cycle detected in execution graph")]
  CycleDetected,
}

/// Errors that prevent a test request from being built.
///
/// None of these ever reach the execution gateway.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
  #[error(transparent)]
  Graph(#[from] GraphError),

  /// A referenced node has no cached result to inject.
  #[error("node '{node_id}' depends on results that are not available: {}", missing.join(", "))]
  DependencyMissing {
    node_id: String,
    missing: Vec<String>,
  },

  /// Reading cached results failed.
  #[error("failed to read cached results: {0}")]
  Store(#[from] StoreError),
}
