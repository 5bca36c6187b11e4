use std::collections::HashMap;

use crate::node::Edge;

/// Edge index for traversal.
///
/// Stores positions into the owning workflow's edge list, so edge order is the
/// canvas order for both directions.
#[derive(Debug, Clone, Default)]
pub struct Graph {
  /// node_id -> indices of edges leaving it.
  outgoing: HashMap<String, Vec<usize>>,
  /// node_id -> indices of edges entering it.
  incoming: HashMap<String, Vec<usize>>,
}

impl Graph {
  /// Index a list of edges.
  ///
  /// Endpoints are indexed whether or not they name a known node.
  pub fn new(edges: &[Edge]) -> Self {
    let mut outgoing: HashMap<String, Vec<usize>> = HashMap::new();
    let mut incoming: HashMap<String, Vec<usize>> = HashMap::new();

    for (idx, edge) in edges.iter().enumerate() {
      outgoing.entry(edge.from.clone()).or_default().push(idx);
      incoming.entry(edge.to.clone()).or_default().push(idx);
    }

    Self { outgoing, incoming }
  }

  /// Indices of edges leaving a node.
  pub fn outgoing(&self, node_id: &str) -> &[usize] {
    self
      .outgoing
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Indices of edges entering a node.
  pub fn incoming(&self, node_id: &str) -> &[usize] {
    self
      .incoming
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }
}
