//! Graph traversals that pick the full node set for a test.

use std::collections::HashSet;

use fuschia_workflow::{Node, Workflow};

use crate::error::GraphError;

/// The workflow's trigger node.
///
/// When several nodes qualify, the first in canvas order wins.
pub fn find_trigger(workflow: &Workflow) -> Result<&Node, GraphError> {
  workflow.trigger().ok_or(GraphError::MissingTrigger)
}

/// Every known node reachable from `start` through outgoing edges, `start`
/// included.
///
/// Edges to nodes missing from the workflow are ignored. Each node is expanded
/// at most once, so cycles terminate.
pub fn reachable_from(workflow: &Workflow, start: &str) -> Result<HashSet<String>, GraphError> {
  if !workflow.contains(start) {
    return Err(GraphError::NodeNotFound(start.to_string()));
  }

  let mut visited = HashSet::from([start.to_string()]);
  let mut stack = vec![start];

  while let Some(node_id) = stack.pop() {
    for edge in workflow.outgoing(node_id) {
      if workflow.contains(&edge.to) && visited.insert(edge.to.clone()) {
        stack.push(edge.to.as_str());
      }
    }
  }

  Ok(visited)
}

/// `node_id` plus every known node it transitively depends on through
/// incoming edges.
pub fn predecessor_closure(
  workflow: &Workflow,
  node_id: &str,
) -> Result<HashSet<String>, GraphError> {
  if !workflow.contains(node_id) {
    return Err(GraphError::NodeNotFound(node_id.to_string()));
  }

  let mut visited = HashSet::from([node_id.to_string()]);
  let mut stack = vec![node_id];

  while let Some(current) = stack.pop() {
    for edge in workflow.incoming(current) {
      if workflow.contains(&edge.from) && visited.insert(edge.from.clone()) {
        stack.push(edge.from.as_str());
      }
    }
  }

  Ok(visited)
}
