//! Subgraph compilation.
//!
//! Given the full node set of a test and the nodes whose results will be
//! injected instead of re-executed (the excluded set), the compiler produces:
//!
//! - the execution set: full set minus excluded, in canvas order
//! - the compiled edges, rewritten so that paths through excluded nodes
//!   connect the executed nodes on either side
//! - the entry nodes, each fed by an edge from [`SOURCE_NODE`]
//!
//! # Skipping excluded nodes
//!
//! ```text
//! original:  T ──► A ──► B ──► C        (B excluded)
//!                       (h1)  (h2)
//! compiled:  $source ──► T ──► A ──────► C
//!                                 (h2)
//! ```
//!
//! A skipped path inherits the metadata (handles, label) of the edge that
//! enters the node where execution resumes; the metadata of edges leaving or
//! between excluded nodes is dropped.
//!
//! [`SOURCE_NODE`]: crate::SOURCE_NODE

use std::collections::{BTreeSet, HashMap, HashSet};

use fuschia_workflow::{EdgeMeta, Workflow};

use crate::error::GraphError;
use crate::request::CompiledEdge;

/// Output of [`compile_subgraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSubgraph {
  /// Nodes to execute, in canvas order.
  pub execution_set: Vec<String>,
  /// Excluded nodes that were part of the full set.
  pub excluded: BTreeSet<String>,
  /// Execution-set nodes with no incoming compiled edge, in canvas order.
  pub entry_nodes: Vec<String>,
  /// Source edges first, then each executed node's edges in canvas order.
  pub edges: Vec<CompiledEdge>,
}

/// Compile the subgraph for a test.
///
/// Fails with [`GraphError::CycleDetected`] if the compiled edges contain a
/// feedback edge.
pub fn compile_subgraph(
  workflow: &Workflow,
  full_set: &HashSet<String>,
  excluded: &HashSet<String>,
) -> Result<CompiledSubgraph, GraphError> {
  let execution_set: Vec<String> = workflow
    .nodes()
    .iter()
    .map(|node| node.node_id.clone())
    .filter(|id| full_set.contains(id) && !excluded.contains(id))
    .collect();
  let executing: HashSet<&str> = execution_set.iter().map(String::as_str).collect();

  let skipped: HashSet<&str> = full_set
    .iter()
    .filter(|id| excluded.contains(*id))
    .map(String::as_str)
    .collect();

  let mut seen: HashSet<CompiledEdge> = HashSet::new();
  let mut body_edges = Vec::new();

  for node_id in &execution_set {
    for edge in workflow.outgoing(node_id) {
      let targets = if executing.contains(edge.to.as_str()) {
        vec![(edge.to.clone(), edge.meta.clone())]
      } else if skipped.contains(edge.to.as_str()) {
        let mut visited = HashSet::from([edge.to.clone()]);
        resume_targets(workflow, &edge.to, &executing, &skipped, &mut visited)
      } else {
        Vec::new()
      };

      for (target, meta) in targets {
        let compiled = CompiledEdge::new(node_id.clone(), target, meta);
        if seen.insert(compiled.clone()) {
          body_edges.push(compiled);
        }
      }
    }
  }

  let has_incoming: HashSet<&str> = body_edges.iter().map(|e| e.to.as_str()).collect();
  let entry_nodes: Vec<String> = execution_set
    .iter()
    .filter(|id| !has_incoming.contains(id.as_str()))
    .cloned()
    .collect();

  detect_cycle(&execution_set, &body_edges)?;

  let mut edges: Vec<CompiledEdge> = entry_nodes
    .iter()
    .map(|id| CompiledEdge::from_source(id.clone()))
    .collect();
  edges.extend(body_edges);

  Ok(CompiledSubgraph {
    execution_set,
    excluded: skipped.into_iter().map(str::to_string).collect(),
    entry_nodes,
    edges,
  })
}

/// Follow edges out of an excluded node until executed nodes are reached.
///
/// Returns each executed node found together with the metadata of the edge
/// that reached it. `visited` is local to one search; revisiting a node ends
/// that branch without a result.
fn resume_targets(
  workflow: &Workflow,
  excluded_id: &str,
  executing: &HashSet<&str>,
  skipped: &HashSet<&str>,
  visited: &mut HashSet<String>,
) -> Vec<(String, EdgeMeta)> {
  let mut found = Vec::new();

  for edge in workflow.outgoing(excluded_id) {
    if executing.contains(edge.to.as_str()) {
      found.push((edge.to.clone(), edge.meta.clone()));
    } else if skipped.contains(edge.to.as_str()) && visited.insert(edge.to.clone()) {
      found.extend(resume_targets(
        workflow, &edge.to, executing, skipped, visited,
      ));
    }
  }

  found
}

/// Reject feedback edges among executed nodes (DFS colouring).
fn detect_cycle(nodes: &[String], edges: &[CompiledEdge]) -> Result<(), GraphError> {
  let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
  for edge in edges {
    adjacency
      .entry(edge.from.as_str())
      .or_default()
      .push(edge.to.as_str());
  }

  // 0 = unvisited, 1 = in progress, 2 = done
  let mut color: HashMap<&str, u8> = nodes.iter().map(|id| (id.as_str(), 0u8)).collect();

  fn dfs<'a>(
    node: &'a str,
    adjacency: &HashMap<&'a str, Vec<&'a str>>,
    color: &mut HashMap<&'a str, u8>,
  ) -> bool {
    color.insert(node, 1);

    if let Some(neighbors) = adjacency.get(node) {
      for &neighbor in neighbors {
        match color.get(neighbor) {
          Some(1) => return true,
          Some(0) => {
            if dfs(neighbor, adjacency, color) {
              return true;
            }
          }
          _ => {}
        }
      }
    }

    color.insert(node, 2);
    false
  }

  for node_id in nodes {
    if color.get(node_id.as_str()) == Some(&0) && dfs(node_id.as_str(), &adjacency, &mut color) {
      return Err(GraphError::CycleDetected);
    }
  }

  Ok(())
}
