use std::collections::HashMap;

use fuschia_config::{Inputs, WorkflowDef};

use crate::error::WorkflowError;
use crate::graph::Graph;
use crate::node::{Edge, Node};
use crate::trigger::is_trigger;

/// Read-only graph model of one canvas snapshot.
#[derive(Debug, Clone)]
pub struct Workflow {
  pub workflow_id: String,
  pub name: String,
  nodes: Vec<Node>,
  index: HashMap<String, usize>,
  edges: Vec<Edge>,
  graph: Graph,
}

impl Workflow {
  /// Build the graph model from a canvas snapshot.
  pub fn from_def(def: WorkflowDef) -> Result<Self, WorkflowError> {
    let mut index = HashMap::with_capacity(def.nodes.len());
    let mut nodes = Vec::with_capacity(def.nodes.len());

    for node_def in def.nodes {
      if index.contains_key(&node_def.node_id) {
        return Err(WorkflowError::DuplicateNode(node_def.node_id));
      }
      index.insert(node_def.node_id.clone(), nodes.len());
      nodes.push(Node::from(node_def));
    }

    let edges: Vec<Edge> = def.edges.into_iter().map(Edge::from).collect();
    let graph = Graph::new(&edges);

    Ok(Self {
      workflow_id: def.workflow_id,
      name: def.name,
      nodes,
      index,
      edges,
      graph,
    })
  }

  /// Get a node by ID.
  pub fn get_node(&self, node_id: &str) -> Option<&Node> {
    self.index.get(node_id).map(|&idx| &self.nodes[idx])
  }

  /// Get a node by ID, failing if it is not part of the graph.
  pub fn node(&self, node_id: &str) -> Result<&Node, WorkflowError> {
    self
      .get_node(node_id)
      .ok_or_else(|| WorkflowError::NodeNotFound(node_id.to_string()))
  }

  pub fn contains(&self, node_id: &str) -> bool {
    self.index.contains_key(node_id)
  }

  /// All nodes, in canvas order.
  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  /// A node's configured inputs.
  pub fn config(&self, node_id: &str) -> Option<&Inputs> {
    self.get_node(node_id).map(|node| &node.inputs)
  }

  /// Edges leaving a node, in canvas order.
  pub fn outgoing(&self, node_id: &str) -> impl Iterator<Item = &Edge> + '_ {
    self
      .graph
      .outgoing(node_id)
      .iter()
      .map(move |&idx| &self.edges[idx])
  }

  /// Edges entering a node, in canvas order.
  pub fn incoming(&self, node_id: &str) -> impl Iterator<Item = &Edge> + '_ {
    self
      .graph
      .incoming(node_id)
      .iter()
      .map(move |&idx| &self.edges[idx])
  }

  /// The workflow's trigger: the first node, in canvas order, that is a
  /// trigger by role or kind.
  pub fn trigger(&self) -> Option<&Node> {
    self.nodes.iter().find(|node| is_trigger(node))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use fuschia_config::{EdgeDef, NodeDef, NodeRole};
  use serde_json::json;

  fn node_def(id: &str, kind: &str, role: NodeRole) -> NodeDef {
    NodeDef {
      node_id: id.to_string(),
      kind: kind.to_string(),
      role,
      name: None,
      inputs: Inputs::new(),
      agent_resources: None,
    }
  }

  fn create_def(nodes: Vec<NodeDef>, edges: Vec<EdgeDef>) -> WorkflowDef {
    WorkflowDef {
      workflow_id: "wf".to_string(),
      name: "Workflow".to_string(),
      nodes,
      edges,
    }
  }

  #[test]
  fn test_from_def_preserves_order() {
    let workflow = Workflow::from_def(create_def(
      vec![
        node_def("c", "http_request", NodeRole::Action),
        node_def("a", "http_request", NodeRole::Action),
        node_def("b", "http_request", NodeRole::Action),
      ],
      vec![],
    ))
    .unwrap();

    let ids: Vec<&str> = workflow.nodes().iter().map(|n| n.node_id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
    assert_eq!(workflow.get_node("b").unwrap().node_id, "b");
  }

  #[test]
  fn test_duplicate_node_rejected() {
    let result = Workflow::from_def(create_def(
      vec![
        node_def("a", "http_request", NodeRole::Action),
        node_def("a", "set", NodeRole::Action),
      ],
      vec![],
    ));

    assert!(matches!(result, Err(WorkflowError::DuplicateNode(id)) if id == "a"));
  }

  #[test]
  fn test_config_and_node_lookup() {
    let mut def = node_def("a", "http_request", NodeRole::Action);
    def.inputs.insert("url".to_string(), json!("https://example.com"));
    let workflow = Workflow::from_def(create_def(vec![def], vec![])).unwrap();

    assert_eq!(
      workflow.config("a").unwrap()["url"],
      json!("https://example.com")
    );
    assert!(workflow.config("missing").is_none());
    assert!(matches!(
      workflow.node("missing"),
      Err(WorkflowError::NodeNotFound(_))
    ));
  }

  #[test]
  fn test_outgoing_and_incoming_keep_dangling_edges() {
    let workflow = Workflow::from_def(create_def(
      vec![
        node_def("a", "http_request", NodeRole::Action),
        node_def("b", "http_request", NodeRole::Action),
      ],
      vec![
        EdgeDef::new("a", "b"),
        EdgeDef::new("a", "ghost"),
        EdgeDef::new("ghost", "b"),
      ],
    ))
    .unwrap();

    let out: Vec<&str> = workflow.outgoing("a").map(|e| e.to.as_str()).collect();
    assert_eq!(out, vec!["b", "ghost"]);
    let inc: Vec<&str> = workflow.incoming("b").map(|e| e.from.as_str()).collect();
    assert_eq!(inc, vec!["a", "ghost"]);
  }

  #[test]
  fn test_trigger_by_role_or_kind() {
    let by_kind = Workflow::from_def(create_def(
      vec![
        node_def("a", "http_request", NodeRole::Action),
        node_def("t", "webhook_trigger", NodeRole::Other),
      ],
      vec![],
    ))
    .unwrap();
    assert_eq!(by_kind.trigger().unwrap().node_id, "t");

    let first_wins = Workflow::from_def(create_def(
      vec![
        node_def("t1", "custom_start", NodeRole::Trigger),
        node_def("t2", "manual_trigger", NodeRole::Action),
      ],
      vec![],
    ))
    .unwrap();
    assert_eq!(first_wins.trigger().unwrap().node_id, "t1");

    let none = Workflow::from_def(create_def(
      vec![node_def("a", "http_request", NodeRole::Action)],
      vec![],
    ))
    .unwrap();
    assert!(none.trigger().is_none());
  }
}
