//! Execution request types and the request builder.
//!
//! An [`ExecutionRequest`] is the payload submitted to the execution gateway:
//!
//! ```json
//! {
//!   "actions": [{ "id": "A", "kind": "http_request", "name": "Fetch", "inputs": { ... } }],
//!   "edges": [{ "from": "$source", "to": "A" }],
//!   "state": { "B": { "data": { ... } } }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};

use fuschia_store::NodeResult;
use fuschia_workflow::{EdgeMeta, Inputs, Node, NodeRole, Workflow};
use serde::{Deserialize, Serialize};

use crate::compiler::CompiledSubgraph;

/// Synthetic node every entry node is connected from.
pub const SOURCE_NODE: &str = "$source";

/// Configuration keys that describe the node rather than configure it. They
/// are never sent for execution.
pub const RESERVED_CONFIG_KEYS: &[&str] = &[
  "name",
  "description",
  "icon",
  "category",
  "role",
  "version",
  "link",
  "links",
  "nodeParameters",
];

/// A node compiled for execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionAction {
  pub id: String,
  pub kind: String,
  pub name: String,
  pub inputs: Inputs,
  /// Present only on agent nodes.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub agent_resources: Option<serde_json::Value>,
}

/// An edge between two executed nodes, or from [`SOURCE_NODE`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledEdge {
  pub from: String,
  pub to: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_handle: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_handle: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
}

impl CompiledEdge {
  pub fn new(from: impl Into<String>, to: impl Into<String>, meta: EdgeMeta) -> Self {
    Self {
      from: from.into(),
      to: to.into(),
      source_handle: meta.source_handle,
      target_handle: meta.target_handle,
      label: meta.label,
    }
  }

  /// Edge from the synthetic source into an entry node.
  pub fn from_source(to: impl Into<String>) -> Self {
    Self::new(SOURCE_NODE, to, EdgeMeta::default())
  }
}

/// Result payload injected for a node that is not re-executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedState {
  pub data: serde_json::Value,
}

/// The compiled request submitted to the execution gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
  pub actions: Vec<ExecutionAction>,
  pub edges: Vec<CompiledEdge>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub state: Option<BTreeMap<String, CachedState>>,
}

/// Strip reserved keys from a node's configuration.
pub fn normalize_inputs(inputs: &Inputs) -> Inputs {
  inputs
    .iter()
    .filter(|(key, _)| !RESERVED_CONFIG_KEYS.contains(&key.as_str()))
    .map(|(key, value)| (key.clone(), value.clone()))
    .collect()
}

/// Compile a single node into an action.
pub fn build_action(node: &Node) -> ExecutionAction {
  let agent_resources = match node.role {
    NodeRole::Agent => Some(
      node
        .agent_resources
        .clone()
        .unwrap_or_else(|| serde_json::json!({})),
    ),
    _ => None,
  };

  ExecutionAction {
    id: node.node_id.clone(),
    kind: node.kind.clone(),
    name: node.display_name().to_string(),
    inputs: normalize_inputs(&node.inputs),
    agent_resources,
  }
}

/// Assemble the request for a compiled subgraph.
///
/// `cached` holds the results injected as `state`; only their `data` payload
/// is forwarded. An empty map leaves `state` absent.
pub fn build_request(
  workflow: &Workflow,
  compiled: &CompiledSubgraph,
  cached: &HashMap<String, NodeResult>,
) -> ExecutionRequest {
  let actions = compiled
    .execution_set
    .iter()
    .filter_map(|id| workflow.get_node(id))
    .map(build_action)
    .collect();

  let state = if cached.is_empty() {
    None
  } else {
    Some(
      cached
        .iter()
        .map(|(id, result)| {
          (
            id.clone(),
            CachedState {
              data: result.data.clone(),
            },
          )
        })
        .collect(),
    )
  };

  ExecutionRequest {
    actions,
    edges: compiled.edges.clone(),
    state,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn node(role: NodeRole, inputs: serde_json::Value) -> Node {
    Node {
      node_id: "n1".to_string(),
      kind: "llm_agent".to_string(),
      role,
      name: Some("Summarize".to_string()),
      inputs: serde_json::from_value(inputs).unwrap(),
      agent_resources: None,
    }
  }

  #[test]
  fn test_reserved_keys_stripped() {
    let action = build_action(&node(
      NodeRole::Action,
      json!({
        "name": "Summarize",
        "description": "does things",
        "icon": "sparkles",
        "category": "ai",
        "version": 2,
        "links": [],
        "nodeParameters": { "type": "object" },
        "prompt": "{{ $.fetch.body }}"
      }),
    ));

    assert_eq!(action.inputs.len(), 1);
    assert_eq!(action.inputs["prompt"], json!("{{ $.fetch.body }}"));
    assert_eq!(action.name, "Summarize");
    assert!(action.agent_resources.is_none());
  }

  #[test]
  fn test_agent_nodes_carry_resources() {
    let mut agent = node(NodeRole::Agent, json!({}));
    let action = build_action(&agent);
    assert_eq!(action.agent_resources, Some(json!({})));

    agent.agent_resources = Some(json!({ "tools": ["search"] }));
    let action = build_action(&agent);
    assert_eq!(action.agent_resources, Some(json!({ "tools": ["search"] })));
  }

  #[test]
  fn test_wire_format() {
    let request = ExecutionRequest {
      actions: vec![],
      edges: vec![
        CompiledEdge::from_source("A"),
        CompiledEdge::new(
          "A",
          "B",
          EdgeMeta {
            source_handle: Some("out".to_string()),
            target_handle: None,
            label: Some("ok".to_string()),
          },
        ),
      ],
      state: None,
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
      value,
      json!({
        "actions": [],
        "edges": [
          { "from": "$source", "to": "A" },
          { "from": "A", "to": "B", "sourceHandle": "out", "label": "ok" }
        ]
      })
    );
  }
}
