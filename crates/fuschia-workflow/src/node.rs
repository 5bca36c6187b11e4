use fuschia_config::{EdgeDef, Inputs, NodeDef, NodeRole};
use serde::{Deserialize, Serialize};

/// A node in the graph model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub node_id: String,
  pub kind: String,
  pub role: NodeRole,
  pub name: Option<String>,
  pub inputs: Inputs,
  pub agent_resources: Option<serde_json::Value>,
}

impl Node {
  /// Name to show for this node, falling back to its id.
  pub fn display_name(&self) -> &str {
    self.name.as_deref().unwrap_or(&self.node_id)
  }
}

impl From<NodeDef> for Node {
  fn from(def: NodeDef) -> Self {
    Self {
      node_id: def.node_id,
      kind: def.kind,
      role: def.role,
      name: def.name,
      inputs: def.inputs,
      agent_resources: def.agent_resources,
    }
  }
}

/// Connection metadata carried by an edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeMeta {
  pub source_handle: Option<String>,
  pub target_handle: Option<String>,
  pub label: Option<String>,
}

/// A directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
  pub from: String,
  pub to: String,
  pub meta: EdgeMeta,
}

impl From<EdgeDef> for Edge {
  fn from(def: EdgeDef) -> Self {
    Self {
      from: def.from,
      to: def.to,
      meta: EdgeMeta {
        source_handle: def.source_handle,
        target_handle: def.target_handle,
        label: def.label,
      },
    }
  }
}
