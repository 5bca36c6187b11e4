use serde::{Deserialize, Serialize};

use crate::input::Inputs;

/// A node as stored by the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
  pub node_id: String,
  /// Behavior type, e.g. "http_request" or "manual_trigger".
  pub kind: String,
  #[serde(default)]
  pub role: NodeRole,
  /// Display name shown on the canvas.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default)]
  pub inputs: Inputs,
  /// Tools, memory and model bindings attached to agent nodes.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub agent_resources: Option<serde_json::Value>,
}

/// Declared role (category) of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
  Trigger,
  #[default]
  Action,
  Agent,
  /// Any category the orchestrator has no special handling for.
  #[serde(other)]
  Other,
}
