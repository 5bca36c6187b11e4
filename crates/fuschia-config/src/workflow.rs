use serde::{Deserialize, Serialize};

use crate::edge::EdgeDef;
use crate::node::NodeDef;

/// A canvas snapshot: every node and edge of one workflow.
///
/// Node order is the canvas order and is preserved all the way into compiled
/// execution requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDef {
  pub workflow_id: String,
  pub name: String,
  pub nodes: Vec<NodeDef>,
  #[serde(default)]
  pub edges: Vec<EdgeDef>,
}
