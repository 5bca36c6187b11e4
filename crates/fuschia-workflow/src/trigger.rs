use fuschia_config::NodeRole;

use crate::node::Node;

/// Node kinds that start a workflow regardless of their declared role.
pub const TRIGGER_KINDS: &[&str] = &[
  "manual_trigger",
  "webhook_trigger",
  "schedule_trigger",
  "chat_trigger",
  "form_trigger",
];

/// Whether a node is a trigger, by role or by kind.
pub fn is_trigger(node: &Node) -> bool {
  node.role == NodeRole::Trigger || TRIGGER_KINDS.contains(&node.kind.as_str())
}
