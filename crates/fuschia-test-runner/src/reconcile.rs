//! Mapping gateway payloads back onto nodes.
//!
//! The execution service may key its terminal payload by node id, display
//! name or node kind. Resolution tries, in order:
//!
//! 1. a key equal to the node id
//! 2. a key equal to the node's display name
//! 3. a key equal to the node kind
//! 4. the only key, if the payload has exactly one
//! 5. the whole payload

use fuschia_workflow::Node;
use serde_json::{Map, Value};
use tracing::warn;

/// How a payload entry was matched to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
  Id,
  Name,
  Kind,
  SoleKey,
  Raw,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
  pub data: Value,
  pub matched: MatchKind,
}

/// Resolve the result for one node from a terminal payload.
///
/// Never fails; falling back to the sole key or the raw payload is logged.
pub fn reconcile(payload: &Value, node: &Node) -> Reconciled {
  let Some(entries) = payload.as_object() else {
    warn!(node_id = %node.node_id, "reconcile_payload_not_object");
    return Reconciled {
      data: payload.clone(),
      matched: MatchKind::Raw,
    };
  };

  if let Some(reconciled) = match_node(entries, node) {
    return reconciled;
  }

  if let (1, Some((key, value))) = (entries.len(), entries.iter().next()) {
    warn!(node_id = %node.node_id, key = %key, "reconcile_sole_key");
    return Reconciled {
      data: value.clone(),
      matched: MatchKind::SoleKey,
    };
  }

  warn!(
    node_id = %node.node_id,
    keys = entries.len(),
    "reconcile_ambiguous"
  );
  Reconciled {
    data: payload.clone(),
    matched: MatchKind::Raw,
  }
}

/// Match a node by id, display name or kind only.
pub fn match_node(entries: &Map<String, Value>, node: &Node) -> Option<Reconciled> {
  let candidates = [
    (Some(node.node_id.as_str()), MatchKind::Id),
    (node.name.as_deref(), MatchKind::Name),
    (Some(node.kind.as_str()), MatchKind::Kind),
  ];

  candidates.into_iter().find_map(|(key, matched)| {
    let data = entries.get(key?)?;
    Some(Reconciled {
      data: data.clone(),
      matched,
    })
  })
}
