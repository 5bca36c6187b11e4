use serde::{Deserialize, Serialize};

/// A directed connection between two nodes on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDef {
  pub from: String,
  pub to: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_handle: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_handle: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
}

impl EdgeDef {
  /// An edge without port handles or label.
  pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
    Self {
      from: from.into(),
      to: to.into(),
      source_handle: None,
      target_handle: None,
      label: None,
    }
  }
}
