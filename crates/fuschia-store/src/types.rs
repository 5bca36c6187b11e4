use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Last-known outcome of running a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
  pub node_id: String,
  pub success: bool,
  /// Opaque payload produced by the execution service.
  pub data: serde_json::Value,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub updated_at: DateTime<Utc>,
}

impl NodeResult {
  pub fn success(node_id: impl Into<String>, data: serde_json::Value) -> Self {
    Self {
      node_id: node_id.into(),
      success: true,
      data,
      error: None,
      updated_at: Utc::now(),
    }
  }

  pub fn failure(node_id: impl Into<String>, error: impl Into<String>) -> Self {
    Self {
      node_id: node_id.into(),
      success: false,
      data: serde_json::Value::Null,
      error: Some(error.into()),
      updated_at: Utc::now(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionScope {
  Node,
  Workflow,
}

/// Registry slot a session occupies.
///
/// Node sessions are keyed per node; there is a single workflow slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionKey {
  Node(String),
  Workflow,
}

impl SessionKey {
  pub fn node(node_id: impl Into<String>) -> Self {
    Self::Node(node_id.into())
  }
}

impl std::fmt::Display for SessionKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Node(node_id) => write!(f, "node:{}", node_id),
      Self::Workflow => write!(f, "workflow"),
    }
  }
}

/// Lifecycle of a test session.
///
/// `Idle` is the only initial state. `Succeeded`, `Failed` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
  Idle,
  Submitting,
  Running,
  Succeeded,
  Failed,
  Cancelled,
}

impl SessionStatus {
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
  }
}

/// One tracked submit -> poll -> terminal lifecycle.
#[derive(Debug, Clone)]
pub struct Session {
  /// Local session id, assigned on creation.
  pub id: String,
  pub scope: SessionScope,
  /// Node id for node sessions, workflow id for workflow sessions.
  pub scoped_id: String,
  pub status: SessionStatus,
  /// Id the execution gateway returned on submit.
  pub gateway_session_id: Option<String>,
  pub started_at: DateTime<Utc>,
  /// Triggered by a cancel request; observed by the owning poll loop.
  pub cancel: CancellationToken,
}

impl Session {
  pub fn new(scope: SessionScope, scoped_id: impl Into<String>) -> Self {
    Self {
      id: uuid::Uuid::new_v4().to_string(),
      scope,
      scoped_id: scoped_id.into(),
      status: SessionStatus::Idle,
      gateway_session_id: None,
      started_at: Utc::now(),
      cancel: CancellationToken::new(),
    }
  }

  pub fn key(&self) -> SessionKey {
    match self.scope {
      SessionScope::Node => SessionKey::Node(self.scoped_id.clone()),
      SessionScope::Workflow => SessionKey::Workflow,
    }
  }
}
