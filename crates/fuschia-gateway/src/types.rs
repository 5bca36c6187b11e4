use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
  pub session_id: String,
}

/// Status reported by a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayStatus {
  Running,
  Succeeded,
  Failed,
  Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
  pub status: GatewayStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl PollResponse {
  pub fn running() -> Self {
    Self {
      status: GatewayStatus::Running,
      data: None,
      error: None,
    }
  }

  pub fn succeeded(data: serde_json::Value) -> Self {
    Self {
      status: GatewayStatus::Succeeded,
      data: Some(data),
      error: None,
    }
  }

  pub fn failed(error: impl Into<String>) -> Self {
    Self {
      status: GatewayStatus::Failed,
      data: None,
      error: Some(error.into()),
    }
  }

  pub fn cancelled() -> Self {
    Self {
      status: GatewayStatus::Cancelled,
      data: None,
      error: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResponse {
  #[serde(default)]
  pub ack: bool,
}
