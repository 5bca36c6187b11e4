//! Orchestrator settings.
//!
//! Every field has a default so a partial (or empty) JSON object is a valid
//! settings file:
//!
//! ```json
//! { "poll": { "interval_ms": 500 }, "gateway": { "base_url": "http://localhost:9000" } }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestSettings {
  pub poll: PollSettings,
  pub gateway: GatewaySettings,
}

/// Status polling cadence. The defaults give a test about two minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
  pub interval_ms: u64,
  /// Poll ceiling. A value of 0 is treated as 1.
  pub max_attempts: u32,
}

impl PollSettings {
  pub fn interval(&self) -> Duration {
    Duration::from_millis(self.interval_ms)
  }

  /// The effective poll ceiling; a test always polls at least once.
  pub fn attempts(&self) -> u32 {
    self.max_attempts.max(1)
  }
}

impl Default for PollSettings {
  fn default() -> Self {
    Self {
      interval_ms: 2_000,
      max_attempts: 60,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
  pub base_url: String,
  pub request_timeout_ms: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub api_token: Option<String>,
}

impl GatewaySettings {
  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.request_timeout_ms)
  }
}

impl Default for GatewaySettings {
  fn default() -> Self {
    Self {
      base_url: "http://127.0.0.1:8787".to_string(),
      request_timeout_ms: 30_000,
      api_token: None,
    }
  }
}
