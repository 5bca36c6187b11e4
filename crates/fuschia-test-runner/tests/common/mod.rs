//! Shared fixtures for runner tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use fuschia_config::{EdgeDef, Inputs, NodeDef, NodeRole, PollSettings, WorkflowDef};
use fuschia_gateway::{
  CancelResponse, ExecutionGateway, GatewayError, PollResponse, SubmitResponse,
};
use fuschia_test_plan::ExecutionRequest;
use fuschia_workflow::Workflow;

/// In-process gateway that replays scripted poll responses.
///
/// Once the script runs out every poll reports `running`. After a cancel
/// request a session keeps reporting `running` for `cancel_delay` more polls,
/// then reports `cancelled`.
#[derive(Default)]
pub struct ScriptedGateway {
  polls: Mutex<VecDeque<PollResponse>>,
  submitted: Mutex<Vec<ExecutionRequest>>,
  fail_submit: AtomicBool,
  cancel_delay: AtomicU32,
  /// Remaining `running` polls per cancelled session.
  cancelled: Mutex<HashMap<String, u32>>,
  poll_count: AtomicU32,
  polls_after_cancel: AtomicU32,
  cancel_count: AtomicU32,
}

impl ScriptedGateway {
  pub fn new(polls: impl IntoIterator<Item = PollResponse>) -> Self {
    Self {
      polls: Mutex::new(polls.into_iter().collect()),
      ..Default::default()
    }
  }

  pub fn failing_submit() -> Self {
    let gateway = Self::default();
    gateway.fail_submit.store(true, Ordering::SeqCst);
    gateway
  }

  /// Keep reporting `running` for `polls` polls after a cancel request.
  /// `u32::MAX` means the cancel is never honoured.
  pub fn with_cancel_delay(self, polls: u32) -> Self {
    self.cancel_delay.store(polls, Ordering::SeqCst);
    self
  }

  pub fn submitted(&self) -> Vec<ExecutionRequest> {
    self.submitted.lock().unwrap().clone()
  }

  pub fn poll_count(&self) -> u32 {
    self.poll_count.load(Ordering::SeqCst)
  }

  /// Polls received after a cancel request for the polled session.
  pub fn polls_after_cancel(&self) -> u32 {
    self.polls_after_cancel.load(Ordering::SeqCst)
  }

  pub fn cancel_count(&self) -> u32 {
    self.cancel_count.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl ExecutionGateway for ScriptedGateway {
  async fn submit(&self, request: &ExecutionRequest) -> Result<SubmitResponse, GatewayError> {
    if self.fail_submit.load(Ordering::SeqCst) {
      return Err(GatewayError::Status {
        status: 503,
        body: "unavailable".to_string(),
      });
    }
    let mut submitted = self.submitted.lock().unwrap();
    submitted.push(request.clone());
    Ok(SubmitResponse {
      session_id: format!("gw-{}", submitted.len()),
    })
  }

  async fn poll_status(&self, session_id: &str) -> Result<PollResponse, GatewayError> {
    self.poll_count.fetch_add(1, Ordering::SeqCst);
    if let Some(remaining) = self.cancelled.lock().unwrap().get_mut(session_id) {
      self.polls_after_cancel.fetch_add(1, Ordering::SeqCst);
      if *remaining == 0 {
        return Ok(PollResponse::cancelled());
      }
      *remaining = remaining.saturating_sub(1);
      return Ok(PollResponse::running());
    }
    let next = self.polls.lock().unwrap().pop_front();
    Ok(next.unwrap_or_else(PollResponse::running))
  }

  async fn cancel(&self, session_id: &str) -> Result<CancelResponse, GatewayError> {
    self.cancel_count.fetch_add(1, Ordering::SeqCst);
    let delay = self.cancel_delay.load(Ordering::SeqCst);
    self
      .cancelled
      .lock()
      .unwrap()
      .entry(session_id.to_string())
      .or_insert(delay);
    Ok(CancelResponse { ack: true })
  }
}

pub fn fast_polls(max_attempts: u32) -> PollSettings {
  PollSettings {
    interval_ms: 10,
    max_attempts,
  }
}

pub fn create_node(id: &str, kind: &str, name: Option<&str>, inputs: serde_json::Value) -> NodeDef {
  NodeDef {
    node_id: id.to_string(),
    kind: kind.to_string(),
    role: NodeRole::Action,
    name: name.map(str::to_string),
    inputs: serde_json::from_value::<Inputs>(inputs).unwrap(),
    agent_resources: None,
  }
}

/// T -> A -> B, with B reading A's output.
pub fn create_chain() -> Workflow {
  Workflow::from_def(WorkflowDef {
    workflow_id: "wf-1".to_string(),
    name: "Chain".to_string(),
    nodes: vec![
      create_node("T", "manual_trigger", None, serde_json::json!({})),
      create_node("A", "http_request", Some("Fetch"), serde_json::json!({})),
      create_node(
        "B",
        "set",
        Some("Shape"),
        serde_json::json!({ "value": "{{ $.A.body }}" }),
      ),
    ],
    edges: vec![EdgeDef::new("T", "A"), EdgeDef::new("A", "B")],
  })
  .unwrap()
}
