//! Test progress events and notifiers.
//!
//! The supervisor emits an event at every step of a session so callers can
//! reflect live status.

use fuschia_gateway::GatewayStatus;
use fuschia_store::{SessionScope, SessionStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted while a test session runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TestEvent {
  /// A session took its slot in the registry.
  SessionStarted {
    session_id: String,
    scope: SessionScope,
    scoped_id: String,
  },

  /// The gateway accepted the request.
  Submitted {
    session_id: String,
    gateway_session_id: String,
  },

  /// A status poll returned.
  Polled {
    session_id: String,
    attempt: u32,
    status: GatewayStatus,
  },

  /// A cancel request was sent to the gateway.
  CancelSent { session_id: String },

  /// The session reached a terminal state and left the registry.
  Finished {
    session_id: String,
    status: SessionStatus,
  },
}

/// Receives test events.
pub trait TestNotifier: Send + Sync {
  fn notify(&self, event: TestEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl TestNotifier for NoopNotifier {
  fn notify(&self, _event: TestEvent) {}
}

/// Sends events to an unbounded channel.
///
/// At most one event per poll, so the channel stays small even with a slow
/// consumer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<TestEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<TestEvent>) -> Self {
    Self { sender }
  }
}

impl TestNotifier for ChannelNotifier {
  fn notify(&self, event: TestEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
