//! The submit -> poll -> terminal loop of a single test session.
//!
//! ```text
//! Idle ──► Submitting ──► Running ──► Succeeded
//!              │             │    ├─► Failed
//!              └─► Failed    │    └─► Cancelled
//!                            └─► Failed (transport error, poll ceiling)
//! ```
//!
//! The supervisor owns its session: it inserts it, is the only writer of its
//! status, and removes it once terminal. Cancellation is cooperative. A
//! cancelled token makes the supervisor send one cancel to the gateway, then
//! keep polling until the gateway reports `cancelled`.

use std::sync::Arc;

use fuschia_config::PollSettings;
use fuschia_gateway::{ExecutionGateway, GatewayStatus};
use fuschia_store::{Session, SessionKey, SessionRegistry, SessionScope, SessionStatus};
use fuschia_test_plan::ExecutionRequest;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::error::TestError;
use crate::events::{NoopNotifier, TestEvent, TestNotifier};

/// Non-error end of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
  /// Terminal payload of a successful execution.
  Succeeded { data: serde_json::Value },
  Cancelled,
}

/// Drives test sessions through the execution gateway.
#[derive(Clone)]
pub struct PollingSupervisor {
  gateway: Arc<dyn ExecutionGateway>,
  sessions: Arc<dyn SessionRegistry>,
  notifier: Arc<dyn TestNotifier>,
  poll: PollSettings,
}

impl PollingSupervisor {
  pub fn new(
    gateway: Arc<dyn ExecutionGateway>,
    sessions: Arc<dyn SessionRegistry>,
    poll: PollSettings,
  ) -> Self {
    Self {
      gateway,
      sessions,
      notifier: Arc::new(NoopNotifier),
      poll,
    }
  }

  /// Set the notifier that receives progress events.
  pub fn with_notifier(mut self, notifier: Arc<dyn TestNotifier>) -> Self {
    self.notifier = notifier;
    self
  }

  pub fn sessions(&self) -> &Arc<dyn SessionRegistry> {
    &self.sessions
  }

  /// Run one session to completion.
  ///
  /// Fails with [`TestError::AlreadyRunning`] without touching the registry
  /// if the slot for `scope`/`scoped_id` is taken.
  #[instrument(name = "test_session", skip_all, fields(scope = ?scope, scoped_id = %scoped_id))]
  pub async fn run(
    &self,
    scope: SessionScope,
    scoped_id: &str,
    request: &ExecutionRequest,
  ) -> Result<RunOutcome, TestError> {
    let session = Session::new(scope, scoped_id);
    let key = session.key();
    let session_id = session.id.clone();
    let cancel = session.cancel.clone();

    if let Err(existing) = self.sessions.try_insert(session) {
      warn!(key = %key, existing = %existing.id, "test_already_running");
      return Err(TestError::AlreadyRunning { key });
    }

    info!(session_id = %session_id, "test_session_started");
    self.notifier.notify(TestEvent::SessionStarted {
      session_id: session_id.clone(),
      scope,
      scoped_id: scoped_id.to_string(),
    });

    let outcome = self.drive(&key, &session_id, &cancel, request).await;

    let status = match &outcome {
      Ok(RunOutcome::Succeeded { .. }) => SessionStatus::Succeeded,
      Ok(RunOutcome::Cancelled) => SessionStatus::Cancelled,
      Err(_) => SessionStatus::Failed,
    };
    self.sessions.set_status(&key, &session_id, status);
    self.sessions.remove(&key, &session_id);

    match &outcome {
      Err(e) => warn!(session_id = %session_id, error = %e, "test_session_failed"),
      Ok(_) => info!(session_id = %session_id, status = ?status, "test_session_finished"),
    }
    self.notifier.notify(TestEvent::Finished { session_id, status });

    outcome
  }

  async fn drive(
    &self,
    key: &SessionKey,
    session_id: &str,
    cancel: &CancellationToken,
    request: &ExecutionRequest,
  ) -> Result<RunOutcome, TestError> {
    self
      .sessions
      .set_status(key, session_id, SessionStatus::Submitting);
    let gateway_id = self.gateway.submit(request).await?.session_id;

    self.sessions.set_gateway_session(key, session_id, &gateway_id);
    self
      .sessions
      .set_status(key, session_id, SessionStatus::Running);
    info!(session_id = %session_id, gateway_session_id = %gateway_id, "test_submitted");
    self.notifier.notify(TestEvent::Submitted {
      session_id: session_id.to_string(),
      gateway_session_id: gateway_id.clone(),
    });

    let mut cancel_sent = false;
    let max_attempts = self.poll.attempts();

    for attempt in 1..=max_attempts {
      tokio::time::sleep(self.poll.interval()).await;

      if cancel.is_cancelled() && !cancel_sent {
        let ack = self.gateway.cancel(&gateway_id).await?.ack;
        cancel_sent = true;
        info!(session_id = %session_id, ack, "test_cancel_sent");
        self.notifier.notify(TestEvent::CancelSent {
          session_id: session_id.to_string(),
        });
      }

      let response = self.gateway.poll_status(&gateway_id).await?;
      self.notifier.notify(TestEvent::Polled {
        session_id: session_id.to_string(),
        attempt,
        status: response.status,
      });

      match response.status {
        GatewayStatus::Running => continue,
        GatewayStatus::Succeeded => {
          return Ok(RunOutcome::Succeeded {
            data: response.data.unwrap_or_default(),
          });
        }
        GatewayStatus::Failed => {
          return Err(TestError::ExecutionFailed(
            response
              .error
              .unwrap_or_else(|| "execution failed".to_string()),
          ));
        }
        GatewayStatus::Cancelled => return Ok(RunOutcome::Cancelled),
      }
    }

    Err(TestError::Timeout {
      attempts: max_attempts,
    })
  }
}
