use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::types::{Session, SessionKey, SessionStatus};

/// Registry of in-flight test sessions.
///
/// Insert and remove are atomic. Only the poll loop that inserted a session
/// mutates it afterwards, and every mutation names the session id so a stale
/// writer can never touch a newer session in the same slot.
pub trait SessionRegistry: Send + Sync {
  /// Insert a session into its slot.
  ///
  /// Returns the occupying session, unchanged, if the slot is taken.
  fn try_insert(&self, session: Session) -> Result<(), Session>;

  /// The session currently occupying a slot.
  fn get(&self, key: &SessionKey) -> Option<Session>;

  /// Update a session's status. Returns false if the session is gone.
  fn set_status(&self, key: &SessionKey, session_id: &str, status: SessionStatus) -> bool;

  /// Record the gateway's id for a session. Returns false if the session is gone.
  fn set_gateway_session(&self, key: &SessionKey, session_id: &str, gateway_id: &str) -> bool;

  /// Remove a session from its slot, if it still occupies it.
  fn remove(&self, key: &SessionKey, session_id: &str) -> Option<Session>;

  /// Ask the session in a slot to cancel.
  ///
  /// Returns false if the slot is empty or its session already reached a
  /// terminal state.
  fn request_cancel(&self, key: &SessionKey) -> bool;

  /// All sessions currently tracked.
  fn list(&self) -> Vec<Session>;

  fn is_testing(&self, node_id: &str) -> bool {
    self.get(&SessionKey::node(node_id)).is_some()
  }

  fn is_workflow_testing(&self) -> bool {
    self.get(&SessionKey::Workflow).is_some()
  }
}

/// In-memory session registry.
#[derive(Debug, Default)]
pub struct InMemorySessionRegistry {
  sessions: Mutex<HashMap<SessionKey, Session>>,
}

impl InMemorySessionRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  fn with_session<T>(
    &self,
    key: &SessionKey,
    session_id: &str,
    f: impl FnOnce(&mut Session) -> T,
  ) -> Option<T> {
    let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
    sessions
      .get_mut(key)
      .filter(|session| session.id == session_id)
      .map(f)
  }
}

impl SessionRegistry for InMemorySessionRegistry {
  fn try_insert(&self, session: Session) -> Result<(), Session> {
    let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
    let key = session.key();
    if let Some(existing) = sessions.get(&key) {
      return Err(existing.clone());
    }
    sessions.insert(key, session);
    Ok(())
  }

  fn get(&self, key: &SessionKey) -> Option<Session> {
    let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
    sessions.get(key).cloned()
  }

  fn set_status(&self, key: &SessionKey, session_id: &str, status: SessionStatus) -> bool {
    self
      .with_session(key, session_id, |session| session.status = status)
      .is_some()
  }

  fn set_gateway_session(&self, key: &SessionKey, session_id: &str, gateway_id: &str) -> bool {
    self
      .with_session(key, session_id, |session| {
        session.gateway_session_id = Some(gateway_id.to_string())
      })
      .is_some()
  }

  fn remove(&self, key: &SessionKey, session_id: &str) -> Option<Session> {
    let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
    if sessions.get(key).is_some_and(|s| s.id == session_id) {
      sessions.remove(key)
    } else {
      None
    }
  }

  fn request_cancel(&self, key: &SessionKey) -> bool {
    let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
    match sessions.get(key) {
      Some(session) if !session.status.is_terminal() => {
        session.cancel.cancel();
        true
      }
      _ => false,
    }
  }

  fn list(&self) -> Vec<Session> {
    let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
    sessions.values().cloned().collect()
  }
}
