use fuschia_gateway::GatewayError;
use fuschia_store::{SessionKey, StoreError};
use fuschia_test_plan::PlanError;
use thiserror::Error;

/// Errors that end a test.
///
/// Cancellation is not an error; a cancelled test returns a report with
/// [`TestStatus::Cancelled`](crate::TestStatus::Cancelled).
#[derive(Debug, Error)]
pub enum TestError {
  /// The test could not be planned. Nothing was submitted.
  #[error(transparent)]
  Plan(#[from] PlanError),

  /// A session already occupies the slot.
  #[error("a test is already running for {key}")]
  AlreadyRunning { key: SessionKey },

  /// Submit, poll or cancel failed.
  #[error("transport error: {0}")]
  Transport(#[from] GatewayError),

  /// The session was still running when the poll ceiling was reached.
  #[error("test did not complete in time ({attempts} polls)")]
  Timeout { attempts: u32 },

  /// The gateway reported a failed execution.
  #[error("execution failed: {0}")]
  ExecutionFailed(String),

  #[error("result store error: {0}")]
  Store(#[from] StoreError),
}
