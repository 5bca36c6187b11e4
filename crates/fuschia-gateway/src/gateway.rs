use async_trait::async_trait;
use fuschia_test_plan::ExecutionRequest;

use crate::error::GatewayError;
use crate::types::{CancelResponse, PollResponse, SubmitResponse};

/// The external service that executes compiled test requests.
///
/// Implementations do not retry; a failed call is reported to the caller
/// as is.
#[async_trait]
pub trait ExecutionGateway: Send + Sync {
  /// Submit a request, returning the service's session id.
  async fn submit(&self, request: &ExecutionRequest) -> Result<SubmitResponse, GatewayError>;

  /// Fetch the current status of a session.
  async fn poll_status(&self, session_id: &str) -> Result<PollResponse, GatewayError>;

  /// Ask the service to cancel a session. Cancellation is advisory; the
  /// session reports `cancelled` on a later poll.
  async fn cancel(&self, session_id: &str) -> Result<CancelResponse, GatewayError>;
}
