use thiserror::Error;

/// Errors talking to the execution service.
#[derive(Debug, Error)]
pub enum GatewayError {
  /// Network failure, timeout or undecodable body.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The service answered with a non-success status code.
  #[error("gateway returned {status}: {body}")]
  Status { status: u16, body: String },

  /// The configured base URL cannot address the service.
  #[error("invalid gateway url: {0}")]
  InvalidUrl(String),

  /// The service answered 2xx with a body that does not fit the protocol.
  #[error("invalid gateway response: {0}")]
  InvalidResponse(String),
}
