mod error;
mod gateway;
mod http;
mod types;

pub use error::GatewayError;
pub use gateway::ExecutionGateway;
pub use http::HttpGateway;
pub use types::{CancelResponse, GatewayStatus, PollResponse, SubmitResponse};
