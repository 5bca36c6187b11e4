use async_trait::async_trait;
use fuschia_config::GatewaySettings;
use fuschia_test_plan::ExecutionRequest;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::GatewayError;
use crate::gateway::ExecutionGateway;
use crate::types::{CancelResponse, PollResponse, SubmitResponse};

/// [`ExecutionGateway`] over JSON/HTTP.
///
/// ```text
/// POST {base}/executions               -> { "sessionId": .. }
/// GET  {base}/executions/{id}          -> { "status": .., "data"?: .., "error"?: .. }
/// POST {base}/executions/{id}/cancel   -> { "ack": .. }
/// ```
#[derive(Debug, Clone)]
pub struct HttpGateway {
  client: Client,
  base_url: Url,
  api_token: Option<String>,
}

impl HttpGateway {
  pub fn new(settings: &GatewaySettings) -> Result<Self, GatewayError> {
    let client = Client::builder()
      .timeout(settings.request_timeout())
      .build()?;

    let base_url = Url::parse(&settings.base_url)
      .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", settings.base_url, e)))?;
    if base_url.cannot_be_a_base() {
      return Err(GatewayError::InvalidUrl(settings.base_url.clone()));
    }

    Ok(Self {
      client,
      base_url,
      api_token: settings.api_token.clone(),
    })
  }

  /// Append path segments to the base URL, percent-encoding each one.
  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    // Checked in `new`: the base always has path segments
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
    match &self.api_token {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }

  async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
    let response = self.authorize(request).send().await?;
    decode(response).await
  }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
  let status = response.status();
  let body = response.text().await?;

  if !status.is_success() {
    return Err(GatewayError::Status {
      status: status.as_u16(),
      body,
    });
  }

  serde_json::from_str(&body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl ExecutionGateway for HttpGateway {
  async fn submit(&self, request: &ExecutionRequest) -> Result<SubmitResponse, GatewayError> {
    debug!(actions = request.actions.len(), "gateway_submit");
    self
      .send(self.client.post(self.url(&["executions"])).json(request))
      .await
  }

  async fn poll_status(&self, session_id: &str) -> Result<PollResponse, GatewayError> {
    debug!(session_id = %session_id, "gateway_poll");
    self
      .send(self.client.get(self.url(&["executions", session_id])))
      .await
  }

  async fn cancel(&self, session_id: &str) -> Result<CancelResponse, GatewayError> {
    debug!(session_id = %session_id, "gateway_cancel");
    self
      .send(
        self
          .client
          .post(self.url(&["executions", session_id, "cancel"])),
      )
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn create_gateway(base_url: &str) -> HttpGateway {
    let settings = GatewaySettings {
      base_url: base_url.to_string(),
      ..GatewaySettings::default()
    };
    HttpGateway::new(&settings).unwrap()
  }

  #[test]
  fn test_urls_ignore_trailing_slash() {
    let gateway = create_gateway("http://localhost:9000/api/");

    assert_eq!(
      gateway.url(&["executions"]).as_str(),
      "http://localhost:9000/api/executions"
    );
    assert_eq!(
      gateway.url(&["executions", "s-1", "cancel"]).as_str(),
      "http://localhost:9000/api/executions/s-1/cancel"
    );
    assert_eq!(
      create_gateway("http://localhost:9000").url(&["executions"]).as_str(),
      "http://localhost:9000/executions"
    );
  }

  #[test]
  fn test_session_id_is_a_single_segment() {
    let gateway = create_gateway("http://localhost:9000");

    assert_eq!(
      gateway.url(&["executions", "a/b?c#d", "cancel"]).as_str(),
      "http://localhost:9000/executions/a%2Fb%3Fc%23d/cancel"
    );
  }

  #[test]
  fn test_invalid_base_url_rejected() {
    for base_url in ["not a url", "mailto:ops@example.com"] {
      let settings = GatewaySettings {
        base_url: base_url.to_string(),
        ..GatewaySettings::default()
      };
      assert!(matches!(
        HttpGateway::new(&settings),
        Err(GatewayError::InvalidUrl(_))
      ));
    }
  }
}
