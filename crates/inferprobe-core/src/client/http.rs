//! reqwest-backed client: JSON POST with a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde_json::Value;
use tracing::trace;

use super::{EndpointResponse, InferenceClient};
use crate::error::{ProbeError, ProbeResult, TransportError};
use crate::model::Payload;

/// User-Agent sent with every prediction request.
pub const USER_AGENT: &str = concat!("inferprobe/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct HttpInferenceClient {
    client: reqwest::Client,
    url: Url,
    authorization: HeaderValue,
    timeout: Duration,
}

impl std::fmt::Debug for HttpInferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpInferenceClient")
            .field("url", &self.url.as_str())
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpInferenceClient {
    /// `timeout` bounds the whole request; the evaluator applies its own
    /// per-case deadline on top.
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> ProbeResult<Self> {
        let url = url.into();
        let token = token.into();
        if url.trim().is_empty() {
            return Err(ProbeError::config("endpoint URL is empty"));
        }
        if token.trim().is_empty() {
            return Err(ProbeError::config("bearer token is empty"));
        }
        let url = Url::parse(url.trim())
            .map_err(|e| ProbeError::config(format!("invalid endpoint URL '{}': {}", url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProbeError::config(format!(
                "endpoint URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| {
                ProbeError::config("bearer token contains characters not allowed in a header")
            })?;
        authorization.set_sensitive(true);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url,
            authorization,
            timeout,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::from(err)
        }
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn predict(&self, payload: &Payload) -> Result<EndpointResponse, TransportError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(AUTHORIZATION, self.authorization.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        trace!(status = status.as_u16(), "endpoint responded");

        if !status.is_success() {
            return Ok(EndpointResponse::status_only(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode {
                message: e.to_string(),
            })?;

        Ok(EndpointResponse {
            status: status.as_u16(),
            body: Some(body),
        })
    }

    fn endpoint(&self) -> &str {
        self.url.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_url_and_token() {
        let err = HttpInferenceClient::new("", "t", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ProbeError::Config { .. }));
        let err =
            HttpInferenceClient::new("http://localhost/predict", " ", Duration::from_secs(1))
                .unwrap_err();
        assert_eq!(err.to_string(), "configuration error: bearer token is empty");
    }

    #[test]
    fn rejects_unparseable_url_and_non_http_scheme() {
        let err = HttpInferenceClient::new("not a url", "tok", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ProbeError::Config { .. }));
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("invalid endpoint URL"), "{err}");

        let err = HttpInferenceClient::new("ftp://models/predict", "tok", Duration::from_secs(1))
            .unwrap_err();
        assert!(err.to_string().contains("http or https"), "{err}");
    }

    #[test]
    fn rejects_token_that_is_not_a_header_value() {
        let err = HttpInferenceClient::new(
            "http://localhost/predict",
            "line\nbreak",
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, ProbeError::Config { .. }));
        assert!(err.to_string().contains("bearer token"), "{err}");
    }

    #[test]
    fn reports_configured_endpoint() {
        let client =
            HttpInferenceClient::new("http://localhost/predict", "s3cr3t", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.endpoint(), "http://localhost/predict");
        assert!(!format!("{:?}", client).contains("s3cr3t"));
    }
}
