//! Inference endpoint clients.
//!
//! The evaluator talks to the endpoint through [`InferenceClient`]; status
//! interpretation and label comparison happen in the engine, not here.

mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::model::Payload;

pub use http::{HttpInferenceClient, USER_AGENT};

/// Raw response of one prediction call.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResponse {
    pub status: u16,
    /// Parsed JSON body. Only read for 2xx responses.
    pub body: Option<Value>,
}

impl EndpointResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    pub fn status_only(status: u16) -> Self {
        Self { status, body: None }
    }
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Send one payload. `Err` only for transport-level failures; any HTTP
    /// status is returned as `Ok`.
    async fn predict(&self, payload: &Payload) -> Result<EndpointResponse, TransportError>;

    /// Endpoint identity for logs and summaries.
    fn endpoint(&self) -> &str;
}
