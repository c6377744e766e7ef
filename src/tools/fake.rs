//! In-memory gateway for handler tests

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::gateway::{Gateway, GatewayError};

/// A request as seen by [`FakeGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: Vec<String>,
    pub body: Option<Value>,
}

/// Gateway returning a canned outcome and recording every request.
#[derive(Debug)]
pub struct FakeGateway {
    outcome: Result<Value, GatewayError>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeGateway {
    pub fn ok(body: Value) -> Self {
        Self::with_outcome(Ok(body))
    }

    pub fn failing(error: GatewayError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<Value, GatewayError>) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn request(
        &self,
        method: Method,
        path: &[&str],
        body: Option<Value>,
    ) -> Result<Value, GatewayError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.iter().map(|s| s.to_string()).collect(),
            body,
        });
        self.outcome.clone()
    }
}
