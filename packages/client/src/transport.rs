//! HTTP execution abstraction.
//!
//! Calls go through the [`Transport`] trait so proxies can be exercised in
//! tests without a network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;

use crate::error::Result;
use crate::types::{CallRequest, CallResponse};

/// Sends encoded calls and returns the raw responses.
///
/// Error statuses are not failures at this layer; only requests that got no
/// answer are.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: &CallRequest) -> Result<CallResponse>;
}

/// Production transport using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport with the given timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: &CallRequest) -> Result<CallResponse> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::try_from(name.as_str())?;
            let value = HeaderValue::try_from(value.as_str())?;
            headers.insert(name, value);
        }

        let response = self
            .client
            .post(&request.url)
            .headers(headers)
            .json(&request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body_text = response.text().await?;
        Ok(CallResponse::from_text(status, body_text))
    }
}

/// Mock transport for testing.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use crate::error::Error;

    /// Returns canned responses keyed by URL and records every request.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        responses: Arc<Mutex<HashMap<String, CallResponse>>>,
        recorded: Arc<Mutex<Vec<CallRequest>>>,
        failure: Arc<Mutex<Option<String>>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: CallResponse) -> Self {
            self.responses.lock().unwrap().insert(url.into(), response);
            self
        }

        /// Fail every request as if the server were unreachable.
        pub fn fail_with(self, message: impl Into<String>) -> Self {
            *self.failure.lock().unwrap() = Some(message.into());
            self
        }

        pub fn recorded(&self) -> Vec<CallRequest> {
            self.recorded.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post(&self, request: &CallRequest) -> Result<CallResponse> {
            self.recorded.lock().unwrap().push(request.clone());

            if let Some(message) = self.failure.lock().unwrap().clone() {
                return Err(Error::Transport { message });
            }

            Ok(self
                .responses
                .lock()
                .unwrap()
                .get(&request.url)
                .cloned()
                .unwrap_or_else(|| CallResponse::from_text(404, "Not Found")))
        }
    }
}
