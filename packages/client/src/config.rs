//! Client configuration.

use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use crate::error::Result;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL the service is mounted at, e.g. `http://localhost:8080/api`.
    pub endpoint: Url,

    /// Timeout applied to every call.
    pub timeout: Duration,

    /// Headers sent with every call.
    pub default_headers: HashMap<String, String>,
}

impl ClientConfig {
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            timeout: DEFAULT_TIMEOUT,
            default_headers: HashMap::new(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a default header sent with every call
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// The URL of the procedure at `path` (e.g. `/greetings/hello`).
    ///
    /// Paths are appended to the endpoint, keeping its own path prefix.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.endpoint.as_str().trim_end_matches('/');
        format!("{}{}", base, path)
    }
}
