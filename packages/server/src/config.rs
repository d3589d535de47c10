//! Serving configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::{Error, Result};

/// Environment variable overriding the port.
pub const PORT_VAR: &str = "PORT";

/// Environment variable overriding the base URL.
pub const BASE_URL_VAR: &str = "ENTANGLE_BASE_URL";

/// Configuration for [`serve`](crate::serve).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port to bind.
    pub port: u16,
    /// Path prefix every route is mounted under.
    pub base_url: String,
    /// Answer CORS preflights and allow any origin.
    pub cors: bool,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            base_url: "/api".to_string(),
            cors: true,
            body_limit: 2 * 1024 * 1024,
        }
    }
}

impl ServeConfig {
    /// Defaults, overridden by `PORT` and `ENTANGLE_BASE_URL` when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = lookup(PORT_VAR) {
            config.port = port.trim().parse().map_err(|_| Error::InvalidConfig {
                name: PORT_VAR.to_string(),
                message: format!("'{}' is not a port number", port),
            })?;
        }

        if let Some(base_url) = lookup(BASE_URL_VAR) {
            config.base_url = base_url;
        }

        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cors(mut self, cors: bool) -> Self {
        self.cors = cors;
        self
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
