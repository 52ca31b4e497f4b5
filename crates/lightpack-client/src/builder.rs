//! Session builder pattern

use crate::session::{Session, SessionConfig};
use crate::Result;

/// Builder for a Lightpack session
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    config: SessionConfig,
}

impl SessionBuilder {
    /// Create a new builder with default settings (`127.0.0.1:3636`, no key)
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Set controller host
    pub fn host(mut self, host: &str) -> Self {
        self.config.host = host.to_string();
        self
    }

    /// Set controller port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set API key
    pub fn api_key(mut self, key: &str) -> Self {
        self.config.api_key = Some(key.to_string());
        self
    }

    /// Set maximum response line size in bytes
    pub fn max_line_size(mut self, bytes: usize) -> Self {
        self.config.transport.max_line_size = bytes;
        self
    }

    /// Set TCP keepalive interval in seconds (0 disables)
    pub fn keepalive(mut self, secs: u64) -> Self {
        self.config.transport.keepalive_secs = secs;
        self
    }

    /// Enable/disable TCP_NODELAY
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.config.transport.nodelay = enabled;
        self
    }

    /// Build an unconnected session
    pub fn build(self) -> Session {
        Session::new(self.config)
    }

    /// Build and connect
    pub async fn connect(self) -> Result<Session> {
        let mut session = self.build();
        session.connect().await?;
        Ok(session)
    }
}
