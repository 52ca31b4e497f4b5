//! TCP transport implementation
//!
//! Plain TCP carrying newline-delimited ASCII lines.

use serde::Deserialize;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info};

use lightpack_core::DEFAULT_MAX_LINE_SIZE;

use crate::error::{Result, TransportError};
use crate::line::LineStream;

/// A line stream over TCP
pub type TcpLineStream = LineStream<TcpStream>;

/// TCP configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TcpConfig {
    /// Maximum response line size in bytes, delimiter included
    pub max_line_size: usize,
    /// Keep-alive interval in seconds (0 = disabled)
    pub keepalive_secs: u64,
    /// Disable Nagle's algorithm
    pub nodelay: bool,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            max_line_size: DEFAULT_MAX_LINE_SIZE,
            keepalive_secs: 30,
            nodelay: true,
        }
    }
}

/// TCP transport
#[derive(Debug, Clone, Default)]
pub struct TcpTransport {
    config: TcpConfig,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TcpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TcpConfig {
        &self.config
    }

    /// Connect to a controller
    pub async fn connect(&self, host: &str, port: u16) -> Result<TcpLineStream> {
        info!("Connecting to TCP: {}:{}", host, port);

        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        if self.config.nodelay {
            stream.set_nodelay(true)?;
        }

        // Enable TCP keepalive if configured
        if self.config.keepalive_secs > 0 {
            let socket = socket2::SockRef::from(&stream);
            let keepalive = socket2::TcpKeepalive::new()
                .with_time(Duration::from_secs(self.config.keepalive_secs));
            if let Err(e) = socket.set_tcp_keepalive(&keepalive) {
                debug!("Could not enable keepalive: {}", e);
            }
        }

        let peer = stream.peer_addr().ok();
        info!("TCP connected to {}:{}", host, port);

        Ok(LineStream::with_max_line_size(stream, self.config.max_line_size).with_peer(peer))
    }
}
