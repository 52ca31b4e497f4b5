//! Command channel
//!
//! Strictly half-duplex: one command line out, one response line back.
//! Nothing is pipelined and nothing is read ahead.

use lightpack_core::response::strip_delimiter;
use lightpack_core::{Command, Response};
use lightpack_transport::LineTransport;
use std::net::SocketAddr;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Encodes commands, writes them, and classifies the single response line
pub struct CommandChannel {
    transport: Box<dyn LineTransport>,
}

impl CommandChannel {
    pub fn new(transport: Box<dyn LineTransport>) -> Self {
        Self { transport }
    }

    /// Read and discard the controller's greeting
    ///
    /// The greeting must be a non-empty UTF-8 line. Returns its text.
    pub async fn read_welcome(&mut self) -> Result<String> {
        let frame = self
            .transport
            .recv_line()
            .await
            .map_err(|e| ClientError::Handshake(e.to_string()))?;

        let text = std::str::from_utf8(strip_delimiter(&frame))
            .map_err(|_| ClientError::Handshake("welcome line is not UTF-8".to_string()))?;

        if text.trim().is_empty() {
            return Err(ClientError::Handshake("empty welcome line".to_string()));
        }

        debug!("Welcome: {}", text);
        Ok(text.to_string())
    }

    /// Send one command and classify its response
    ///
    /// Controller error tokens come back as [`ClientError::Protocol`] with the
    /// matching kind. Any transport failure leaves the channel unusable.
    pub async fn execute(&mut self, command: &Command) -> Result<Response> {
        if !self.transport.is_connected() {
            return Err(ClientError::NotConnected);
        }

        let line = command.encode()?;
        debug!("-> {}", command.redacted());
        self.transport.send_line(line).await?;

        let frame = self.transport.recv_line().await?;
        debug!("<- {}", String::from_utf8_lossy(strip_delimiter(&frame)));

        Ok(Response::decode(&frame)?)
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.transport.peer_addr()
    }

    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await?;
        Ok(())
    }
}
