//! Transport trait definitions

use async_trait::async_trait;
use bytes::Bytes;
use std::net::SocketAddr;

use crate::error::Result;

/// A half-duplex, line-oriented byte stream
///
/// Each `send_line` writes exactly one delimited line and each `recv_line`
/// returns exactly one, delimiter included. Implementations never read ahead
/// past what the caller asks for beyond their own buffer.
#[async_trait]
pub trait LineTransport: Send {
    /// Write one already-delimited line and flush it
    async fn send_line(&mut self, line: Bytes) -> Result<()>;

    /// Read the next line, delimiter included
    async fn recv_line(&mut self) -> Result<Bytes>;

    /// False once the peer closed the stream or an I/O error occurred
    fn is_connected(&self) -> bool;

    /// Shut down the write side and mark the stream closed
    async fn close(&mut self) -> Result<()>;

    /// Remote address, if known
    fn peer_addr(&self) -> Option<SocketAddr>;
}
