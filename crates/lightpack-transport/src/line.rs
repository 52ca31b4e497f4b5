//! Newline-delimited framing over any tokio byte stream

use async_trait::async_trait;
use bytes::Bytes;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, trace};

use lightpack_core::{DEFAULT_MAX_LINE_SIZE, LINE_DELIMITER};

use crate::error::{Result, TransportError};
use crate::traits::LineTransport;

/// A buffered stream that reads and writes one line at a time
pub struct LineStream<S> {
    stream: BufReader<S>,
    max_line_size: usize,
    peer: Option<SocketAddr>,
    connected: bool,
}

impl<S> LineStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self::with_max_line_size(stream, DEFAULT_MAX_LINE_SIZE)
    }

    /// `max_line_size` bounds a single line, delimiter included
    pub fn with_max_line_size(stream: S, max_line_size: usize) -> Self {
        Self {
            stream: BufReader::new(stream),
            max_line_size: max_line_size.max(1),
            peer: None,
            connected: true,
        }
    }

    pub(crate) fn with_peer(mut self, peer: Option<SocketAddr>) -> Self {
        self.peer = peer;
        self
    }

    pub fn max_line_size(&self) -> usize {
        self.max_line_size
    }

    /// Access the underlying stream
    pub fn get_ref(&self) -> &S {
        self.stream.get_ref()
    }

    fn fail(&mut self, err: TransportError) -> TransportError {
        self.connected = false;
        err
    }
}

#[async_trait]
impl<S> LineTransport for LineStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_line(&mut self, line: Bytes) -> Result<()> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }

        trace!("-> {} bytes", line.len());

        if let Err(e) = self.stream.write_all(&line).await {
            return Err(self.fail(e.into()));
        }
        if let Err(e) = self.stream.flush().await {
            return Err(self.fail(e.into()));
        }

        Ok(())
    }

    async fn recv_line(&mut self) -> Result<Bytes> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }

        let limit = self.max_line_size;
        let mut buf = Vec::with_capacity(limit.min(256));
        let read = (&mut self.stream)
            .take(limit as u64)
            .read_until(LINE_DELIMITER, &mut buf)
            .await;

        match read {
            Ok(0) => {
                debug!("Peer closed the connection");
                Err(self.fail(TransportError::ConnectionClosed))
            }
            Ok(_) if buf.last() == Some(&LINE_DELIMITER) => {
                trace!("<- {} bytes", buf.len());
                Ok(Bytes::from(buf))
            }
            Ok(n) if n >= limit => Err(self.fail(TransportError::FrameTooLarge { max: limit })),
            Ok(_) => {
                // EOF in the middle of a line
                debug!("Connection closed mid-line after {} bytes", buf.len());
                Err(self.fail(TransportError::ConnectionClosed))
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn close(&mut self) -> Result<()> {
        if !self.connected {
            return Ok(());
        }
        self.connected = false;
        self.stream.shutdown().await?;
        Ok(())
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_round_trip_lines() {
        let (client, mut server) = duplex(1024);
        let mut lines = LineStream::new(client);

        server.write_all(b"first\nsecond\n").await.unwrap();

        assert_eq!(&lines.recv_line().await.unwrap()[..], b"first\n");
        assert_eq!(&lines.recv_line().await.unwrap()[..], b"second\n");

        lines.send_line(Bytes::from_static(b"getfps\n")).await.unwrap();
        let mut buf = [0u8; 7];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"getfps\n");
    }

    #[tokio::test]
    async fn test_oversized_line_breaks_the_stream() {
        let (client, mut server) = duplex(1024);
        let mut lines = LineStream::with_max_line_size(client, 8);

        server.write_all(b"0123456789\n").await.unwrap();

        let err = lines.recv_line().await.unwrap_err();
        assert!(matches!(err, TransportError::FrameTooLarge { max: 8 }));
        assert!(!lines.is_connected());
        assert!(matches!(
            lines.recv_line().await,
            Err(TransportError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_line_at_exact_limit() {
        let (client, mut server) = duplex(1024);
        let mut lines = LineStream::with_max_line_size(client, 8);

        server.write_all(b"1234567\n").await.unwrap();
        assert_eq!(&lines.recv_line().await.unwrap()[..], b"1234567\n");
    }

    #[tokio::test]
    async fn test_peer_close() {
        let (client, server) = duplex(64);
        let mut lines = LineStream::new(client);
        drop(server);

        assert!(matches!(
            lines.recv_line().await,
            Err(TransportError::ConnectionClosed)
        ));
        assert!(!lines.is_connected());
    }

    #[tokio::test]
    async fn test_truncated_line_at_eof() {
        let (client, mut server) = duplex(64);
        let mut lines = LineStream::new(client);
        server.write_all(b"partial").await.unwrap();
        drop(server);

        assert!(matches!(
            lines.recv_line().await,
            Err(TransportError::ConnectionClosed)
        ));
    }
}
