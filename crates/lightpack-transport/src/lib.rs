//! Lightpack Transport Layer
//!
//! A single bidirectional byte stream to the controller, framed as
//! newline-delimited lines:
//! - [`LineStream`] frames any tokio stream (TCP, in-memory duplex, ...)
//! - [`TcpTransport`] opens the TCP connection and applies socket options

pub mod error;
pub mod line;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
pub use line::LineStream;
pub use tcp::{TcpConfig, TcpLineStream, TcpTransport};
pub use traits::LineTransport;
