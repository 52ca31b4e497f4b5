//! Client error types

use lightpack_transport::TransportError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Socket could not be opened
    #[error("connection failed: {0}")]
    Connect(TransportError),

    /// Welcome line missing or unreadable
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Credential exchange did not end in `ok`
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("not connected")]
    NotConnected,

    #[error("already connected")]
    AlreadyConnected,

    /// Controller rejection or unclassifiable response
    #[error("protocol error: {0}")]
    Protocol(#[from] lightpack_core::Error),

    /// I/O failure on an established session; the session is now closed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// The protocol error kind, if this is one
    pub fn protocol(&self) -> Option<&lightpack_core::Error> {
        match self {
            ClientError::Protocol(e) => Some(e),
            _ => None,
        }
    }

    /// True if the controller answered with one of its error tokens
    pub fn is_rejection(&self) -> bool {
        self.protocol().map_or(false, |e| e.is_rejection())
    }
}
