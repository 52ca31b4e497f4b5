//! Error types for the Lightpack protocol

use thiserror::Error;

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Protocol-level errors
///
/// The first five variants are the controller's own rejection tokens and are
/// surfaced verbatim. The rest are raised locally when a line cannot be
/// encoded or classified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `authorization required`: a command was sent before authenticating
    #[error("authorization required")]
    AuthenticationRequired,

    /// `unknown command`: the verb was not recognized
    #[error("unknown command")]
    UnknownCommand,

    /// `not locked`: a mutating command was sent without holding the lock
    #[error("not locked")]
    NotLocked,

    /// `busy`: the lock is held by another session
    #[error("busy")]
    Busy,

    /// `error`: generic failure on the controller side
    #[error("controller reported an error")]
    Controller,

    /// Zero-length response line
    #[error("empty response line")]
    EmptyResponse,

    /// Response line is not valid UTF-8
    #[error("response is not valid UTF-8")]
    InvalidEncoding,

    /// Command could not be encoded as a single line
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// A keyed value whose payload does not match the expected shape
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A well-formed response of the wrong kind for the request
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Map a literal response line to one of the controller's error tokens
    pub fn from_token(line: &str) -> Option<Self> {
        match line {
            tokens::AUTHORIZATION_REQUIRED => Some(Error::AuthenticationRequired),
            tokens::UNKNOWN_COMMAND => Some(Error::UnknownCommand),
            tokens::NOT_LOCKED => Some(Error::NotLocked),
            tokens::BUSY => Some(Error::Busy),
            tokens::ERROR => Some(Error::Controller),
            _ => None,
        }
    }

    /// The wire token for controller rejections, `None` for local errors
    pub fn token(&self) -> Option<&'static str> {
        match self {
            Error::AuthenticationRequired => Some(tokens::AUTHORIZATION_REQUIRED),
            Error::UnknownCommand => Some(tokens::UNKNOWN_COMMAND),
            Error::NotLocked => Some(tokens::NOT_LOCKED),
            Error::Busy => Some(tokens::BUSY),
            Error::Controller => Some(tokens::ERROR),
            _ => None,
        }
    }

    /// True if the controller itself rejected the command
    pub fn is_rejection(&self) -> bool {
        self.token().is_some()
    }
}

/// Literal error tokens sent by the controller
pub mod tokens {
    pub const AUTHORIZATION_REQUIRED: &str = "authorization required";
    pub const UNKNOWN_COMMAND: &str = "unknown command";
    pub const NOT_LOCKED: &str = "not locked";
    pub const BUSY: &str = "busy";
    pub const ERROR: &str = "error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_table_is_closed() {
        for token in [
            tokens::AUTHORIZATION_REQUIRED,
            tokens::UNKNOWN_COMMAND,
            tokens::NOT_LOCKED,
            tokens::BUSY,
            tokens::ERROR,
        ] {
            let err = Error::from_token(token).unwrap();
            assert_eq!(err.token(), Some(token));
            assert!(err.is_rejection());
        }

        assert_eq!(Error::from_token("ok"), None);
        assert_eq!(Error::from_token("Busy"), None);
        assert_eq!(Error::from_token("busy "), None);
    }

    #[test]
    fn test_local_errors_have_no_token() {
        assert!(!Error::EmptyResponse.is_rejection());
        assert!(!Error::MalformedPayload("x".into()).is_rejection());
    }
}
