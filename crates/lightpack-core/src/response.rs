//! Response line classification
//!
//! Every response line maps to exactly one outcome:
//!
//! ```text
//! "ok"                      -> Response::Success
//! one of the error tokens   -> Err(Error::{AuthenticationRequired, UnknownCommand,
//!                                          NotLocked, Busy, Controller})
//! "<key>:<value>"           -> Response::Value(value)   (split on first ':')
//! any other non-empty line  -> Response::Symbol(token)  (' ' -> '_')
//! ""                        -> Err(Error::EmptyResponse)
//! non UTF-8                 -> Err(Error::InvalidEncoding)
//! ```
//!
//! Oversized frames are rejected by the transport before they get here.

use std::fmt;

use crate::{Error, Result};

/// Literal success token
pub const OK: &str = "ok";

/// Payload the controller uses to acknowledge `lock` / `unlock`
pub const SUCCESS: &str = "success";

/// A classified, non-error response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `ok`
    Success,
    /// Payload of a `<key>:<value>` line
    Value(String),
    /// Any other bare token, spaces normalized to underscores
    Symbol(String),
}

impl Response {
    /// Classify a response line with its delimiter already removed
    pub fn classify(line: &str) -> Result<Self> {
        if line.is_empty() {
            return Err(Error::EmptyResponse);
        }

        if let Some(err) = Error::from_token(line) {
            return Err(err);
        }

        if line == OK {
            return Ok(Response::Success);
        }

        match line.split_once(':') {
            Some((_, value)) => Ok(Response::Value(value.to_string())),
            None => Ok(Response::Symbol(line.replace(' ', "_"))),
        }
    }

    /// Decode a raw frame: strip the trailing delimiter, check encoding,
    /// then classify
    pub fn decode(frame: &[u8]) -> Result<Self> {
        let line = strip_delimiter(frame);
        let line = std::str::from_utf8(line).map_err(|_| Error::InvalidEncoding)?;
        Self::classify(line)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success)
    }

    /// True for `ok` and for a `success` payload or token, which is how
    /// the controller acknowledges `lock` and `unlock`
    pub fn is_acknowledgement(&self) -> bool {
        match self {
            Response::Success => true,
            Response::Value(v) | Response::Symbol(v) => v == SUCCESS,
        }
    }

    /// Borrow the payload of a value or symbol response
    pub fn payload(&self) -> Option<&str> {
        match self {
            Response::Success => None,
            Response::Value(v) | Response::Symbol(v) => Some(v),
        }
    }

    /// Take the payload, failing on a bare `ok`
    pub fn into_payload(self) -> Result<String> {
        match self {
            Response::Success => Err(Error::UnexpectedResponse(
                "expected a value, got ok".to_string(),
            )),
            Response::Value(v) | Response::Symbol(v) => Ok(v),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Success => f.write_str(OK),
            Response::Value(v) => write!(f, "value {:?}", v),
            Response::Symbol(s) => write!(f, "symbol {}", s),
        }
    }
}

/// Remove one trailing `\n` or `\r\n`
pub fn strip_delimiter(frame: &[u8]) -> &[u8] {
    let frame = frame.strip_suffix(b"\n").unwrap_or(frame);
    frame.strip_suffix(b"\r").unwrap_or(frame)
}
