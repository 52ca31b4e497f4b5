//! Lightpack Core
//!
//! Wire grammar for the Lightpack / Prismatik text control protocol.
//!
//! This crate provides:
//! - Command line encoding ([`Command`], [`verbs`])
//! - Total response classification ([`Response`])
//! - The protocol error taxonomy ([`Error`])
//! - Indexed record lists used by batched payloads ([`Record`])
//! - Domain values ([`Rgb`], [`LedArea`], [`Status`], [`Mode`], [`Attribute`])

pub mod command;
pub mod error;
pub mod records;
pub mod response;
pub mod types;

pub use command::{verbs, Command};
pub use error::{Error, Result};
pub use records::{parse_records, Record};
pub use response::Response;
pub use types::*;

/// Default controller host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default controller port
pub const DEFAULT_PORT: u16 = 3636;

/// Default maximum response line length, delimiter included
pub const DEFAULT_MAX_LINE_SIZE: usize = 8192;

/// Line delimiter
pub const LINE_DELIMITER: u8 = b'\n';

/// Separator between records in a batched payload
pub const RECORD_SEPARATOR: char = ';';
