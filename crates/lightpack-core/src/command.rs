//! Command line encoding
//!
//! A command is a single line of the form `<verb>` or `<verb>:<argument>`,
//! terminated by `\n`. Batched setters pack several `;`-terminated records
//! into the argument, e.g. `setcolor:1-255,0,0;2-255,0,0;`.

use std::borrow::Cow;
use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::records::Record;
use crate::{Error, Result, LINE_DELIMITER, RECORD_SEPARATOR};

/// Verb tokens understood by the controller
pub mod verbs {
    pub const API_KEY: &str = "apikey";
    pub const LOCK: &str = "lock";
    pub const UNLOCK: &str = "unlock";

    pub const GET_STATUS: &str = "getstatus";
    pub const GET_API_STATUS: &str = "getstatusapi";
    pub const GET_PROFILES: &str = "getprofiles";
    pub const GET_PROFILE: &str = "getprofile";
    pub const GET_LED_COUNT: &str = "getcountleds";
    pub const GET_LEDS: &str = "getleds";
    pub const GET_COLORS: &str = "getcolors";
    pub const GET_FPS: &str = "getfps";
    pub const GET_SCREEN_SIZE: &str = "getscreensize";
    pub const GET_MODE: &str = "getmode";

    pub const SET_STATUS: &str = "setstatus";
    pub const SET_COLOR: &str = "setcolor";
    pub const SET_LEDS: &str = "setleds";
    pub const NEW_PROFILE: &str = "newprofile";
    pub const DELETE_PROFILE: &str = "deleteprofile";
}

/// An outbound request: a verb plus an optional argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: Cow<'static, str>,
    argument: Option<String>,
}

impl Command {
    /// A bare verb with no argument
    pub fn new(verb: impl Into<Cow<'static, str>>) -> Self {
        Self {
            verb: verb.into(),
            argument: None,
        }
    }

    /// A verb with a `:`-delimited argument
    pub fn with_arg(verb: impl Into<Cow<'static, str>>, argument: impl fmt::Display) -> Self {
        Self {
            verb: verb.into(),
            argument: Some(argument.to_string()),
        }
    }

    /// A batched set: every record is written followed by `;`
    pub fn batch<I>(verb: impl Into<Cow<'static, str>>, records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let mut argument = String::new();
        for record in records {
            argument.push_str(&record.to_string());
            argument.push(RECORD_SEPARATOR);
        }

        Self {
            verb: verb.into(),
            argument: Some(argument),
        }
    }

    /// Parse a raw line typed by a user, e.g. `setstatus:on`
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let command = match line.split_once(':') {
            Some((verb, argument)) => Self::with_arg(verb.to_string(), argument),
            None => Self::new(line.to_string()),
        };
        command.validate()?;
        Ok(command)
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// Check that the command fits on a single line
    pub fn validate(&self) -> Result<()> {
        if self.verb.is_empty() {
            return Err(Error::InvalidCommand("empty verb".into()));
        }

        if let Some(c) = self
            .verb
            .chars()
            .find(|c| *c == ':' || c.is_whitespace() || c.is_control())
        {
            return Err(Error::InvalidCommand(format!(
                "verb {:?} contains {:?}",
                self.verb, c
            )));
        }

        if let Some(arg) = &self.argument {
            if arg.contains(['\n', '\r']) {
                return Err(Error::InvalidCommand(format!(
                    "argument for {} contains a line break",
                    self.verb
                )));
            }
        }

        Ok(())
    }

    /// Encode to a delimited wire line
    pub fn encode(&self) -> Result<Bytes> {
        self.validate()?;

        let arg_len = self.argument.as_ref().map_or(0, |a| a.len() + 1);
        let mut buf = BytesMut::with_capacity(self.verb.len() + arg_len + 1);
        buf.put_slice(self.verb.as_bytes());
        if let Some(arg) = &self.argument {
            buf.put_u8(b':');
            buf.put_slice(arg.as_bytes());
        }
        buf.put_u8(LINE_DELIMITER);

        Ok(buf.freeze())
    }

    /// Loggable form with credentials masked
    pub fn redacted(&self) -> Redacted<'_> {
        Redacted(self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(arg) => write!(f, "{}:{}", self.verb, arg),
            None => f.write_str(&self.verb),
        }
    }
}

/// Display adapter that hides the argument of `apikey`
pub struct Redacted<'a>(&'a Command);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.verb == verbs::API_KEY && self.0.argument.is_some() {
            write!(f, "{}:***", self.0.verb)
        } else {
            fmt::Display::fmt(self.0, f)
        }
    }
}
