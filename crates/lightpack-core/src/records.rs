//! Indexed record lists
//!
//! Several payloads are lists of `<index>-<v1>,<v2>,...` records separated by
//! `;`, for example `getleds` answers `1-0,0,100,50;2-100,0,100,50`. The same
//! shape is used for the argument of batched setters.

use std::fmt;

use crate::{Error, Result, RECORD_SEPARATOR};

/// One `<index>-<values>` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// One-based LED number as it appears on the wire
    pub index: usize,
    pub values: Vec<i64>,
}

impl Record {
    pub fn new(index: usize, values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            index,
            values: values.into_iter().collect(),
        }
    }

    /// Parse a single record
    pub fn parse(text: &str) -> Result<Self> {
        let (index, values) = text
            .split_once('-')
            .ok_or_else(|| Error::MalformedPayload(format!("record {:?} has no index", text)))?;

        let index = index
            .trim()
            .parse()
            .map_err(|_| Error::MalformedPayload(format!("bad record index {:?}", index)))?;

        Ok(Self {
            index,
            values: parse_int_list(values)?,
        })
    }

    /// Take exactly `N` values, failing on any other arity
    pub fn fixed<const N: usize>(&self) -> Result<[i64; N]> {
        <[i64; N]>::try_from(self.values.as_slice()).map_err(|_| {
            Error::MalformedPayload(format!(
                "record {} has {} values, expected {}",
                self.index,
                self.values.len(),
                N
            ))
        })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-", self.index)?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

/// Parse a `;`-separated record list, ignoring empty entries
pub fn parse_records(payload: &str) -> Result<Vec<Record>> {
    split_list(payload).map(Record::parse).collect()
}

/// Parse a `,`-separated list of integers
pub fn parse_int_list(text: &str) -> Result<Vec<i64>> {
    text.split(',')
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| Error::MalformedPayload(format!("bad integer {:?}", v)))
        })
        .collect()
}

/// Split a `;`-separated list, dropping empty entries (the controller
/// terminates lists with a trailing `;`)
pub fn split_list(payload: &str) -> impl Iterator<Item = &str> {
    payload.split(RECORD_SEPARATOR).filter(|s| !s.is_empty())
}
