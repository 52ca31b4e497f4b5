//! Domain value types carried by command payloads

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::records::{parse_int_list, Record};
use crate::{Error, Result};

/// Offset between zero-based API indices and one-based wire LED numbers
const LED_NUMBER_BASE: usize = 1;

/// Wire LED number for a zero-based index
pub fn led_number(index: usize) -> usize {
    index + LED_NUMBER_BASE
}

/// An RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        let [r, g, b] = record.fixed::<3>()?;
        Ok(Self {
            r: channel(r)?,
            g: channel(g)?,
            b: channel(b)?,
        })
    }

    /// Record for LED `index` (zero-based)
    pub fn to_record(self, index: usize) -> Record {
        Record::new(
            led_number(index),
            [self.r as i64, self.g as i64, self.b as i64],
        )
    }
}

fn channel(v: i64) -> Result<u8> {
    u8::try_from(v).map_err(|_| Error::MalformedPayload(format!("colour channel {} out of range", v)))
}

/// Screen capture rectangle for one LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LedArea {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl LedArea {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        let [x, y, width, height] = record.fixed::<4>()?;
        Ok(Self {
            x: coord(x)?,
            y: coord(y)?,
            width: coord(width)?,
            height: coord(height)?,
        })
    }

    /// Record for LED `index` (zero-based)
    pub fn to_record(self, index: usize) -> Record {
        Record::new(
            led_number(index),
            [
                self.x as i64,
                self.y as i64,
                self.width as i64,
                self.height as i64,
            ],
        )
    }
}

fn coord(v: i64) -> Result<i32> {
    i32::try_from(v).map_err(|_| Error::MalformedPayload(format!("coordinate {} out of range", v)))
}

/// Geometry of the captured screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FromStr for ScreenRect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let values = parse_int_list(s)?;
        let [x, y, width, height] = <[i64; 4]>::try_from(values.as_slice())
            .map_err(|_| Error::MalformedPayload(format!("screen size {:?}", s)))?;

        Ok(Self {
            x: coord(x)?,
            y: coord(y)?,
            width: coord(width)?,
            height: coord(height)?,
        })
    }
}

/// Backlight power state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    On,
    Off,
    DeviceError,
    Unknown(String),
}

impl Status {
    /// Parse a status word; spaces and underscores are equivalent
    pub fn parse(s: &str) -> Self {
        match s.replace(' ', "_").as_str() {
            "on" => Status::On,
            "off" => Status::Off,
            "device_error" => Status::DeviceError,
            other => Status::Unknown(other.to_string()),
        }
    }

    /// Wire argument for `setstatus`
    pub fn as_arg(on: bool) -> &'static str {
        if on {
            "on"
        } else {
            "off"
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::On => f.write_str("on"),
            Status::Off => f.write_str("off"),
            Status::DeviceError => f.write_str("device_error"),
            Status::Unknown(s) => f.write_str(s),
        }
    }
}

/// Whether another client currently holds the API lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    Busy,
    Idle,
    Other(String),
}

impl ApiStatus {
    pub fn parse(s: &str) -> Self {
        match s.replace(' ', "_").as_str() {
            "busy" => ApiStatus::Busy,
            "idle" => ApiStatus::Idle,
            other => ApiStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiStatus::Busy => f.write_str("busy"),
            ApiStatus::Idle => f.write_str("idle"),
            ApiStatus::Other(s) => f.write_str(s),
        }
    }
}

/// Capture mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Ambilight,
    Moodlamp,
    Other(String),
}

impl Mode {
    pub fn parse(s: &str) -> Self {
        match s {
            "ambilight" => Mode::Ambilight,
            "moodlamp" => Mode::Moodlamp,
            other => Mode::Other(other.to_string()),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s.contains([':', '\n', '\r']) {
            return Err(Error::InvalidCommand(format!("mode {:?}", s)));
        }
        Ok(Mode::parse(s))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Ambilight => f.write_str("ambilight"),
            Mode::Moodlamp => f.write_str("moodlamp"),
            Mode::Other(s) => f.write_str(s),
        }
    }
}

/// Settable scalar attributes; each maps to a `set<name>` verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Mode,
    Gamma,
    Brightness,
    Smooth,
    Profile,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Mode,
        Attribute::Gamma,
        Attribute::Brightness,
        Attribute::Smooth,
        Attribute::Profile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Mode => "mode",
            Attribute::Gamma => "gamma",
            Attribute::Brightness => "brightness",
            Attribute::Smooth => "smooth",
            Attribute::Profile => "profile",
        }
    }

    /// Setter verb, e.g. `setgamma`
    pub fn verb(self) -> &'static str {
        match self {
            Attribute::Mode => "setmode",
            Attribute::Gamma => "setgamma",
            Attribute::Brightness => "setbrightness",
            Attribute::Smooth => "setsmooth",
            Attribute::Profile => "setprofile",
        }
    }
}

impl FromStr for Attribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Attribute::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| Error::InvalidCommand(format!("unknown attribute {:?}", s)))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
