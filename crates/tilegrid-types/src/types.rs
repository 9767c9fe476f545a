//! Core value types shared between the controller and transport implementations.

use core::fmt;

use time::OffsetDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw connection-state codes reported by a tile transport.
///
/// These are the codes the underlying tile SDK emits on its state-change
/// notifications. The controller maps [`CONNECTED`](tile_state::CONNECTED) and
/// [`DISCONNECTED`](tile_state::DISCONNECTED) onto its connection flag and
/// ignores every other value.
pub mod tile_state {
    /// Tile network is disconnected.
    pub const DISCONNECTED: u8 = 0;
    /// Tile network is connected and usable.
    pub const CONNECTED: u8 = 2;
}

/// An RGB color with 0-255 channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a color from its three channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A decoded sample from the sensor transport.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorReading {
    /// Ambient temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
    /// UV index.
    pub uv_index: f32,
    /// When the sample was captured, if the transport reports it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub captured_at: Option<OffsetDateTime>,
}

/// Status notifications emitted by a sensor transport.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new notifications
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
#[non_exhaustive]
pub enum SensorStatus {
    /// The sensor link is up and streaming.
    Connected,
    /// The sensor link went down.
    Disconnected,
    /// The transport reports newer firmware for the attached sensor.
    FirmwareUpdateAvailable {
        /// Version string as reported by the transport.
        version: String,
    },
}

impl SensorStatus {
    /// Whether this status means the sensor link is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, SensorStatus::Connected)
    }
}

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogLevel {
    /// Informational progress message.
    Info,
    /// An operation completed successfully.
    Success,
    /// Something unexpected that did not abort the operation.
    Warning,
    /// An operation failed.
    Error,
}

impl LogLevel {
    /// Lowercase tag, matching the serialized form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single log message, created per call and fanned out to subscribers.
///
/// Entries are never stored by the controller; a subscriber that wants
/// history keeps its own.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogEntry {
    /// Local wall-clock time the entry was created, formatted `HH:MM:SS`.
    pub timestamp: String,
    /// The message text.
    pub message: String,
    /// Severity tag.
    pub level: LogLevel,
}
