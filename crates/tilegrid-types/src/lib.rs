//! Platform-agnostic types for the tilegrid controller.
//!
//! This crate provides the shared value types used by the controller core
//! and by transport implementations:
//!
//! - [`Rgb`] colors produced by the palette helpers
//! - [`SensorReading`] decoded sensor samples
//! - [`SensorStatus`] notifications emitted by a sensor transport
//! - [`LogEntry`] / [`LogLevel`] for the synchronous log fan-out
//! - Raw tile state codes reported by a tile transport

pub mod types;

pub use types::{LogEntry, LogLevel, Rgb, SensorReading, SensorStatus, tile_state};
