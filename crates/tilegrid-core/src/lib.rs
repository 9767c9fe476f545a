//! Controller core coordinating a tile network and a serial sensor.
//!
//! This crate orchestrates two injected device transports, a Bluetooth
//! tile-network manager (one master tile, several children) and a serial
//! sensor service streaming decoded readings, behind a single
//! [`Controller`] with a unified connect / pair / disconnect / log / status
//! surface.
//!
//! # Features
//!
//! - **Connection lifecycle**: connect either transport independently; the
//!   two connection flags always reflect the last transport notification
//! - **Child-tile pairing**: the fixed discovery / confirm / activate /
//!   verify script, with configurable timing
//! - **Log fan-out**: synchronous, ordered delivery to registered
//!   subscribers, mirrored to `tracing`
//! - **Palette helpers**: pure temperature/UV color bucketing and
//!   interpolation, independent of any session
//! - **Mock transports**: hardware-free [`mock`] implementations for tests
//!   and simulations
//!
//! The controller owns no protocol: discovery, pairing wire traffic, BLE
//! and serial transport, and reading decode all live behind the
//! [`traits::TileManager`] and [`traits::SensorService`] seams.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tilegrid_core::{Controller, mock::MockProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = Controller::new(Arc::new(MockProvider::new()));
//!     controller.on_log(|entry| println!("[{}] {}", entry.timestamp, entry.message));
//!
//!     controller.connect_tiles().await?;
//!     controller.pair_child_tiles().await?;
//!
//!     controller.connect_sensor().await?;
//!     controller.disconnect().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod logging;
pub mod mock;
pub mod palette;
pub mod traits;

// Core exports
pub use config::{ControllerConfig, PairingConfig};
pub use controller::Controller;
pub use error::{Error, Result};
pub use events::{ControllerEvent, EventDispatcher, EventReceiver, EventSender};
pub use logging::LogFanout;
pub use palette::{interpolate_color, normalize_value, temp_to_color, uv_to_color};
pub use traits::{SensorService, SessionProvider, TileManager};

// Re-export from tilegrid-types
pub use tilegrid_types::{LogEntry, LogLevel, Rgb, SensorReading, SensorStatus, tile_state};
