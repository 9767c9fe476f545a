//! Trait abstractions over the two injected device transports.
//!
//! The controller owns no protocol. Everything device-shaped (discovery,
//! pairing, BLE and serial transport, reading decode) lives behind these
//! traits, implemented by real SDK bindings in production and by the
//! [`mock`](crate::mock) transports in tests and simulations.
//!
//! State notifications are delivered over `tokio::sync::broadcast` channels
//! rather than registered callbacks, so the controller can funnel them all
//! through its single state intake.

use async_trait::async_trait;
use tokio::sync::broadcast;

use tilegrid_types::{SensorReading, SensorStatus};

use crate::error::Result;

/// A session with the tile-network transport.
///
/// One master tile fronts a network of child tiles; the transport does its
/// own auto-pairing once the online-tiles query is issued.
#[async_trait]
pub trait TileManager: Send + Sync {
    /// Connect to the master tile.
    ///
    /// Completion of this call does not imply the network is usable; the
    /// transport reports that through [`state_changes`](Self::state_changes).
    async fn connect(&self) -> Result<()>;

    /// Disconnect from the master tile.
    async fn disconnect(&self) -> Result<()>;

    /// Subscribe to raw connection-state codes.
    ///
    /// Codes follow [`tilegrid_types::tile_state`]: 2 means connected,
    /// 0 disconnected, anything else is transport-internal.
    fn state_changes(&self) -> broadcast::Receiver<u8>;

    /// Query all online tiles. Side effect: triggers the transport's own
    /// auto-pairing of discovered tiles.
    async fn query_online_tiles(&self) -> Result<()>;

    /// Confirm tile assignment for every discovered tile.
    async fn confirm_all_tiles(&self) -> Result<()>;

    /// Send the in-game activation command to a child tile by index.
    async fn activate_tile(&self, index: u8) -> Result<()>;

    /// Query the tiles the transport considers paired.
    async fn query_paired_tiles(&self) -> Result<Vec<u8>>;
}

/// A session with the serial sensor transport.
#[async_trait]
pub trait SensorService: Send + Sync {
    /// Open the serial link and start streaming decoded readings.
    async fn connect_and_stream(&self) -> Result<()>;

    /// Close the serial link.
    async fn disconnect(&self) -> Result<()>;

    /// Subscribe to connection-status and firmware notifications.
    fn status_changes(&self) -> broadcast::Receiver<SensorStatus>;

    /// Subscribe to decoded readings.
    fn readings(&self) -> broadcast::Receiver<SensorReading>;
}

/// Factory supplying the two transports.
///
/// Session construction is injected rather than hard-wired so callers choose
/// the SDK bindings; a provider failure models "module failed to load".
pub trait SessionProvider: Send + Sync {
    /// Construct a tile-manager session.
    fn tile_manager(&self) -> Result<std::sync::Arc<dyn TileManager>>;

    /// Construct a sensor-service session.
    fn sensor_service(&self) -> Result<std::sync::Arc<dyn SensorService>>;
}
