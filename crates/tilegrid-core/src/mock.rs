//! Mock transports for testing and simulation.
//!
//! These implement the [`TileManager`] and [`SensorService`] traits without
//! any hardware. Test controls let a test emit state codes, push readings,
//! inject failures per operation, and inspect which commands were issued in
//! what order.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use tilegrid_types::{SensorReading, SensorStatus, tile_state};

use crate::error::{Error, Result};
use crate::traits::{SensorService, SessionProvider, TileManager};

/// Operations of the mock tile manager that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOp {
    /// The initial connect call.
    Connect,
    /// The teardown call.
    Disconnect,
    /// The online-tiles query.
    QueryOnline,
    /// The confirm-assignment command.
    ConfirmAll,
    /// The per-index activation command.
    Activate,
    /// The paired-tiles query.
    QueryPaired,
}

/// A mock tile-network session.
pub struct MockTileManager {
    state_tx: broadcast::Sender<u8>,
    connect_count: AtomicU32,
    query_online_count: AtomicU32,
    confirm_count: AtomicU32,
    query_paired_count: AtomicU32,
    activations: Mutex<Vec<u8>>,
    paired: Mutex<Vec<u8>>,
    failing_op: Mutex<Option<TileOp>>,
    /// Emit a connected state code automatically when `connect` succeeds.
    auto_report_connected: AtomicBool,
    command_latency_ms: AtomicU32,
}

impl std::fmt::Debug for MockTileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTileManager")
            .field("connects", &self.connect_count.load(Ordering::Relaxed))
            .field("activations", &self.activations.lock().unwrap().len())
            .finish()
    }
}

impl Default for MockTileManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTileManager {
    /// Create a mock with no recorded commands and auto-reporting enabled.
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(32);
        Self {
            state_tx,
            connect_count: AtomicU32::new(0),
            query_online_count: AtomicU32::new(0),
            confirm_count: AtomicU32::new(0),
            query_paired_count: AtomicU32::new(0),
            activations: Mutex::new(Vec::new()),
            paired: Mutex::new((1..=6).collect()),
            failing_op: Mutex::new(None),
            auto_report_connected: AtomicBool::new(true),
            command_latency_ms: AtomicU32::new(0),
        }
    }

    // --- Test control methods ---

    /// Emit a raw state code to every subscriber.
    pub fn emit_state(&self, code: u8) {
        let _ = self.state_tx.send(code);
    }

    /// Make the named operation fail until cleared.
    pub fn fail_on(&self, op: TileOp) {
        *self.failing_op.lock().unwrap() = Some(op);
    }

    /// Clear any injected failure.
    pub fn clear_failure(&self) {
        *self.failing_op.lock().unwrap() = None;
    }

    /// Disable the automatic connected state report after `connect`.
    pub fn set_auto_report_connected(&self, auto: bool) {
        self.auto_report_connected.store(auto, Ordering::Relaxed);
    }

    /// Set the tiles reported by `query_paired_tiles`.
    pub fn set_paired(&self, tiles: Vec<u8>) {
        *self.paired.lock().unwrap() = tiles;
    }

    /// Delay every command by this duration, simulating a slow transport.
    pub fn set_command_latency(&self, latency: Duration) {
        self.command_latency_ms
            .store(latency.as_millis() as u32, Ordering::Relaxed);
    }

    /// Number of connect calls.
    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::Relaxed)
    }

    /// Number of online-tiles queries.
    pub fn query_online_count(&self) -> u32 {
        self.query_online_count.load(Ordering::Relaxed)
    }

    /// Number of confirm-assignment commands.
    pub fn confirm_count(&self) -> u32 {
        self.confirm_count.load(Ordering::Relaxed)
    }

    /// Number of paired-tiles queries.
    pub fn query_paired_count(&self) -> u32 {
        self.query_paired_count.load(Ordering::Relaxed)
    }

    /// Activation commands in the order they were issued.
    pub fn activations(&self) -> Vec<u8> {
        self.activations.lock().unwrap().clone()
    }

    /// Total device commands issued so far, across all operations.
    pub fn command_count(&self) -> u32 {
        self.query_online_count()
            + self.confirm_count()
            + self.query_paired_count()
            + self.activations.lock().unwrap().len() as u32
    }

    async fn run_op(&self, op: TileOp, name: &str) -> Result<()> {
        let latency = self.command_latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(u64::from(latency))).await;
        }
        if *self.failing_op.lock().unwrap() == Some(op) {
            return Err(Error::session(name, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl TileManager for MockTileManager {
    async fn connect(&self) -> Result<()> {
        self.run_op(TileOp::Connect, "connect").await?;
        self.connect_count.fetch_add(1, Ordering::Relaxed);
        if self.auto_report_connected.load(Ordering::Relaxed) {
            self.emit_state(tile_state::CONNECTED);
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.run_op(TileOp::Disconnect, "disconnect").await?;
        self.emit_state(tile_state::DISCONNECTED);
        Ok(())
    }

    fn state_changes(&self) -> broadcast::Receiver<u8> {
        self.state_tx.subscribe()
    }

    async fn query_online_tiles(&self) -> Result<()> {
        self.run_op(TileOp::QueryOnline, "query_online_tiles").await?;
        self.query_online_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn confirm_all_tiles(&self) -> Result<()> {
        self.run_op(TileOp::ConfirmAll, "confirm_all_tiles").await?;
        self.confirm_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn activate_tile(&self, index: u8) -> Result<()> {
        self.run_op(TileOp::Activate, "activate_tile").await?;
        self.activations.lock().unwrap().push(index);
        Ok(())
    }

    async fn query_paired_tiles(&self) -> Result<Vec<u8>> {
        self.run_op(TileOp::QueryPaired, "query_paired_tiles").await?;
        self.query_paired_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.paired.lock().unwrap().clone())
    }
}

/// A mock serial sensor session.
pub struct MockSensorService {
    status_tx: broadcast::Sender<SensorStatus>,
    reading_tx: broadcast::Sender<SensorReading>,
    should_fail_connect: AtomicBool,
    should_fail_disconnect: AtomicBool,
    connect_count: AtomicU32,
}

impl std::fmt::Debug for MockSensorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSensorService")
            .field("connects", &self.connect_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockSensorService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSensorService {
    /// Create a mock sensor session.
    pub fn new() -> Self {
        let (status_tx, _) = broadcast::channel(32);
        let (reading_tx, _) = broadcast::channel(32);
        Self {
            status_tx,
            reading_tx,
            should_fail_connect: AtomicBool::new(false),
            should_fail_disconnect: AtomicBool::new(false),
            connect_count: AtomicU32::new(0),
        }
    }

    // --- Test control methods ---

    /// Make `connect_and_stream` fail.
    pub fn set_should_fail_connect(&self, fail: bool) {
        self.should_fail_connect.store(fail, Ordering::Relaxed);
    }

    /// Make `disconnect` fail.
    pub fn set_should_fail_disconnect(&self, fail: bool) {
        self.should_fail_disconnect.store(fail, Ordering::Relaxed);
    }

    /// Emit a status notification to every subscriber.
    pub fn emit_status(&self, status: SensorStatus) {
        let _ = self.status_tx.send(status);
    }

    /// Push a decoded reading to every subscriber.
    pub fn push_reading(&self, reading: SensorReading) {
        let _ = self.reading_tx.send(reading);
    }

    /// Number of connect calls.
    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SensorService for MockSensorService {
    async fn connect_and_stream(&self) -> Result<()> {
        if self.should_fail_connect.load(Ordering::Relaxed) {
            return Err(Error::session("connect_and_stream", "injected failure"));
        }
        self.connect_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if self.should_fail_disconnect.load(Ordering::Relaxed) {
            return Err(Error::session("disconnect", "injected failure"));
        }
        self.emit_status(SensorStatus::Disconnected);
        Ok(())
    }

    fn status_changes(&self) -> broadcast::Receiver<SensorStatus> {
        self.status_tx.subscribe()
    }

    fn readings(&self) -> broadcast::Receiver<SensorReading> {
        self.reading_tx.subscribe()
    }
}

/// A provider handing out shared mock sessions.
///
/// Holding `Arc`s to the same mocks the provider hands out lets a test
/// drive the transports the controller is using.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    tiles: Option<Arc<MockTileManager>>,
    sensor: Option<Arc<MockSensorService>>,
}

impl MockProvider {
    /// A provider with both transports available.
    pub fn new() -> Self {
        Self {
            tiles: Some(Arc::new(MockTileManager::new())),
            sensor: Some(Arc::new(MockSensorService::new())),
        }
    }

    /// A provider that fails every request, simulating unloadable modules.
    pub fn unavailable() -> Self {
        Self {
            tiles: None,
            sensor: None,
        }
    }

    /// The shared tile mock, if available.
    pub fn tiles(&self) -> Option<Arc<MockTileManager>> {
        self.tiles.clone()
    }

    /// The shared sensor mock, if available.
    pub fn sensor(&self) -> Option<Arc<MockSensorService>> {
        self.sensor.clone()
    }
}

impl SessionProvider for MockProvider {
    fn tile_manager(&self) -> Result<Arc<dyn TileManager>> {
        self.tiles
            .clone()
            .map(|m| m as Arc<dyn TileManager>)
            .ok_or_else(|| Error::module_unavailable("tile manager module failed to load"))
    }

    fn sensor_service(&self) -> Result<Arc<dyn SensorService>> {
        self.sensor
            .clone()
            .map(|s| s as Arc<dyn SensorService>)
            .ok_or_else(|| Error::module_unavailable("sensor module failed to load"))
    }
}
