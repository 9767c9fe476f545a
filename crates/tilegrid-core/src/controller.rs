//! The controller coordinating a tile network and a serial sensor.
//!
//! One `Controller` holds at most one active tile session and one active
//! sensor session. Both transports notify asynchronously; every notification
//! is funneled through a single state intake task which is the only writer
//! of the two connection flags, so the flags always reflect the last
//! notification received from the corresponding transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::time::{interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use tilegrid_types::{LogEntry, LogLevel, SensorReading, SensorStatus, tile_state};

use crate::config::{ControllerConfig, PairingConfig};
use crate::error::{Error, Result};
use crate::events::{ControllerEvent, EventDispatcher, EventReceiver};
use crate::logging::LogFanout;
use crate::traits::{SensorService, SessionProvider, TileManager};

/// Registered sensor-data subscriber.
type ReadingSink = Box<dyn Fn(&SensorReading) + Send + Sync>;

/// State updates posted to the single intake task.
enum StateUpdate {
    /// Tile network flag changed (mapped from raw state codes).
    Tiles(bool),
    /// Sensor flag changed.
    Sensor(bool),
    /// Re-emit the current flags without changing them.
    Refresh,
}

/// An active tile session together with the token gating its forwarder.
///
/// Cancelling the token stops the forwarder, so a replaced session can no
/// longer flip the connection flag.
struct TileSession {
    manager: Arc<dyn TileManager>,
    token: CancellationToken,
}

/// An active sensor session; the token gates both its forwarders.
struct SensorSession {
    service: Arc<dyn SensorService>,
    token: CancellationToken,
}

/// State shared with the intake and forwarder tasks.
struct Shared {
    tiles_connected: AtomicBool,
    sensor_connected: AtomicBool,
    last_reading: std::sync::RwLock<Option<SensorReading>>,
    reading_sink: std::sync::RwLock<Option<ReadingSink>>,
    log: LogFanout,
    events: EventDispatcher,
}

impl Shared {
    fn emit_status(&self) {
        self.events.send(ControllerEvent::StatusChanged {
            tiles: self.tiles_connected.load(Ordering::Relaxed),
            sensor: self.sensor_connected.load(Ordering::Relaxed),
        });
    }

    /// Single-writer application of a state update.
    fn apply(&self, update: StateUpdate) {
        match update {
            StateUpdate::Tiles(connected) => {
                let was = self.tiles_connected.swap(connected, Ordering::Relaxed);
                if was != connected {
                    if connected {
                        self.log.log(LogLevel::Success, "Tile network connected");
                    } else {
                        self.log.log(LogLevel::Warning, "Tile network disconnected");
                    }
                }
                self.emit_status();
            }
            StateUpdate::Sensor(connected) => {
                let was = self.sensor_connected.swap(connected, Ordering::Relaxed);
                if was != connected && !connected {
                    self.log.log(LogLevel::Warning, "Sensor disconnected");
                }
                self.emit_status();
            }
            StateUpdate::Refresh => self.emit_status(),
        }
    }

    fn store_reading(&self, reading: SensorReading) {
        if let Ok(mut last) = self.last_reading.write() {
            *last = Some(reading);
        }
        if let Ok(sink) = self.reading_sink.read()
            && let Some(sink) = sink.as_ref()
        {
            sink(&reading);
        }
        self.events.send(ControllerEvent::Reading { reading });
    }
}

/// Orchestrates the tile-network and sensor sessions.
///
/// Must be created inside a Tokio runtime; construction spawns the state
/// intake task. Dropping the controller cancels the intake and all
/// notification forwarders.
pub struct Controller {
    provider: Arc<dyn SessionProvider>,
    config: ControllerConfig,
    shared: Arc<Shared>,
    tiles: Mutex<Option<TileSession>>,
    sensor: Mutex<Option<SensorSession>>,
    intake_tx: mpsc::Sender<StateUpdate>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("tiles_connected", &self.tiles_connected())
            .field("sensor_connected", &self.sensor_connected())
            .finish()
    }
}

impl Controller {
    /// Create a controller with default configuration.
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self::with_config(provider, ControllerConfig::default())
    }

    /// Create a controller with custom configuration.
    pub fn with_config(provider: Arc<dyn SessionProvider>, config: ControllerConfig) -> Self {
        let shared = Arc::new(Shared {
            tiles_connected: AtomicBool::new(false),
            sensor_connected: AtomicBool::new(false),
            last_reading: std::sync::RwLock::new(None),
            reading_sink: std::sync::RwLock::new(None),
            log: LogFanout::new(),
            events: EventDispatcher::new(config.event_capacity),
        });

        let (intake_tx, intake_rx) = mpsc::channel(64);
        let shutdown = CancellationToken::new();
        Self::spawn_intake(Arc::clone(&shared), intake_rx, shutdown.clone());

        Self {
            provider,
            config,
            shared,
            tiles: Mutex::new(None),
            sensor: Mutex::new(None),
            intake_tx,
            shutdown,
        }
    }

    fn spawn_intake(
        shared: Arc<Shared>,
        mut rx: mpsc::Receiver<StateUpdate>,
        token: CancellationToken,
    ) {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    update = rx.recv() => {
                        let Some(update) = update else { break };
                        shared.apply(update);
                    }
                }
            }
        });
    }

    // --- Connection lifecycle ---

    /// Connect the tile network.
    ///
    /// Obtains a tile manager from the provider, routes its state
    /// notifications through the intake, then connects. Returns the manager
    /// handle on success. Failures are logged and propagated; an `Err`
    /// means "not connected". A repeated call replaces the stored session
    /// and stops the previous session's forwarder.
    pub async fn connect_tiles(&self) -> Result<Arc<dyn TileManager>> {
        self.log(LogLevel::Info, "Connecting to tile network...");

        let manager = self.provider.tile_manager().inspect_err(|e| {
            self.log(LogLevel::Error, format!("Tile module load failed: {e}"));
        })?;

        let session_token = self.shutdown.child_token();
        self.spawn_tile_forwarder(manager.state_changes(), session_token.clone());

        if let Err(e) = manager.connect().await {
            session_token.cancel();
            self.log(
                LogLevel::Error,
                format!("Tile network connection failed: {e}"),
            );
            return Err(e);
        }

        let previous = self.tiles.lock().await.replace(TileSession {
            manager: Arc::clone(&manager),
            token: session_token,
        });
        if let Some(previous) = previous {
            previous.token.cancel();
        }
        Ok(manager)
    }

    /// Connect the sensor and start streaming.
    ///
    /// Registers the status, firmware and reading hooks before the combined
    /// connect-and-stream call. On success flags the sensor connected and
    /// logs; on failure logs and propagates.
    pub async fn connect_sensor(&self) -> Result<()> {
        self.log(LogLevel::Info, "Connecting to sensor...");

        let service = self.provider.sensor_service().inspect_err(|e| {
            self.log(LogLevel::Error, format!("Sensor module load failed: {e}"));
        })?;

        let session_token = self.shutdown.child_token();
        self.spawn_sensor_status_forwarder(service.status_changes(), session_token.clone());
        self.spawn_reading_forwarder(service.readings(), session_token.clone());

        if let Err(e) = service.connect_and_stream().await {
            session_token.cancel();
            self.log(LogLevel::Error, format!("Sensor connection failed: {e}"));
            return Err(e);
        }

        let previous = self.sensor.lock().await.replace(SensorSession {
            service,
            token: session_token,
        });
        if let Some(previous) = previous {
            previous.token.cancel();
        }
        let _ = self.intake_tx.send(StateUpdate::Sensor(true)).await;
        self.log(LogLevel::Success, "Sensor connected and streaming");
        Ok(())
    }

    /// Run the child-tile pairing sequence.
    ///
    /// A strictly sequential script: query online tiles (which triggers the
    /// transport's auto-pairing), wait out the discovery window with a
    /// cosmetic countdown, confirm assignment, activate each child tile in
    /// order, then query paired tiles for confirmation. Preconditions fail
    /// fast before any device command; any step error aborts the rest and
    /// propagates after logging. Already-issued commands are not rolled
    /// back.
    pub async fn pair_child_tiles(&self) -> Result<()> {
        let pairing = &self.config.pairing;
        pairing.validate()?;

        let manager = self
            .tiles
            .lock()
            .await
            .as_ref()
            .map(|session| Arc::clone(&session.manager))
            .ok_or(Error::NoTileManager)
            .inspect_err(|e| self.log(LogLevel::Error, format!("Cannot pair: {e}")))?;

        if !self.tiles_connected() {
            let err = Error::TilesNotConnected;
            self.log(LogLevel::Error, format!("Cannot pair: {err}"));
            return Err(err);
        }

        self.log(LogLevel::Info, "Querying online tiles...");
        manager.query_online_tiles().await.inspect_err(|e| {
            self.log(LogLevel::Error, format!("Online-tiles query failed: {e}"));
        })?;

        self.discovery_countdown(pairing).await;

        self.log(LogLevel::Info, "Confirming tile assignment...");
        manager.confirm_all_tiles().await.inspect_err(|e| {
            self.log(LogLevel::Error, format!("Tile confirmation failed: {e}"));
        })?;
        sleep(pairing.confirm_settle).await;

        for index in pairing.child_tiles.clone() {
            self.log(LogLevel::Info, format!("Activating tile {index}..."));
            manager.activate_tile(index).await.inspect_err(|e| {
                self.log(
                    LogLevel::Error,
                    format!("Activation of tile {index} failed: {e}"),
                );
            })?;
            sleep(pairing.activation_gap).await;
        }

        sleep(pairing.verify_delay).await;
        let paired = manager.query_paired_tiles().await.inspect_err(|e| {
            self.log(LogLevel::Error, format!("Paired-tiles query failed: {e}"));
        })?;

        self.shared.events.send(ControllerEvent::TilesPaired {
            count: paired.len(),
        });
        self.log(
            LogLevel::Success,
            format!("Pairing sequence complete, {} tiles paired", paired.len()),
        );
        Ok(())
    }

    /// Wait out the discovery window while logging a countdown tick.
    ///
    /// The wait and the tick are two independent timers run concurrently;
    /// both must elapse before the sequence continues. The tick is cosmetic
    /// only and carries no ordering guarantee with respect to the
    /// transport's actual pairing progress.
    async fn discovery_countdown(&self, pairing: &PairingConfig) {
        let tick_ms = pairing.countdown_tick.as_millis().max(1);
        let ticks = (pairing.discovery_wait.as_millis() / tick_ms) as u32;

        let wait = sleep(pairing.discovery_wait);
        let countdown = async {
            let mut timer = interval(pairing.countdown_tick);
            timer.tick().await; // first tick completes immediately
            for elapsed in 1..=ticks {
                timer.tick().await;
                let remaining = pairing.countdown_tick * (ticks - elapsed);
                self.log(
                    LogLevel::Info,
                    format!("Tile discovery in progress, {remaining:?} remaining"),
                );
            }
        };
        tokio::join!(wait, countdown);
    }

    /// Best-effort teardown of both sessions.
    ///
    /// Each subsystem is torn down only if both its handle and its
    /// connected flag are set, and independently of the other: one
    /// subsystem's teardown failure is logged and cannot block the other's.
    /// Always refreshes the status and logs completion.
    pub async fn disconnect(&self) {
        let tile_session = {
            let mut tiles = self.tiles.lock().await;
            if self.tiles_connected() { tiles.take() } else { None }
        };
        if let Some(session) = tile_session {
            if let Err(e) = session.manager.disconnect().await {
                self.log(
                    LogLevel::Warning,
                    format!("Tile network teardown failed: {e}"),
                );
            }
            session.token.cancel();
            let _ = self.intake_tx.send(StateUpdate::Tiles(false)).await;
        }

        let sensor_session = {
            let mut sensor = self.sensor.lock().await;
            if self.sensor_connected() { sensor.take() } else { None }
        };
        if let Some(session) = sensor_session {
            if let Err(e) = session.service.disconnect().await {
                self.log(LogLevel::Warning, format!("Sensor teardown failed: {e}"));
            }
            session.token.cancel();
            let _ = self.intake_tx.send(StateUpdate::Sensor(false)).await;
        }

        let _ = self.intake_tx.send(StateUpdate::Refresh).await;
        self.log(LogLevel::Info, "Disconnect complete");
    }

    // --- Status, logging, subscriptions ---

    /// Whether the tile network is connected, per the last transport
    /// notification.
    pub fn tiles_connected(&self) -> bool {
        self.shared.tiles_connected.load(Ordering::Relaxed)
    }

    /// Whether the sensor is connected.
    pub fn sensor_connected(&self) -> bool {
        self.shared.sensor_connected.load(Ordering::Relaxed)
    }

    /// The most recently received sensor reading, if any.
    pub fn last_reading(&self) -> Option<SensorReading> {
        self.shared.last_reading.read().ok().and_then(|r| *r)
    }

    /// Subscribe to controller events.
    pub fn subscribe_events(&self) -> EventReceiver {
        self.shared.events.subscribe()
    }

    /// Register a log subscriber. Subscribers are invoked synchronously in
    /// registration order and cannot be removed.
    pub fn on_log<F>(&self, callback: F)
    where
        F: Fn(&LogEntry) + Send + Sync + 'static,
    {
        self.shared.log.subscribe(callback);
    }

    /// Register the external sensor-data subscriber, replacing any previous
    /// one.
    pub fn on_reading<F>(&self, callback: F)
    where
        F: Fn(&SensorReading) + Send + Sync + 'static,
    {
        if let Ok(mut sink) = self.shared.reading_sink.write() {
            *sink = Some(Box::new(callback));
        }
    }

    /// Emit a log entry through the fan-out.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.shared.log.log(level, message);
    }

    // --- Notification forwarders ---

    fn spawn_tile_forwarder(&self, mut rx: broadcast::Receiver<u8>, token: CancellationToken) {
        let tx = self.intake_tx.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    code = rx.recv() => match code {
                        Ok(tile_state::CONNECTED) => {
                            let _ = tx.send(StateUpdate::Tiles(true)).await;
                        }
                        Ok(tile_state::DISCONNECTED) => {
                            let _ = tx.send(StateUpdate::Tiles(false)).await;
                        }
                        Ok(code) => debug!(code, "ignoring tile state code"),
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
    }

    fn spawn_sensor_status_forwarder(
        &self,
        mut rx: broadcast::Receiver<SensorStatus>,
        token: CancellationToken,
    ) {
        let tx = self.intake_tx.clone();
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    status = rx.recv() => match status {
                        Ok(SensorStatus::Connected) => {
                            let _ = tx.send(StateUpdate::Sensor(true)).await;
                        }
                        Ok(SensorStatus::Disconnected) => {
                            let _ = tx.send(StateUpdate::Sensor(false)).await;
                        }
                        Ok(SensorStatus::FirmwareUpdateAvailable { version }) => {
                            shared.log.log(
                                LogLevel::Warning,
                                format!("Sensor firmware update available: {version}"),
                            );
                            shared
                                .events
                                .send(ControllerEvent::FirmwareUpdateAvailable { version });
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
    }

    fn spawn_reading_forwarder(
        &self,
        mut rx: broadcast::Receiver<SensorReading>,
        token: CancellationToken,
    ) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    reading = rx.recv() => match reading {
                        Ok(reading) => shared.store_reading(reading),
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
