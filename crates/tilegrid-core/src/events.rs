//! Controller event system for status and reading notifications.
//!
//! Rendering is the caller's concern: the controller never touches a UI.
//! Instead it emits a [`ControllerEvent::StatusChanged`] on every connection
//! flag transition so a display layer can re-render from the two booleans.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use tilegrid_types::SensorReading;

/// Events emitted by the controller.
///
/// All events are serializable for logging and IPC.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ControllerEvent {
    /// One of the two connection flags changed.
    StatusChanged {
        /// Tile network connection flag.
        tiles: bool,
        /// Sensor connection flag.
        sensor: bool,
    },
    /// A decoded reading arrived from the sensor transport.
    Reading {
        /// The decoded sample.
        reading: SensorReading,
    },
    /// The sensor transport reports newer firmware.
    FirmwareUpdateAvailable {
        /// Version string as reported by the transport.
        version: String,
    },
    /// The pairing sequence completed and the transport confirmed its tiles.
    TilesPaired {
        /// Number of tiles the transport reports as paired.
        count: usize,
    },
}

/// Sender for controller events.
pub type EventSender = broadcast::Sender<ControllerEvent>;

/// Receiver for controller events.
pub type EventReceiver = broadcast::Receiver<ControllerEvent>;

/// Event dispatcher fanning controller events out to multiple receivers.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: EventSender,
}

impl EventDispatcher {
    /// Create a new event dispatcher with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Send an event.
    pub fn send(&self, event: ControllerEvent) {
        // Ignore error if no receivers
        let _ = self.sender.send(event);
    }

    /// Get the number of active receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatcher_fan_out() {
        let dispatcher = EventDispatcher::new(8);
        let mut rx1 = dispatcher.subscribe();
        let mut rx2 = dispatcher.subscribe();

        dispatcher.send(ControllerEvent::StatusChanged {
            tiles: true,
            sensor: false,
        });

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                ControllerEvent::StatusChanged { tiles, sensor } => {
                    assert!(tiles);
                    assert!(!sensor);
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn test_send_without_receivers_is_ok() {
        let dispatcher = EventDispatcher::new(8);
        dispatcher.send(ControllerEvent::TilesPaired { count: 6 });
        assert_eq!(dispatcher.receiver_count(), 0);
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = ControllerEvent::FirmwareUpdateAvailable {
            version: "2.3.1".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"firmware_update_available\""));
        assert!(json.contains("2.3.1"));
    }
}
