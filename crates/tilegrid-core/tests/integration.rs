//! End-to-end scenarios for tilegrid-core.
//!
//! These run entirely against the mock transports; no hardware is needed.
//! `cargo test --package tilegrid-core --test integration`

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::sleep;

use tilegrid_core::mock::MockProvider;
use tilegrid_core::{
    Controller, ControllerConfig, ControllerEvent, LogLevel, PairingConfig, SensorReading,
    tile_state,
};

fn fast_controller(provider: &MockProvider) -> Controller {
    Controller::with_config(
        Arc::new(provider.clone()),
        ControllerConfig {
            pairing: PairingConfig::fast(),
            ..Default::default()
        },
    )
}

/// Let the intake and forwarder tasks drain.
async fn settle() {
    sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn log_fan_out_reaches_both_subscribers_with_matching_entries() {
    let controller = fast_controller(&MockProvider::new());

    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));
    for seen in [&first, &second] {
        let seen = Arc::clone(seen);
        controller.on_log(move |entry| seen.lock().unwrap().push(entry.clone()));
    }

    controller.log(LogLevel::Info, "hello");

    for seen in [&first, &second] {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].message, "hello");
        assert_eq!(seen[0].level, LogLevel::Info);
        assert!(!seen[0].timestamp.is_empty());
        assert_eq!(seen[0].timestamp.len(), 8); // HH:MM:SS
    }
}

#[tokio::test]
async fn tile_state_codes_drive_flag_and_exactly_two_status_updates() {
    let provider = MockProvider::new();
    let tiles = provider.tiles().unwrap();
    tiles.set_auto_report_connected(false);
    let controller = fast_controller(&provider);

    controller.connect_tiles().await.unwrap();
    settle().await;
    assert!(!controller.tiles_connected());

    let mut events = controller.subscribe_events();

    tiles.emit_state(tile_state::CONNECTED);
    settle().await;
    assert!(controller.tiles_connected());

    tiles.emit_state(tile_state::DISCONNECTED);
    settle().await;
    assert!(!controller.tiles_connected());

    let mut status_updates = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ControllerEvent::StatusChanged { tiles, .. } = event {
            status_updates.push(tiles);
        }
    }
    assert_eq!(status_updates, vec![true, false]);
}

#[tokio::test]
async fn full_session_connect_pair_stream_disconnect() {
    let provider = MockProvider::new();
    let tiles = provider.tiles().unwrap();
    let sensor = provider.sensor().unwrap();
    let controller = fast_controller(&provider);

    let log = Arc::new(Mutex::new(Vec::new()));
    {
        let log = Arc::clone(&log);
        controller.on_log(move |entry| log.lock().unwrap().push(entry.message.clone()));
    }

    controller.connect_tiles().await.unwrap();
    controller.connect_sensor().await.unwrap();
    settle().await;
    assert!(controller.tiles_connected());
    assert!(controller.sensor_connected());

    controller.pair_child_tiles().await.unwrap();
    assert_eq!(tiles.activations(), vec![1, 2, 3, 4, 5, 6]);

    sensor.push_reading(SensorReading {
        temperature: 31.0,
        humidity: 20.0,
        uv_index: 9.0,
        captured_at: None,
    });
    settle().await;
    let last = controller.last_reading().unwrap();
    assert!((last.uv_index - 9.0).abs() < 0.01);

    controller.disconnect().await;
    settle().await;
    assert!(!controller.tiles_connected());
    assert!(!controller.sensor_connected());

    let log = log.lock().unwrap();
    assert!(log.iter().any(|m| m.contains("Pairing sequence complete")));
    assert!(log.iter().any(|m| m.contains("Disconnect complete")));
}

#[tokio::test]
async fn pairing_emits_tiles_paired_event_with_transport_count() {
    let provider = MockProvider::new();
    let tiles = provider.tiles().unwrap();
    tiles.set_paired(vec![1, 2, 3]);
    let controller = fast_controller(&provider);

    controller.connect_tiles().await.unwrap();
    settle().await;
    let mut events = controller.subscribe_events();

    controller.pair_child_tiles().await.unwrap();

    let mut paired_count = None;
    while let Ok(event) = events.try_recv() {
        if let ControllerEvent::TilesPaired { count } = event {
            paired_count = Some(count);
        }
    }
    assert_eq!(paired_count, Some(3));
}

#[tokio::test]
async fn countdown_ticks_are_logged_during_discovery() {
    let provider = MockProvider::new();
    let controller = Controller::with_config(
        Arc::new(provider.clone()),
        ControllerConfig {
            pairing: PairingConfig {
                discovery_wait: Duration::from_millis(50),
                countdown_tick: Duration::from_millis(10),
                confirm_settle: Duration::from_millis(1),
                activation_gap: Duration::from_millis(1),
                verify_delay: Duration::from_millis(1),
                child_tiles: 1..=2,
            },
            ..Default::default()
        },
    );

    let ticks = Arc::new(Mutex::new(0usize));
    {
        let ticks = Arc::clone(&ticks);
        controller.on_log(move |entry| {
            if entry.message.contains("Tile discovery in progress") {
                *ticks.lock().unwrap() += 1;
            }
        });
    }

    controller.connect_tiles().await.unwrap();
    settle().await;
    controller.pair_child_tiles().await.unwrap();

    assert_eq!(*ticks.lock().unwrap(), 5);
}
