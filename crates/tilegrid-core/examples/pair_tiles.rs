//! Example: Pairing Child Tiles
//!
//! This example runs the full child-tile pairing sequence against the mock
//! transports, printing every log entry as it fans out. Swap the mock
//! provider for a real one to drive hardware.
//!
//! Run with: `cargo run --example pair_tiles`

use std::sync::Arc;

use tilegrid_core::mock::MockProvider;
use tilegrid_core::{Controller, ControllerConfig, PairingConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let provider = MockProvider::new();
    let controller = Controller::with_config(
        Arc::new(provider),
        ControllerConfig {
            // fast() keeps the demo snappy; drop this for the real 20s window
            pairing: PairingConfig::fast(),
            ..Default::default()
        },
    );

    controller.on_log(|entry| {
        println!("[{}] {:8} {}", entry.timestamp, entry.level, entry.message);
    });

    println!("Connecting tile network...");
    controller.connect_tiles().await?;

    controller.pair_child_tiles().await?;

    println!();
    println!(
        "Tiles connected: {}, sensor connected: {}",
        controller.tiles_connected(),
        controller.sensor_connected()
    );

    controller.disconnect().await;
    Ok(())
}
