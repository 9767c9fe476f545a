//! Example: Watching Sensor Readings
//!
//! Connects the sensor transport, subscribes to decoded readings, and prints
//! each reading together with its palette colors.
//!
//! Run with: `cargo run --example watch_sensor`

use std::sync::Arc;
use std::time::Duration;

use tilegrid_core::mock::MockProvider;
use tilegrid_core::{Controller, SensorReading, temp_to_color, uv_to_color};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let provider = MockProvider::new();
    let sensor = provider.sensor().expect("mock sensor available");
    let controller = Controller::new(Arc::new(provider));

    controller.on_reading(|reading| {
        println!(
            "{:.1} °C ({}), UV {:.1} ({})",
            reading.temperature,
            temp_to_color(f64::from(reading.temperature)),
            reading.uv_index,
            uv_to_color(f64::from(reading.uv_index)),
        );
    });

    controller.connect_sensor().await?;

    // Feed the mock a short warming trend
    for step in 0..5 {
        sensor.push_reading(SensorReading {
            temperature: 12.0 + 5.0 * step as f32,
            humidity: 40.0,
            uv_index: 1.0 + 2.5 * step as f32,
            captured_at: None,
        });
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    controller.disconnect().await;
    Ok(())
}
