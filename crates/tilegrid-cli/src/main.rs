use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use tilegrid_core::mock::MockProvider;
use tilegrid_core::{
    Controller, ControllerConfig, PairingConfig, interpolate_color, normalize_value,
    temp_to_color, uv_to_color,
};
use tilegrid_types::{LogLevel, Rgb, SensorReading};

#[derive(Parser)]
#[command(name = "tilegrid")]
#[command(author, version, about = "CLI for the tilegrid tile + sensor controller", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full simulated session against the mock transports
    Simulate {
        /// Use the real pairing schedule (20s discovery window) instead of
        /// the compressed one
        #[arg(long)]
        real_timing: bool,

        /// Number of simulated sensor readings to stream
        #[arg(short, long, default_value = "5")]
        readings: u32,
    },

    /// Evaluate the palette mapping for a value
    Palette {
        /// Which scale to evaluate
        #[arg(value_enum)]
        scale: Scale,

        /// The reading to map
        value: f64,
    },

    /// Rescale a value to 0-100 within a range
    Normalize {
        /// The value to rescale
        value: f64,

        /// Lower bound of the input range
        min: f64,

        /// Upper bound of the input range
        max: f64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scale {
    /// Temperature in degrees Celsius
    Temp,
    /// UV index
    Uv,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Simulate {
            real_timing,
            readings,
        } => simulate(real_timing, readings).await,
        Commands::Palette { scale, value } => {
            let color = match scale {
                Scale::Temp => temp_to_color(value),
                Scale::Uv => uv_to_color(value),
            };
            println!("{} -> {}", value, paint(color));
            Ok(())
        }
        Commands::Normalize { value, min, max } => {
            println!("{:.1}", normalize_value(value, min, max));
            Ok(())
        }
    }
}

/// Render a color swatch next to its hex code.
fn paint(color: Rgb) -> String {
    format!("{}", color.to_string().truecolor(color.r, color.g, color.b))
}

async fn simulate(real_timing: bool, readings: u32) -> Result<()> {
    let provider = MockProvider::new();
    let sensor = provider
        .sensor()
        .ok_or_else(|| anyhow::anyhow!("mock sensor unavailable"))?;

    let pairing = if real_timing {
        PairingConfig::default()
    } else {
        PairingConfig::fast()
    };
    let controller = Controller::with_config(
        Arc::new(provider),
        ControllerConfig {
            pairing,
            ..Default::default()
        },
    );

    controller.on_log(|entry| {
        let level = match entry.level {
            LogLevel::Info => entry.level.to_string().blue().to_string(),
            LogLevel::Success => entry.level.to_string().green().to_string(),
            LogLevel::Warning => entry.level.to_string().yellow().to_string(),
            LogLevel::Error => entry.level.to_string().red().to_string(),
        };
        println!("[{}] {:8} {}", entry.timestamp.dimmed(), level, entry.message);
    });

    controller.connect_tiles().await?;
    controller.connect_sensor().await?;
    controller.pair_child_tiles().await?;

    for step in 0..readings {
        let reading = SensorReading {
            temperature: 14.0 + 4.5 * step as f32,
            humidity: 45.0,
            uv_index: 2.0 + 2.5 * step as f32,
            captured_at: None,
        };
        sensor.push_reading(reading);
        tokio::time::sleep(Duration::from_millis(100)).await;

        if let Some(last) = controller.last_reading() {
            let temp = temp_to_color(f64::from(last.temperature));
            let uv = uv_to_color(f64::from(last.uv_index));
            let blend = interpolate_color(temp, uv, 0.5);
            println!(
                "  reading: {:.1} °C {} | UV {:.1} {} | blend {}",
                last.temperature,
                paint(temp),
                last.uv_index,
                paint(uv),
                paint(blend),
            );
        }
    }

    controller.disconnect().await;
    // give the state intake a moment to apply the teardown updates
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!(
        "tiles connected: {}, sensor connected: {}",
        controller.tiles_connected(),
        controller.sensor_connected()
    );
    Ok(())
}
