//! Doorwatch - reed switch door sensor agent for Raspberry Pi
//!
//! Polls a debounced reed contact, mirrors the door state on an indicator
//! LED, publishes open/close transitions over MQTT, and accepts remote
//! arm/disarm commands.
//!
//! Module structure:
//! - `domain/` - Core types (DoorState, ArmFlag, TransitionEvent)
//! - `io/` - External interfaces (GPIO, MQTT, backend status fetch)
//! - `services/` - Logic (Debouncer, ArmState, DoorMonitor)
//! - `infra/` - Infrastructure (Config)

use clap::Parser;
use doorwatch::domain::ArmFlag;
use doorwatch::infra::Config;
use doorwatch::io::gpio::{GpioInputPin, GpioOutputPin};
use doorwatch::io::{create_event_channel, MqttPublisher};
use doorwatch::services::{ArmState, DoorMonitor};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Doorwatch - door sensor agent
#[derive(Parser, Debug)]
#[command(name = "doorwatch", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    // Default: INFO, use RUST_LOG=trace to see individual polls
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(git_hash = env!("GIT_HASH"), "doorwatch starting");

    let args = Args::parse();
    let config = Config::load_from_path(&args.config);

    info!(
        config_file = %config.config_file(),
        device_id = %config.device_id(),
        reed_pin = %config.reed_pin(),
        led_pin = %config.led_pin(),
        poll_interval_ms = %config.poll_interval_ms(),
        settle_delay_ms = %config.settle_delay_ms(),
        mqtt_host = %config.mqtt_host(),
        mqtt_port = %config.mqtt_port(),
        event_topic = %config.mqtt_event_topic(),
        command_topic = %config.mqtt_command_topic(),
        "config_loaded"
    );

    // Configure hardware lines first: failure here is fatal
    let reed = GpioInputPin::new(config.reed_pin(), config.reed_active_low())?;
    let led = GpioOutputPin::new(config.led_pin())?;

    // Resolve the initial arm flag, defaulting safe on any fetch failure
    let initial_arm = if config.fetch_initial_arm_from_backend() {
        doorwatch::io::backend::fetch_initial_arm(&config).await
    } else {
        ArmFlag::Disarmed
    };
    let arm = Arc::new(ArmState::new(initial_arm));
    info!(arm = %initial_arm.as_str(), "arm_state_initialized");

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Create event channel (bounded for backpressure)
    let (event_tx, event_rx) = create_event_channel(256);

    // Start MQTT event publisher
    let publisher = MqttPublisher::new(&config, event_rx);
    let publisher_shutdown = shutdown_rx.clone();
    tokio::spawn(async move {
        publisher.run(publisher_shutdown).await;
    });

    // Start MQTT command listener
    let listener_config = config.clone();
    let listener_arm = arm.clone();
    let listener_shutdown = shutdown_rx.clone();
    tokio::spawn(async move {
        if let Err(e) =
            doorwatch::io::mqtt::start_command_listener(&listener_config, listener_arm, listener_shutdown)
                .await
        {
            tracing::error!(error = %e, "command listener error");
        }
    });

    // Handle shutdown on Ctrl+C
    let shutdown_signal = shutdown_tx;
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_signal.send(true);
    });

    // Run the monitor loop - polls until the shutdown signal flips
    let monitor = DoorMonitor::new(&config, reed, led, arm, event_tx);
    monitor.run(shutdown_rx).await;

    info!("doorwatch shutdown complete");
    Ok(())
}
