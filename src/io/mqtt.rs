//! MQTT client for receiving arm/disarm commands
//!
//! Subscribes to the command topic and feeds parsed commands into the
//! shared `ArmState`. Connection-status events are logged only; the
//! polling loop keeps running and driving the indicator even while the
//! bus is unreachable.

use crate::domain::CommandMessage;
use crate::infra::config::Config;
use crate::services::arm_state::ArmState;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Start the MQTT command listener
///
/// Runs until the shutdown signal flips. Malformed payloads and unknown
/// commands are logged and dropped; they never unwind into the caller.
pub async fn start_command_listener(
    config: &Config,
    arm: Arc<ArmState>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let client_id = format!("doorwatch-cmd-{}", std::process::id());
    let mut mqttoptions = MqttOptions::new(client_id, config.mqtt_host(), config.mqtt_port());
    mqttoptions.set_keep_alive(Duration::from_secs(30));

    // Set credentials if configured
    if let (Some(username), Some(password)) = (config.mqtt_username(), config.mqtt_password()) {
        mqttoptions.set_credentials(username, password);
    }

    let (client, mut eventloop) = AsyncClient::new(mqttoptions, 64);
    client.subscribe(config.mqtt_command_topic(), QoS::AtLeastOnce).await?;

    info!(
        topic = %config.mqtt_command_topic(),
        host = %config.mqtt_host(),
        port = %config.mqtt_port(),
        "command_listener_subscribed"
    );

    loop {
        tokio::select! {
            // Check for shutdown signal
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("command_listener_shutdown");
                    return Ok(());
                }
            }
            // Process MQTT events
            result = eventloop.poll() => {
                match result {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        handle_payload(&arm, &publish.payload);
                    }
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("command_listener_connected");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = %e, "command_listener_error");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }
    }
}

/// Parse one command payload and apply it to the arm state.
/// Anything unparseable is logged and dropped.
fn handle_payload(arm: &ArmState, payload: &[u8]) {
    let json_str = match std::str::from_utf8(payload) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Invalid UTF-8 in command payload");
            return;
        }
    };

    match serde_json::from_str::<CommandMessage>(json_str) {
        Ok(msg) => arm.apply_command(&msg),
        Err(e) => {
            warn!(error = %e, payload = %json_str, "command_malformed");
        }
    }
}
