//! MQTT publisher for door transition events
//!
//! Publishes transition payloads on the event topic at QoS 1
//! (at-least-once). Publish failures are logged and never retried by the
//! agent itself beyond what the MQTT client does in-flight; the next
//! detected transition attempts publication again.

use crate::domain::TransitionEvent;
use crate::infra::config::Config;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// MQTT publisher actor
///
/// Receives transition events from the egress channel and publishes them
/// to the event topic.
pub struct MqttPublisher {
    client: AsyncClient,
    rx: mpsc::Receiver<TransitionEvent>,
    event_topic: String,
}

impl MqttPublisher {
    /// Create a new MQTT publisher
    ///
    /// Connects to the broker at the configured MQTT host/port.
    pub fn new(config: &Config, rx: mpsc::Receiver<TransitionEvent>) -> Self {
        let client_id = format!("doorwatch-egress-{}", std::process::id());
        let mut mqttoptions = MqttOptions::new(client_id, config.mqtt_host(), config.mqtt_port());
        mqttoptions.set_keep_alive(Duration::from_secs(30));
        mqttoptions.set_clean_session(true);

        // Set credentials if configured
        if let (Some(username), Some(password)) = (config.mqtt_username(), config.mqtt_password()) {
            mqttoptions.set_credentials(username, password);
        }

        let (client, eventloop) = AsyncClient::new(mqttoptions, 64);

        // Spawn the eventloop handler
        tokio::spawn(async move {
            let mut eventloop = eventloop;
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("mqtt_egress_connected");
                    }
                    Ok(Event::Incoming(Packet::PubAck(_))) => {
                        // QoS 1 acknowledgement received
                        debug!("mqtt_egress_puback");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "mqtt_egress_error");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Self { client, rx, event_topic: config.mqtt_event_topic().to_string() }
    }

    /// Run the publisher loop
    ///
    /// Processes events from the channel until the shutdown signal flips,
    /// then drains whatever is still queued.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(topic = %self.event_topic, "mqtt_egress_started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("mqtt_egress_shutdown");
                        while let Ok(event) = self.rx.try_recv() {
                            self.publish_event(event).await;
                        }
                        return;
                    }
                }
                Some(event) = self.rx.recv() => {
                    self.publish_event(event).await;
                }
            }
        }
    }

    async fn publish_event(&self, event: TransitionEvent) {
        let json = match serde_json::to_string(&event.to_payload()) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "event_serialize_failed");
                return;
            }
        };

        // QoS 1: at-least-once delivery for state transitions
        match self
            .client
            .publish(&self.event_topic, QoS::AtLeastOnce, false, json.as_bytes())
            .await
        {
            Ok(()) => {
                info!(event = %event.kind.event_kind(), ts = %event.ts, "event_published");
            }
            Err(e) => {
                error!(error = %e, event = %event.kind.event_kind(), "publish_failed");
            }
        }
    }
}
