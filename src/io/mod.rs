//! IO modules - external system interfaces
//!
//! This module contains all external IO operations:
//! - `gpio` - digital line traits, rppal adapters, simulated pins
//! - `mqtt` - MQTT client for receiving arm/disarm commands
//! - `mqtt_egress` - MQTT publisher for transition events
//! - `egress_channel` - typed channel feeding the publisher
//! - `backend` - boot-time arm status fetch over HTTP

pub mod backend;
pub mod egress_channel;
pub mod gpio;
pub mod mqtt;
pub mod mqtt_egress;

// Re-export commonly used types
pub use egress_channel::{create_event_channel, EventSender};
pub use gpio::{DigitalInput, DigitalOutput, ScriptedInput, SimPin};
pub use mqtt_egress::MqttPublisher;
