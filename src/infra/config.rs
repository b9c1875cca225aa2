//! Configuration loading from TOML files
//!
//! Config file is selected via the --config command line argument;
//! on any load error the agent falls back to built-in defaults.

use crate::domain::DeviceId;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub id: u32,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GpioConfig {
    pub reed_pin: u8,
    pub led_pin: u8,
    /// Pull-up wiring: line reads low while the magnet holds the contact
    #[serde(default = "default_reed_active_low")]
    pub reed_active_low: bool,
}

fn default_reed_active_low() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_settle_delay_ms() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_event_topic")]
    pub event_topic: String,
    #[serde(default = "default_command_topic")]
    pub command_topic: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_event_topic() -> String {
    "doorwatch/events".to_string()
}

fn default_command_topic() -> String {
    "doorwatch/commands".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the status backend (e.g. "https://api.example.com")
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_backend_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { base_url: None, timeout_ms: default_backend_timeout_ms() }
    }
}

fn default_backend_timeout_ms() -> u64 {
    2000
}

/// Deployment feature toggles unifying the payload/behavior variants
#[derive(Debug, Clone, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_include_armed")]
    pub include_armed_in_payload: bool,
    #[serde(default)]
    pub announce_baseline_on_boot: bool,
    #[serde(default)]
    pub fetch_initial_arm_from_backend: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            include_armed_in_payload: default_include_armed(),
            announce_baseline_on_boot: false,
            fetch_initial_arm_from_backend: false,
        }
    }
}

fn default_include_armed() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    pub device: DeviceConfig,
    pub gpio: GpioConfig,
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    device_id: DeviceId,
    device_api_key: Option<String>,
    reed_pin: u8,
    led_pin: u8,
    reed_active_low: bool,
    poll_interval_ms: u64,
    settle_delay_ms: u64,
    mqtt_host: String,
    mqtt_port: u16,
    mqtt_event_topic: String,
    mqtt_command_topic: String,
    mqtt_username: Option<String>,
    mqtt_password: Option<String>,
    backend_base_url: Option<String>,
    backend_timeout_ms: u64,
    include_armed_in_payload: bool,
    announce_baseline_on_boot: bool,
    fetch_initial_arm_from_backend: bool,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_id: DeviceId(1),
            device_api_key: None,
            reed_pin: 27,
            led_pin: 17,
            reed_active_low: true,
            poll_interval_ms: default_poll_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            mqtt_host: "localhost".to_string(),
            mqtt_port: 1883,
            mqtt_event_topic: default_event_topic(),
            mqtt_command_topic: default_command_topic(),
            mqtt_username: None,
            mqtt_password: None,
            backend_base_url: None,
            backend_timeout_ms: default_backend_timeout_ms(),
            include_armed_in_payload: true,
            announce_baseline_on_boot: false,
            fetch_initial_arm_from_backend: false,
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self {
            device_id: DeviceId(toml_config.device.id),
            device_api_key: toml_config.device.api_key,
            reed_pin: toml_config.gpio.reed_pin,
            led_pin: toml_config.gpio.led_pin,
            reed_active_low: toml_config.gpio.reed_active_low,
            poll_interval_ms: toml_config.sampling.poll_interval_ms,
            settle_delay_ms: toml_config.sampling.settle_delay_ms,
            mqtt_host: toml_config.mqtt.host,
            mqtt_port: toml_config.mqtt.port,
            mqtt_event_topic: toml_config.mqtt.event_topic,
            mqtt_command_topic: toml_config.mqtt.command_topic,
            mqtt_username: toml_config.mqtt.username,
            mqtt_password: toml_config.mqtt.password,
            backend_base_url: toml_config.backend.base_url,
            backend_timeout_ms: toml_config.backend.timeout_ms,
            include_armed_in_payload: toml_config.features.include_armed_in_payload,
            announce_baseline_on_boot: toml_config.features.announce_baseline_on_boot,
            fetch_initial_arm_from_backend: toml_config.features.fetch_initial_arm_from_backend,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    // Getters for all config fields
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    pub fn device_api_key(&self) -> Option<&str> {
        self.device_api_key.as_deref()
    }

    pub fn reed_pin(&self) -> u8 {
        self.reed_pin
    }

    pub fn led_pin(&self) -> u8 {
        self.led_pin
    }

    pub fn reed_active_low(&self) -> bool {
        self.reed_active_low
    }

    pub fn poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms
    }

    pub fn settle_delay_ms(&self) -> u64 {
        self.settle_delay_ms
    }

    pub fn mqtt_host(&self) -> &str {
        &self.mqtt_host
    }

    pub fn mqtt_port(&self) -> u16 {
        self.mqtt_port
    }

    pub fn mqtt_event_topic(&self) -> &str {
        &self.mqtt_event_topic
    }

    pub fn mqtt_command_topic(&self) -> &str {
        &self.mqtt_command_topic
    }

    pub fn mqtt_username(&self) -> Option<&str> {
        self.mqtt_username.as_deref()
    }

    pub fn mqtt_password(&self) -> Option<&str> {
        self.mqtt_password.as_deref()
    }

    pub fn backend_base_url(&self) -> Option<&str> {
        self.backend_base_url.as_deref()
    }

    pub fn backend_timeout_ms(&self) -> u64 {
        self.backend_timeout_ms
    }

    pub fn include_armed_in_payload(&self) -> bool {
        self.include_armed_in_payload
    }

    pub fn announce_baseline_on_boot(&self) -> bool {
        self.announce_baseline_on_boot
    }

    pub fn fetch_initial_arm_from_backend(&self) -> bool {
        self.fetch_initial_arm_from_backend
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to set the settle delay
    #[cfg(test)]
    pub fn with_settle_delay_ms(mut self, ms: u64) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Builder method for tests to toggle baseline announcement
    #[cfg(test)]
    pub fn with_announce_baseline(mut self, announce: bool) -> Self {
        self.announce_baseline_on_boot = announce;
        self
    }

    /// Builder method for tests to toggle the armed field in payloads
    #[cfg(test)]
    pub fn with_include_armed(mut self, include: bool) -> Self {
        self.include_armed_in_payload = include;
        self
    }

    /// Builder method for tests to point at a status backend
    #[cfg(test)]
    pub fn with_backend_base_url(mut self, url: &str) -> Self {
        self.backend_base_url = Some(url.to_string());
        self
    }
}
