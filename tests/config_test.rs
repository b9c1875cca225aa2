//! Integration tests for configuration loading

use doorwatch::domain::DeviceId;
use doorwatch::infra::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[device]
id = 42
api_key = "secret"

[gpio]
reed_pin = 22
led_pin = 23
reed_active_low = false

[sampling]
poll_interval_ms = 50
settle_delay_ms = 20

[mqtt]
host = "test-host"
port = 1884
event_topic = "site/door/events"
command_topic = "site/door/commands"

[backend]
base_url = "https://api.example.com"
timeout_ms = 1500

[features]
include_armed_in_payload = false
announce_baseline_on_boot = true
fetch_initial_arm_from_backend = true
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.device_id(), DeviceId(42));
    assert_eq!(config.device_api_key(), Some("secret"));
    assert_eq!(config.reed_pin(), 22);
    assert_eq!(config.led_pin(), 23);
    assert!(!config.reed_active_low());
    assert_eq!(config.poll_interval_ms(), 50);
    assert_eq!(config.settle_delay_ms(), 20);
    assert_eq!(config.mqtt_host(), "test-host");
    assert_eq!(config.mqtt_port(), 1884);
    assert_eq!(config.mqtt_event_topic(), "site/door/events");
    assert_eq!(config.mqtt_command_topic(), "site/door/commands");
    assert_eq!(config.backend_base_url(), Some("https://api.example.com"));
    assert_eq!(config.backend_timeout_ms(), 1500);
    assert!(!config.include_armed_in_payload());
    assert!(config.announce_baseline_on_boot());
    assert!(config.fetch_initial_arm_from_backend());
}

#[test]
fn test_optional_sections_default() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[device]
id = 1

[gpio]
reed_pin = 27
led_pin = 17

[mqtt]
host = "broker"
port = 1883
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert!(config.reed_active_low());
    assert_eq!(config.poll_interval_ms(), 100);
    assert_eq!(config.settle_delay_ms(), 30);
    assert_eq!(config.mqtt_event_topic(), "doorwatch/events");
    assert!(config.include_armed_in_payload());
    assert!(!config.announce_baseline_on_boot());
    assert!(config.backend_base_url().is_none());
    assert_eq!(config.backend_timeout_ms(), 2000);
}

#[test]
fn test_missing_mqtt_section_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[device]\nid = 1\n\n[gpio]\nreed_pin = 27\nled_pin = 17\n")
        .unwrap();
    temp_file.flush().unwrap();

    assert!(Config::from_file(temp_file.path()).is_err());
}

#[test]
fn test_load_from_path_fallback() {
    let config = Config::load_from_path("/nonexistent/config.toml");
    assert_eq!(config.mqtt_host(), "localhost");
    assert_eq!(config.mqtt_port(), 1883);
    assert_eq!(config.device_id(), DeviceId(1));
}
