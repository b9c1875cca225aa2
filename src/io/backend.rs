//! Boot-time arm status fetch from the backend API
//!
//! One-shot `GET /devices/{id}/status` with the device API key. Any
//! failure degrades to the safe default of Disarmed with a warning; the
//! loop always proceeds.

use crate::domain::ArmFlag;
use crate::infra::config::Config;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct StatusResponse {
    armed: bool,
}

/// Fetch the authoritative arm status at boot.
///
/// Returns Disarmed when no backend is configured or on any fetch error.
pub async fn fetch_initial_arm(config: &Config) -> ArmFlag {
    let Some(base_url) = config.backend_base_url() else {
        warn!("arm_status_fetch_skipped: no backend configured");
        return ArmFlag::Disarmed;
    };

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_millis(config.backend_timeout_ms()))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "arm_status_client_build_failed");
            return ArmFlag::Disarmed;
        }
    };

    let url = format!("{}/devices/{}/status", base_url.trim_end_matches('/'), config.device_id());
    let mut request = client.get(&url);
    if let Some(api_key) = config.device_api_key() {
        request = request.header("X-API-Key", api_key);
    }

    match request.send().await {
        Ok(response) if response.status().is_success() => {
            match response.json::<StatusResponse>().await {
                Ok(status) => {
                    let flag = ArmFlag::from_bool(status.armed);
                    info!(arm = %flag.as_str(), "arm_status_fetched");
                    flag
                }
                Err(e) => {
                    warn!(error = %e, "arm_status_malformed, defaulting to disarmed");
                    ArmFlag::Disarmed
                }
            }
        }
        Ok(response) => {
            warn!(
                status = %response.status().as_u16(),
                "arm_status_fetch_rejected, defaulting to disarmed"
            );
            ArmFlag::Disarmed
        }
        Err(e) => {
            warn!(error = %e, "arm_status_fetch_failed, defaulting to disarmed");
            ArmFlag::Disarmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_parse() {
        let status: StatusResponse = serde_json::from_str(r#"{"armed":true}"#).unwrap();
        assert!(status.armed);
        let status: StatusResponse = serde_json::from_str(r#"{"armed":false}"#).unwrap();
        assert!(!status.armed);
    }

    #[tokio::test]
    async fn test_no_backend_defaults_disarmed() {
        let config = Config::default();
        assert_eq!(fetch_initial_arm(&config).await, ArmFlag::Disarmed);
    }

    #[tokio::test]
    async fn test_unreachable_backend_defaults_disarmed() {
        // Nothing listens on the discard port; connection is refused fast
        let config = Config::default().with_backend_base_url("http://127.0.0.1:9");
        assert_eq!(fetch_initial_arm(&config).await, ArmFlag::Disarmed);
    }
}
