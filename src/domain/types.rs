//! Shared types for the door sensor agent

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Newtype wrapper for the device identifier to provide type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DeviceId(pub u32);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Debounced logical state of the door contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Open,
    Closed,
}

impl DoorState {
    /// Map a raw GPIO level to a logical state.
    ///
    /// With `active_low` wiring (reed on a pull-up, magnet together pulls
    /// the line low) a low level means the door is closed.
    pub fn from_level(high: bool, active_low: bool) -> Self {
        match (high, active_low) {
            (true, true) | (false, false) => DoorState::Open,
            (false, true) | (true, false) => DoorState::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DoorState::Open => "open",
            DoorState::Closed => "closed",
        }
    }

    /// Wire name of the transition into this state (`open` / `close`)
    pub fn event_kind(&self) -> &'static str {
        match self {
            DoorState::Open => "open",
            DoorState::Closed => "close",
        }
    }

    /// Indicator level mirroring this state (LED on while the door is open)
    pub fn indicator_level(&self) -> bool {
        matches!(self, DoorState::Open)
    }
}

/// Remotely settable arm/disarm mode flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmFlag {
    Armed,
    Disarmed,
}

impl ArmFlag {
    pub fn from_bool(armed: bool) -> Self {
        if armed {
            ArmFlag::Armed
        } else {
            ArmFlag::Disarmed
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, ArmFlag::Armed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArmFlag::Armed => "armed",
            ArmFlag::Disarmed => "disarmed",
        }
    }
}

/// Inbound command message on the command topic: `{"cmd": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    pub cmd: String,
}

/// Parsed command variants
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Arm,
    Disarm,
    Unknown(String),
}

impl std::str::FromStr for Command {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "arm" => Command::Arm,
            "disarm" => Command::Disarm,
            other => Command::Unknown(other.to_string()),
        })
    }
}

/// A detected door transition, created once per state change
#[derive(Debug, Clone)]
pub struct TransitionEvent {
    pub device_id: DeviceId,
    pub kind: DoorState,
    /// Arm flag snapshot at detection time, present only when the
    /// deployment includes arm status in outbound payloads
    pub armed: Option<bool>,
    /// RFC 3339 UTC timestamp with `Z` suffix
    pub ts: String,
}

impl TransitionEvent {
    pub fn new(device_id: DeviceId, kind: DoorState, armed: Option<bool>) -> Self {
        Self { device_id, kind, armed, ts: utc_timestamp() }
    }

    pub fn to_payload(&self) -> DoorEventPayload {
        DoorEventPayload {
            device_id: self.device_id,
            event: self.kind.event_kind(),
            armed: self.armed,
            ts: self.ts.clone(),
        }
    }
}

/// Outbound wire payload published on the event topic
#[derive(Debug, Clone, Serialize)]
pub struct DoorEventPayload {
    pub device_id: DeviceId,
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armed: Option<bool>,
    pub ts: String,
}

/// Current wall-clock time as RFC 3339 UTC ("Z" suffix)
pub fn utc_timestamp() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}
