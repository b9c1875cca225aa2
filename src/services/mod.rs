//! Services - core logic of the agent
//!
//! This module contains the state-holding components:
//! - `debounce` - dual-read debouncing of the reed contact
//! - `arm_state` - shared arm/disarm flag
//! - `monitor` - polling loop, transition detection, event publication

pub mod arm_state;
pub mod debounce;
pub mod monitor;

// Re-export commonly used types
pub use arm_state::ArmState;
pub use debounce::Debouncer;
pub use monitor::DoorMonitor;
