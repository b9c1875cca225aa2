//! Domain models - core types shared across the agent
//!
//! This module contains the canonical data types used throughout the system:
//! - `DoorState` - debounced logical state of the reed contact
//! - `ArmFlag` - remotely settable arm/disarm mode
//! - `TransitionEvent` - a detected door transition bound for the bus
//! - `CommandMessage` / `Command` - inbound arm/disarm commands
//! - `DoorEventPayload` - the outbound wire contract

pub mod types;

pub use types::{
    ArmFlag, Command, CommandMessage, DeviceId, DoorEventPayload, DoorState, TransitionEvent,
};
