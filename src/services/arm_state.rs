//! Process-wide arm/disarm flag
//!
//! Exactly one writer (the command listener) and one reader (the polling
//! loop) share this flag through an `Arc`. A single atomic bool is enough;
//! there is no ordering dependency between the flag and any other state.

use crate::domain::{ArmFlag, Command, CommandMessage};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

pub struct ArmState {
    armed: AtomicBool,
}

impl ArmState {
    pub fn new(initial: ArmFlag) -> Self {
        Self { armed: AtomicBool::new(initial.is_armed()) }
    }

    pub fn get(&self) -> ArmFlag {
        ArmFlag::from_bool(self.armed.load(Ordering::Relaxed))
    }

    /// Idempotent, last-writer-wins. Cannot fail.
    pub fn set(&self, flag: ArmFlag) {
        self.armed.store(flag.is_armed(), Ordering::Relaxed);
    }

    /// Apply an inbound command message. Unknown commands are logged and
    /// leave the flag unchanged.
    pub fn apply_command(&self, msg: &CommandMessage) {
        match msg.cmd.parse::<Command>() {
            Ok(Command::Arm) => {
                self.set(ArmFlag::Armed);
                info!(arm = "armed", "arm_command");
            }
            Ok(Command::Disarm) => {
                self.set(ArmFlag::Disarmed);
                info!(arm = "disarmed", "arm_command");
            }
            Ok(Command::Unknown(other)) => {
                warn!(cmd = %other, "arm_command_unknown");
            }
            Err(never) => match never {},
        }
    }
}
