//! Reed contact debouncing
//!
//! Reed switches bounce for a few milliseconds when the magnet moves past
//! the threshold, and long cable runs pick up the occasional spurious
//! level. The debouncer uses a dual-read policy: a reading that matches
//! the last accepted raw level is taken as-is; a reading that differs is
//! treated as in-flux, re-read after a short settle delay, and the second
//! read wins. A single-sample glitch shorter than the settle window can
//! therefore never surface as a state change.

use crate::domain::DoorState;
use crate::io::gpio::DigitalInput;
use anyhow::Result;
use std::time::Duration;

pub struct Debouncer<I: DigitalInput> {
    input: I,
    settle: Duration,
    active_low: bool,
    last_raw: Option<bool>,
}

impl<I: DigitalInput> Debouncer<I> {
    pub fn new(input: I, settle: Duration, active_low: bool) -> Self {
        Self { input, settle, active_low, last_raw: None }
    }

    /// Take one debounced sample. Must be called at a roughly periodic
    /// interval; the only suspension inside is the settle delay, and only
    /// when the line appears to be changing.
    pub async fn sample(&mut self) -> Result<DoorState> {
        let first = self.input.read()?;
        let level = if self.last_raw == Some(first) {
            first
        } else {
            // Line is in flux (or this is the first sample): wait out the
            // bounce window and trust the second read.
            tokio::time::sleep(self.settle).await;
            self.input.read()?
        };
        self.last_raw = Some(level);
        Ok(DoorState::from_level(level, self.active_low))
    }
}
