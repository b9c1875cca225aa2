//! GPIO line abstraction
//!
//! Pin numbers and pull configuration are deployment config; the rest of
//! the agent only sees boolean levels through the two traits below. The
//! `rpi` feature provides rppal-backed adapters for real hardware; the
//! simulated pins exist for tests and host runs.

use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A boolean-readable input line (the reed contact)
pub trait DigitalInput: Send {
    /// Read the current level. True = high.
    fn read(&mut self) -> Result<bool>;
}

/// A boolean-settable output line (the indicator LED)
pub trait DigitalOutput: Send {
    /// Drive the line. True = high.
    fn set(&mut self, high: bool) -> Result<()>;
}

/// Shared in-memory pin. Reads and writes go through one atomic level,
/// so a test (or simulator) can flip the input side while the agent runs.
#[derive(Debug, Clone, Default)]
pub struct SimPin {
    level: Arc<AtomicBool>,
}

impl SimPin {
    pub fn new(high: bool) -> Self {
        Self { level: Arc::new(AtomicBool::new(high)) }
    }

    /// Inject a level (simulating the physical side of the line)
    pub fn set_level(&self, high: bool) {
        self.level.store(high, Ordering::Relaxed);
    }

    pub fn level(&self) -> bool {
        self.level.load(Ordering::Relaxed)
    }
}

impl DigitalInput for SimPin {
    fn read(&mut self) -> Result<bool> {
        Ok(self.level())
    }
}

impl DigitalOutput for SimPin {
    fn set(&mut self, high: bool) -> Result<()> {
        self.set_level(high);
        Ok(())
    }
}

/// Input that replays a fixed sequence of levels, repeating the last one
/// once the script runs out. Used to drive debounce and monitor tests.
#[derive(Debug)]
pub struct ScriptedInput {
    samples: VecDeque<bool>,
    last: bool,
}

impl ScriptedInput {
    pub fn new<I: IntoIterator<Item = bool>>(samples: I) -> Self {
        let samples: VecDeque<bool> = samples.into_iter().collect();
        let last = samples.back().copied().unwrap_or(false);
        Self { samples, last }
    }
}

impl DigitalInput for ScriptedInput {
    fn read(&mut self) -> Result<bool> {
        if let Some(level) = self.samples.pop_front() {
            self.last = level;
        }
        Ok(self.last)
    }
}

#[cfg(feature = "rpi")]
pub use self::rpi::{GpioInputPin, GpioOutputPin};

#[cfg(feature = "rpi")]
mod rpi {
    use super::{DigitalInput, DigitalOutput};
    use anyhow::{Context, Result};
    use rppal::gpio::{Gpio, InputPin, OutputPin};

    /// Reed switch line. Pulled up for active-low wiring (the common
    /// reed-to-ground arrangement), pulled down otherwise.
    pub struct GpioInputPin {
        pin: InputPin,
    }

    impl GpioInputPin {
        pub fn new(bcm_pin: u8, active_low: bool) -> Result<Self> {
            let gpio = Gpio::new().context("Failed to open GPIO device")?;
            let pin = gpio
                .get(bcm_pin)
                .with_context(|| format!("Failed to claim input pin {bcm_pin}"))?;
            let pin = if active_low { pin.into_input_pullup() } else { pin.into_input_pulldown() };
            Ok(Self { pin })
        }
    }

    impl DigitalInput for GpioInputPin {
        fn read(&mut self) -> Result<bool> {
            Ok(self.pin.is_high())
        }
    }

    /// Indicator LED line. Starts low; rppal restores the line state on
    /// drop, so the pin is released even on an unexpected exit path.
    pub struct GpioOutputPin {
        pin: OutputPin,
    }

    impl GpioOutputPin {
        pub fn new(bcm_pin: u8) -> Result<Self> {
            let gpio = Gpio::new().context("Failed to open GPIO device")?;
            let pin = gpio
                .get(bcm_pin)
                .with_context(|| format!("Failed to claim output pin {bcm_pin}"))?
                .into_output_low();
            Ok(Self { pin })
        }
    }

    impl DigitalOutput for GpioOutputPin {
        fn set(&mut self, high: bool) -> Result<()> {
            if high {
                self.pin.set_high();
            } else {
                self.pin.set_low();
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_pin_roundtrip() {
        let mut pin = SimPin::new(false);
        assert!(!pin.read().unwrap());
        pin.set(true).unwrap();
        assert!(pin.read().unwrap());

        // Clones share the underlying level
        let clone = pin.clone();
        clone.set_level(false);
        assert!(!pin.read().unwrap());
    }

    #[test]
    fn test_scripted_input_repeats_last() {
        let mut input = ScriptedInput::new([true, false]);
        assert!(input.read().unwrap());
        assert!(!input.read().unwrap());
        assert!(!input.read().unwrap());
        assert!(!input.read().unwrap());
    }

    #[test]
    fn test_scripted_input_empty_defaults_low() {
        let mut input = ScriptedInput::new([]);
        assert!(!input.read().unwrap());
    }
}
