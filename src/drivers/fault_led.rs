//! On-board fault LED.
//!
//! Driven only by the crash heartbeat — a 100ms blip once a second is
//! the prop's entire fault reporting surface.

use crate::drivers::hw;

pub struct FaultLed {
    on: bool,
}

impl FaultLed {
    pub fn new() -> Self {
        Self { on: false }
    }

    /// Set the LED level; repeated writes of the same level are skipped.
    pub fn set(&mut self, on: bool) {
        if self.on == on {
            return;
        }
        hw::fault_led_write(on);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
