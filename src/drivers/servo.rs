//! Release-mechanism servo driver (the "activator").
//!
//! Two fixed positions: *released* lets the lid spring open, *restrained*
//! holds it shut.  Position writes are fire-and-forget — the servo slews
//! on its own; there is no feedback.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC servo channel via the hw helpers.
//! On host/test: tracks the commanded position in-memory only.

use crate::drivers::hw;
use crate::error::ActuatorError;

/// Horn angle that frees the activator (degrees).
const RELEASED_DEG: u8 = 0;
/// Horn angle that restrains the activator (degrees).
const RESTRAINED_DEG: u8 = 55;

/// Standard hobby-servo pulse range mapped over 0–180°.
const PULSE_MIN_US: u32 = 500;
const PULSE_MAX_US: u32 = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoPosition {
    Released,
    Restrained,
}

pub struct ServoDriver {
    position: Option<ServoPosition>,
}

impl ServoDriver {
    pub fn new() -> Self {
        Self { position: None }
    }

    /// Move to the released position.  Idempotent: re-commanding the
    /// current position rewrites the same pulse width.
    pub fn release(&mut self) -> Result<(), ActuatorError> {
        self.write(RELEASED_DEG)?;
        self.position = Some(ServoPosition::Released);
        Ok(())
    }

    /// Move to the restrained position.
    pub fn restrain(&mut self) -> Result<(), ActuatorError> {
        self.write(RESTRAINED_DEG)?;
        self.position = Some(ServoPosition::Restrained);
        Ok(())
    }

    /// Per-cycle update.  Nothing to animate — position control only.
    pub fn tick(&mut self, _now_ms: u32) {}

    /// Last successfully commanded position.
    pub fn position(&self) -> Option<ServoPosition> {
        self.position
    }

    fn write(&self, angle_deg: u8) -> Result<(), ActuatorError> {
        let span = PULSE_MAX_US - PULSE_MIN_US;
        let pulse = PULSE_MIN_US + span * u32::from(angle_deg) / 180;
        if hw::servo_set_pulse_us(pulse) {
            Ok(())
        } else {
            Err(ActuatorError::PwmWriteFailed)
        }
    }
}
