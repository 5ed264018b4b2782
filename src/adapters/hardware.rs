//! Hardware adapter — bridges real peripherals to the domain port traits.
//!
//! Owns the servo, MP3, light, and fault-LED drivers, exposing them
//! through [`ActuatorPort`], [`AudioPort`], [`LightPort`], and
//! [`StatusPort`].  This is the only module in the system that touches
//! actual output hardware.  On non-espidf targets the underlying drivers
//! use cfg-gated simulation stubs, so the adapter itself is host-testable.

use crate::app::ports::{ActuatorPort, AudioPort, LightPort, Playback, StatusPort};
use crate::drivers::fault_led::FaultLed;
use crate::drivers::light_fx::LightFx;
use crate::drivers::mp3::Mp3Driver;
use crate::drivers::servo::ServoDriver;
use crate::error::ActuatorError;
use crate::fsm::CueId;

/// Concrete adapter that combines all output hardware behind port traits.
pub struct HardwareAdapter {
    servo: ServoDriver,
    mp3: Mp3Driver,
    lights: LightFx,
    fault_led: FaultLed,
}

impl HardwareAdapter {
    pub fn new(servo: ServoDriver, mp3: Mp3Driver, lights: LightFx, fault_led: FaultLed) -> Self {
        Self {
            servo,
            mp3,
            lights,
            fault_led,
        }
    }

    /// Borrow the light engine (frame inspection in tests and demos).
    pub fn lights(&self) -> &LightFx {
        &self.lights
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn release(&mut self) -> Result<(), ActuatorError> {
        self.servo.release()
    }

    fn restrain(&mut self) -> Result<(), ActuatorError> {
        self.servo.restrain()
    }

    fn tick(&mut self, now_ms: u32) {
        self.servo.tick(now_ms);
    }
}

// ── AudioPort implementation ──────────────────────────────────

impl AudioPort for HardwareAdapter {
    fn play(&mut self, cue: CueId, playback: Playback) {
        self.mp3.play(cue, playback == Playback::Blocking);
    }

    fn stop(&mut self) {
        self.mp3.stop();
    }

    fn is_busy(&self) -> bool {
        self.mp3.is_busy()
    }

    fn tick(&mut self, now_ms: u32) {
        self.mp3.tick(now_ms);
    }
}

// ── LightPort implementation ──────────────────────────────────

impl LightPort for HardwareAdapter {
    fn start_flame(&mut self) {
        self.lights.start_flame();
    }

    fn start_strobe(&mut self) {
        self.lights.start_strobe();
    }

    fn stop(&mut self) {
        self.lights.stop();
    }

    fn tick(&mut self, now_ms: u32) {
        self.lights.tick(now_ms);
    }
}

// ── StatusPort implementation ─────────────────────────────────

impl StatusPort for HardwareAdapter {
    fn set_fault_led(&mut self, on: bool) {
        self.fault_led.set(on);
    }
}
