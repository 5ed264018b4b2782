//! Mock hardware for integration tests.
//!
//! Records every collaborator call so tests can assert on the full
//! command history, plus scriptable raw input lines to drive the
//! debounced inputs without GPIO.

use core::convert::Infallible;
use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::digital::InputPin;

use jackbox::app::events::AppEvent;
use jackbox::app::ports::{ActuatorPort, AudioPort, EventSink, LightPort, Playback, StatusPort};
use jackbox::error::ActuatorError;
use jackbox::fsm::CueId;

// ── Scriptable raw input line ─────────────────────────────────

/// An input pin whose electrical level is a shared cell the test flips.
pub struct SharedLine(Rc<Cell<bool>>);

impl SharedLine {
    /// Returns the pin and the handle that controls its level.
    pub fn new(level: bool) -> (Self, Rc<Cell<bool>>) {
        let cell = Rc::new(Cell::new(level));
        (Self(Rc::clone(&cell)), cell)
    }
}

impl embedded_hal::digital::ErrorType for SharedLine {
    type Error = Infallible;
}

impl InputPin for SharedLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }
}

// ── Collaborator call record ──────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCall {
    Release,
    Restrain,
    Play { cue: CueId, blocking: bool },
    StopAudio,
    StartFlame,
    StartStrobe,
    StopLight,
    FaultLed(bool),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    /// When set, release/restrain report a PWM failure.
    pub fail_actuator: bool,
    audio_busy: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            fail_actuator: false,
            audio_busy: false,
        }
    }

    pub fn count(&self, call: HwCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn count_plays(&self, cue: CueId) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HwCall::Play { cue: p, .. } if *p == cue))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockHardware {
    fn release(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(HwCall::Release);
        if self.fail_actuator {
            return Err(ActuatorError::PwmWriteFailed);
        }
        Ok(())
    }

    fn restrain(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(HwCall::Restrain);
        if self.fail_actuator {
            return Err(ActuatorError::PwmWriteFailed);
        }
        Ok(())
    }

    fn tick(&mut self, _now_ms: u32) {}
}

impl AudioPort for MockHardware {
    fn play(&mut self, cue: CueId, playback: Playback) {
        self.calls.push(HwCall::Play {
            cue,
            blocking: playback == Playback::Blocking,
        });
        // A blocking play has already completed by the time it returns.
        self.audio_busy = playback == Playback::NonBlocking;
    }

    fn stop(&mut self) {
        self.calls.push(HwCall::StopAudio);
        self.audio_busy = false;
    }

    fn is_busy(&self) -> bool {
        self.audio_busy
    }

    fn tick(&mut self, _now_ms: u32) {}
}

impl LightPort for MockHardware {
    fn start_flame(&mut self) {
        self.calls.push(HwCall::StartFlame);
    }

    fn start_strobe(&mut self) {
        self.calls.push(HwCall::StartStrobe);
    }

    fn stop(&mut self) {
        self.calls.push(HwCall::StopLight);
    }

    fn tick(&mut self, _now_ms: u32) {}
}

impl StatusPort for MockHardware {
    fn set_fault_led(&mut self, on: bool) {
        self.calls.push(HwCall::FaultLed(on));
    }
}

// ── Recording event sink ──────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
