//! Debounced digital input.
//!
//! One algorithm serves both front-panel sensors: the push button
//! (active LOW behind a pull-up) and the PIR motion receptor (active
//! HIGH).  Electrical polarity is folded away at construction so the
//! controller only ever reasons about "active"/"inactive" and edges.
//!
//! ## Debounce model
//!
//! A raw reading only becomes a stable-state candidate once at least
//! `debounce_ms` has elapsed since the last *accepted* change.  Raw
//! transitions inside that window are discarded outright — a glitch
//! shorter than the window never reaches the stable state, and two
//! flips inside one window collapse into whatever level the line shows
//! once the window reopens.

use embedded_hal::digital::InputPin;

use crate::error::InputError;
use crate::fsm::context::InputSnapshot;

/// Which electrical level counts as "active" for this input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// Pull-resistor selection, applied where the concrete pin is built
/// (the HAL models pulls at pin-construction time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullMode {
    Floating,
    Up,
    Down,
}

/// Fixed per-input configuration, set once at startup.
#[derive(Debug, Clone, Copy)]
pub struct InputConfig {
    pub active: ActiveLevel,
    pub pull: PullMode,
    pub debounce_ms: u32,
}

/// A debounced digital input over any [`InputPin`].
pub struct DebouncedInput<P> {
    pin: P,
    active: ActiveLevel,
    pull: PullMode,
    debounce_ms: u32,

    /// Debounced logical state ("active" in the configured polarity).
    state: bool,
    /// Stable state flipped during the most recent `sample` call.
    changed: bool,
    /// Timestamp of the most recent `sample` call (ms, wrapping).
    sampled_at_ms: u32,
    /// Timestamp of the last accepted stable-state change (ms, wrapping).
    changed_at_ms: u32,
}

impl<P: InputPin> DebouncedInput<P> {
    /// Wrap a pin.  No hardware side effects; call [`begin`](Self::begin)
    /// before the first control cycle.
    pub fn new(pin: P, config: InputConfig) -> Self {
        Self {
            pin,
            active: config.active,
            pull: config.pull,
            debounce_ms: config.debounce_ms,
            state: false,
            changed: false,
            sampled_at_ms: 0,
            changed_at_ms: 0,
        }
    }

    /// Seed the stable state from one immediate raw read — no debounce
    /// wait on the first sample.  A read failure here is a construction
    /// error, fatal at startup.
    pub fn begin(&mut self, now_ms: u32) -> Result<(), InputError> {
        let level = self
            .pin
            .is_high()
            .map_err(|_| InputError::SeedReadFailed)?;
        self.state = self.level_is_active(level);
        self.changed = false;
        self.sampled_at_ms = now_ms;
        self.changed_at_ms = now_ms;
        Ok(())
    }

    /// Per-cycle update.  Returns the (possibly updated) stable state.
    ///
    /// The debounce window is measured from the last accepted change to
    /// the *previous* sample; while it is open the raw line is not even
    /// read and `changed` reports false.
    pub fn sample(&mut self, now_ms: u32) -> bool {
        if self.sampled_at_ms.wrapping_sub(self.changed_at_ms) >= self.debounce_ms {
            let prev = self.state;
            // A failed read keeps the previous impression: no edge, no
            // stable-state corruption.
            if let Ok(level) = self.pin.is_high() {
                self.state = self.level_is_active(level);
            }
            self.changed = self.state != prev;
            if self.changed {
                self.changed_at_ms = now_ms;
            }
        } else {
            self.changed = false;
        }
        self.sampled_at_ms = now_ms;
        self.state
    }

    // ── Queries (pure, valid any time after `begin`) ──────────

    /// Debounced state is active (pressed / motion present).
    pub fn is_active(&self) -> bool {
        self.state
    }

    /// Debounced state is inactive (released / clear).
    pub fn is_inactive(&self) -> bool {
        !self.state
    }

    /// The stable state became active during the last `sample`.
    pub fn became_active(&self) -> bool {
        self.state && self.changed
    }

    /// The stable state became inactive during the last `sample`.
    pub fn became_inactive(&self) -> bool {
        !self.state && self.changed
    }

    /// Active, and has been for at least `ms`.
    pub fn active_for(&self, ms: u32) -> bool {
        self.state && self.sampled_at_ms.wrapping_sub(self.changed_at_ms) >= ms
    }

    /// Inactive, and has been for at least `ms`.
    pub fn inactive_for(&self, ms: u32) -> bool {
        !self.state && self.sampled_at_ms.wrapping_sub(self.changed_at_ms) >= ms
    }

    /// Timestamp of the last accepted stable-state change.
    pub fn last_change_ms(&self) -> u32 {
        self.changed_at_ms
    }

    /// Pull mode this input was configured with (applied by the code
    /// constructing the concrete pin).
    pub fn pull(&self) -> PullMode {
        self.pull
    }

    /// Plain-data view for the controller: no generics, no pin access.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            active: self.state,
            rose: self.became_active(),
            fell: self.became_inactive(),
            held_ms: self.sampled_at_ms.wrapping_sub(self.changed_at_ms),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn level_is_active(&self, level_high: bool) -> bool {
        match self.active {
            ActiveLevel::High => level_high,
            ActiveLevel::Low => !level_high,
        }
    }
}
