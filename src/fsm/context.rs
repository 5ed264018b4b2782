//! Shared read-only context handed to every state handler.
//!
//! The controller never touches pins or drivers: the service samples the
//! two debounced inputs first, derives one [`InputSnapshot`] per sensor,
//! and passes them in together with the elapsed time in the current state
//! and the (immutable) configuration.

use crate::config::PropConfig;

/// A point-in-time view of one debounced input.
///
/// `rose`/`fell` are one-cycle edge flags; `held_ms` is the time since the
/// last accepted stable-state change, whichever level the input is at.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    /// Debounced logical state (pressed / motion present).
    pub active: bool,
    /// Became active during this cycle's sample.
    pub rose: bool,
    /// Became inactive during this cycle's sample.
    pub fell: bool,
    /// Milliseconds since the last stable-state change.
    pub held_ms: u32,
}

impl InputSnapshot {
    /// Steady inactive line, no recent change.
    pub const fn idle() -> Self {
        Self {
            active: false,
            rose: false,
            fell: false,
            held_ms: u32::MAX,
        }
    }
}

/// Everything a state's per-tick update handler may consult.
pub struct EvalContext<'a> {
    /// Milliseconds elapsed since the current state was entered.
    pub ms_in_state: u32,
    /// The push button, polarity-abstracted.
    pub button: InputSnapshot,
    /// The motion receptor, polarity-abstracted.
    pub receptor: InputSnapshot,
    /// Timing thresholds and flags, fixed at startup.
    pub config: &'a PropConfig,
}
