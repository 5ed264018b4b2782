//! Port traits — the boundary between the lifecycle core and hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PropService (domain)
//! ```
//!
//! The three collaborator subsystems (activator servo, audio cue player,
//! light effect renderer) plus the fault LED are consumed exclusively
//! through these traits, so the whole service runs on the host against
//! mock adapters.  Every command is idempotent; the service may replay
//! one without harm.
//!
//! All `tick` operations are invoked once per scheduling cycle, before
//! the controller evaluates, so collaborator animations and playback
//! advance on fresh time.

use crate::error::ActuatorError;
use crate::fsm::CueId;

/// How a cue should be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Fire-and-forget; playback advances via `tick`.
    NonBlocking,
    /// Do not return until playback finishes.  The implementation keeps
    /// servicing its own device during the wait; everything else in the
    /// cycle — lights, inputs, the controller — is suspended.  There is
    /// no cancellation and no timeout beyond the cue's own duration.
    Blocking,
}

// ───────────────────────────────────────────────────────────────
// Activator (release servo)
// ───────────────────────────────────────────────────────────────

/// Position control of the release mechanism.
///
/// Failures are non-fatal to the controller: the service logs them and
/// emits [`AppEvent::ActuatorFault`](super::events::AppEvent) but the
/// transition completes regardless.
pub trait ActuatorPort {
    /// Move to the released position.  Idempotent.
    fn release(&mut self) -> Result<(), ActuatorError>;

    /// Move to the restrained position.  Idempotent.
    fn restrain(&mut self) -> Result<(), ActuatorError>;

    /// Per-cycle update.
    fn tick(&mut self, now_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Audio cue player
// ───────────────────────────────────────────────────────────────

/// Sample playback with per-cue volume scaling.
pub trait AudioPort {
    /// Start a cue.  See [`Playback`] for the blocking contract.
    fn play(&mut self, cue: CueId, playback: Playback);

    /// Halt playback immediately.  Idempotent.
    fn stop(&mut self);

    /// A cue is still playing.
    fn is_busy(&self) -> bool;

    /// Per-cycle update; advances playback bookkeeping.
    fn tick(&mut self, now_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Light effect renderer
// ───────────────────────────────────────────────────────────────

/// Procedural ring effects.  Rendering continues autonomously once
/// started, until `stop` or another `start_*`.
pub trait LightPort {
    /// Begin the flame idle effect.  Idempotent.
    fn start_flame(&mut self);

    /// Begin the strobe effect.  Idempotent.
    fn start_strobe(&mut self);

    /// All ring LEDs off.  Idempotent.
    fn stop(&mut self);

    /// Per-cycle update; renders the next frame when due.
    fn tick(&mut self, now_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Fault indication
// ───────────────────────────────────────────────────────────────

/// The crash heartbeat LED — the device's only operator-facing fault
/// channel.
pub trait StatusPort {
    fn set_fault_led(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// The service emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log in
/// production, a recording vector in tests).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
