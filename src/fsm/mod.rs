//! Function-pointer finite state machine for the prop lifecycle.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  StateTable                                                   │
//! │  ┌──────────────┬───────────┬────────────────────────────┐    │
//! │  │ StateId      │ on_enter  │ on_update                  │    │
//! │  ├──────────────┼───────────┼────────────────────────────┤    │
//! │  │ Installed    │ —         │ fn(ctx,fx)->Option<Request>│    │
//! │  │ Prepared     │ fn(fx)    │ ...                        │    │
//! │  │ ...          │           │                            │    │
//! │  └──────────────┴───────────┴────────────────────────────┘    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.  A
//! returned [`Request`] is resolved through one central `transition`
//! routine that validates the requested edge against [`LEGAL_EDGES`]; an
//! edge not in the table reroutes to `Crashed` instead of being applied.
//! Transitions do not command hardware — they append one-shot [`Effect`]s
//! to a fixed-capacity list which the service layer applies afterwards.

pub mod context;
pub mod states;

use context::{EvalContext, InputSnapshot};
use log::{error, info};

use crate::config::PropConfig;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all lifecycle states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    /// Fresh boot; leaves on the first tick.
    Installed = 0,
    /// Lid open, activator free — waiting for the operator to set up.
    Prepared = 1,
    /// Activator restrained; operator walks away.
    Mounted = 2,
    /// Armed: flame idle effect running, watching for motion.
    Equipped = 3,
    /// Sprung: lid released, laugh and strobe running.
    Triggered = 4,
    /// Show over; waiting for the button to be idle before re-arming.
    Stopped = 5,
    /// Absorbing fault state — heartbeat only.
    Crashed = 6,
    /// Override: a long press forced a transition; the release edge is
    /// still pending and must be consumed before normal evaluation.
    HoldingForButtonPress = 7,
    /// Symmetric override: a pending press edge must be consumed.
    HoldingForButtonRelease = 8,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 9;

    /// Convert a `u8` index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Crashed` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Installed,
            1 => Self::Prepared,
            2 => Self::Mounted,
            3 => Self::Equipped,
            4 => Self::Triggered,
            5 => Self::Stopped,
            6 => Self::Crashed,
            7 => Self::HoldingForButtonPress,
            8 => Self::HoldingForButtonRelease,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Crashed
            }
        }
    }

    /// Transient override state carrying a resume target.
    pub fn is_override(self) -> bool {
        matches!(
            self,
            Self::HoldingForButtonPress | Self::HoldingForButtonRelease
        )
    }
}

// ---------------------------------------------------------------------------
// Effects — one-shot collaborator commands emitted on state edges
// ---------------------------------------------------------------------------

/// Audio cue identifiers.  Track numbers and nominal durations live with
/// the MP3 driver; the controller only names the cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueId {
    /// Long warm-up announcement, played blocking before operation.
    Overture,
    /// Triggered laugh.
    Laugh,
    /// Readiness announcement (catalogued, not used by the lifecycle).
    Ready,
    /// "Wait a minute" — played when the activator is restrained.
    Waiting,
    /// "Come on" — played whenever the prop returns to the set-up phase.
    Adjustment,
    /// Theme song accompanying the armed flame idle.
    Theme,
}

/// A one-shot command for a collaborator subsystem.
///
/// Emitted by transitions, applied exactly once by the service.  All
/// target operations are idempotent, so replays from the absorbing
/// `Crashed` entry path are harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Move the servo to the released position.
    Release,
    /// Move the servo to the restrained position.
    Restrain,
    /// Start an audio cue; `blocking` suspends the cycle until it ends.
    PlayCue { cue: CueId, blocking: bool },
    /// Halt audio playback immediately.
    StopAudio,
    /// Begin the flame idle light effect.
    StartFlame,
    /// Begin the strobe light effect.
    StartStrobe,
    /// Turn all ring LEDs off.
    StopLight,
    /// Drive the fault heartbeat LED (Crashed only).
    FaultLed(bool),
}

/// Fixed-capacity effect list filled during one tick.
pub type Effects = heapless::Vec<Effect, 8>;

/// Append an effect; overflow is a table-authoring bug, not a runtime
/// condition, so it only trips a debug assertion.
pub(crate) fn emit(fx: &mut Effects, effect: Effect) {
    if fx.push(effect).is_err() {
        debug_assert!(false, "effect list overflow");
    }
}

// ---------------------------------------------------------------------------
// Transition requests
// ---------------------------------------------------------------------------

/// What a state's update handler asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Ordinary transition to the named state.
    Goto(StateId),
    /// Apply `target`'s arrival effects now, then hold in
    /// [`StateId::HoldingForButtonPress`] until the button releases.
    HoldViaPress(StateId),
    /// Symmetric: hold in [`StateId::HoldingForButtonRelease`] until the
    /// button is pressed.
    HoldViaRelease(StateId),
    /// Leave the current override state for its stored resume target.
    Resume,
}

// ---------------------------------------------------------------------------
// Legal edge table
// ---------------------------------------------------------------------------

/// Every permitted (from, to) pair.  Three families are implicit and not
/// listed: any state → `Crashed`, override entry (handled by the
/// `HoldVia*` requests after validating the underlying edge), and
/// override resolution to the stored resume target.
pub const LEGAL_EDGES: &[(StateId, StateId)] = &[
    (StateId::Installed, StateId::Prepared),
    (StateId::Prepared, StateId::Mounted),
    (StateId::Mounted, StateId::Equipped),
    (StateId::Mounted, StateId::Prepared),
    (StateId::Equipped, StateId::Triggered),
    (StateId::Triggered, StateId::Stopped),
    (StateId::Stopped, StateId::Prepared),
];

fn edge_is_legal(from: StateId, to: StateId) -> bool {
    to == StateId::Crashed || LEGAL_EDGES.contains(&(from, to))
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for the per-tick update handler.
/// Returns `Some(request)` to ask for a transition, or `None` to stay.
pub type StateUpdateFn = fn(&EvalContext, &mut Effects) -> Option<Request>;

/// Signature for a state's global entry hook, run on every arrival
/// regardless of the edge taken.
pub type StateEnterFn = fn(&mut Effects);

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single lifecycle state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateEnterFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// Controller engine
// ---------------------------------------------------------------------------

/// The lifecycle controller.
///
/// Owns the state table, the current state, the time of entry into it,
/// and — only while an override state is active — the state to resume
/// into once the pending button edge arrives.
pub struct Controller {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Resume target; `Some` exactly while `current` is an override state.
    resume: Option<StateId>,
    /// Timestamp (ms, wrapping) at which the current state was entered.
    entered_at_ms: u32,
    /// Timestamp of the most recent tick.
    now_ms: u32,
    /// Play the blocking overture on the way out of `Installed`.
    warmup_announcement: bool,
}

impl Controller {
    /// Construct a controller with the given state table, starting in
    /// `initial` with its entry timestamp at `now_ms`.
    pub fn new(
        table: [StateDescriptor; StateId::COUNT],
        initial: StateId,
        now_ms: u32,
        warmup_announcement: bool,
    ) -> Self {
        Self {
            table,
            current: initial as usize,
            resume: None,
            entered_at_ms: now_ms,
            now_ms,
            warmup_announcement,
        }
    }

    /// Advance the controller by one tick.
    ///
    /// Evaluates the current state's exit conditions against the two
    /// (already sampled) input snapshots and the elapsed time in state,
    /// resolves at most one transition, and returns the effects to apply.
    pub fn tick(
        &mut self,
        now_ms: u32,
        button: InputSnapshot,
        receptor: InputSnapshot,
        config: &PropConfig,
    ) -> Effects {
        self.now_ms = now_ms;
        let mut fx = Effects::new();

        let ctx = EvalContext {
            ms_in_state: now_ms.wrapping_sub(self.entered_at_ms),
            button,
            receptor,
            config,
        };
        let request = (self.table[self.current].on_update)(&ctx, &mut fx);

        if let Some(request) = request {
            self.apply(request, &mut fx);
        }
        fx
    }

    /// Inject a transition request from outside the per-tick evaluation.
    ///
    /// This is the same validated path `tick` uses: an edge not in the
    /// table reroutes to `Crashed` with the crash effects.
    pub fn request(&mut self, to: StateId, now_ms: u32) -> Effects {
        self.now_ms = now_ms;
        let mut fx = Effects::new();
        self.transition(to, &mut fx);
        fx
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Milliseconds the controller has spent in the current state, as of
    /// the most recent tick.
    pub fn ms_in_state(&self) -> u32 {
        self.now_ms.wrapping_sub(self.entered_at_ms)
    }

    /// The stored resume target while an override state is active.
    pub fn resume_target(&self) -> Option<StateId> {
        self.resume
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn apply(&mut self, request: Request, fx: &mut Effects) {
        match request {
            Request::Goto(to) => self.transition(to, fx),
            Request::HoldViaPress(target) => {
                self.hold(target, StateId::HoldingForButtonPress, fx);
            }
            Request::HoldViaRelease(target) => {
                self.hold(target, StateId::HoldingForButtonRelease, fx);
            }
            Request::Resume => match self.resume.take() {
                // Arrival effects already ran when the override was
                // entered; resuming is a plain move with a timer reset.
                Some(target) => {
                    info!(
                        "jack resumes from {} to {}",
                        self.table[self.current].name, self.table[target as usize].name
                    );
                    self.enter(target);
                }
                None => {
                    error!("override state without a resume target");
                    self.transition(StateId::Crashed, fx);
                }
            },
        }
    }

    /// Run the full (validated) transition to `target`, then park in the
    /// override state with `target` recorded for resumption.
    fn hold(&mut self, target: StateId, via: StateId, fx: &mut Effects) {
        self.transition(target, fx);
        if self.current_state() != StateId::Crashed {
            self.resume = Some(target);
            self.enter(via);
        }
    }

    /// Validate and perform one transition: edge effects first, then the
    /// destination's global entry hook, then the state/timer update.
    fn transition(&mut self, to: StateId, fx: &mut Effects) {
        let from = self.current_state();
        let to = if edge_is_legal(from, to) {
            to
        } else {
            error!(
                "illegal transition {} -> {}",
                self.table[from as usize].name, self.table[to as usize].name
            );
            StateId::Crashed
        };

        info!(
            "jack goes from {} to {}",
            self.table[from as usize].name, self.table[to as usize].name
        );

        states::edge_effects(from, to, self.warmup_announcement, fx);
        if let Some(enter) = self.table[to as usize].on_enter {
            enter(fx);
        }
        self.enter(to);
    }

    fn enter(&mut self, to: StateId) {
        self.current = to as usize;
        if !to.is_override() {
            self.resume = None;
        }
        self.entered_at_ms = self.now_ms;
    }
}
