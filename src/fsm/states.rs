//! Concrete state handlers, edge effects, and the table builder.
//!
//! Each state is a row of plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap.  Exit conditions are checked in documented row
//! order, first match wins, at most one transition per tick.
//!
//! ```text
//!  INSTALLED ──▶ PREPARED ──[button released]──▶ MOUNTED
//!                   ▲                              │ │ │
//!                   │◀────────[button released]────┘ │ │
//!                   │                                │ │
//!                   │        [settled & clear]───────┘ │ [held 3s]
//!                   │               ▼                  ▼
//!                   │           EQUIPPED ◀──(hold override, release
//!                   │               │          edge pending)
//!                   │     [motion or press]
//!                   │               ▼
//!                   │           TRIGGERED
//!                   │               │ [10s or press]
//!                   │               ▼
//!                   └──[button idle]── STOPPED
//!
//!  Any illegal edge ──▶ CRASHED (absorbing, heartbeat only)
//! ```

use super::context::EvalContext;
use super::{CueId, Effect, Effects, Request, StateDescriptor, StateId, emit};
use log::warn;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Installed
        StateDescriptor {
            id: StateId::Installed,
            name: "installed",
            on_enter: None,
            on_update: installed_update,
        },
        // Index 1 — Prepared
        StateDescriptor {
            id: StateId::Prepared,
            name: "prepared",
            on_enter: Some(prepared_enter),
            on_update: prepared_update,
        },
        // Index 2 — Mounted
        StateDescriptor {
            id: StateId::Mounted,
            name: "mounted",
            on_enter: None,
            on_update: mounted_update,
        },
        // Index 3 — Equipped
        StateDescriptor {
            id: StateId::Equipped,
            name: "equipped",
            on_enter: None,
            on_update: equipped_update,
        },
        // Index 4 — Triggered
        StateDescriptor {
            id: StateId::Triggered,
            name: "triggered",
            on_enter: None,
            on_update: triggered_update,
        },
        // Index 5 — Stopped
        StateDescriptor {
            id: StateId::Stopped,
            name: "stopped",
            on_enter: None,
            on_update: stopped_update,
        },
        // Index 6 — Crashed
        StateDescriptor {
            id: StateId::Crashed,
            name: "crashed",
            on_enter: Some(crashed_enter),
            on_update: crashed_update,
        },
        // Index 7 — HoldingForButtonPress
        StateDescriptor {
            id: StateId::HoldingForButtonPress,
            name: "holding-for-button-press",
            on_enter: None,
            on_update: holding_for_press_update,
        },
        // Index 8 — HoldingForButtonRelease
        StateDescriptor {
            id: StateId::HoldingForButtonRelease,
            name: "holding-for-button-release",
            on_enter: None,
            on_update: holding_for_release_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Edge effects — the (from, to) → effect-list table
// ═══════════════════════════════════════════════════════════════════════════

/// One-shot effects carried by a specific edge, emitted before the
/// destination's entry hook.  Unlisted pairs carry none.
pub(crate) fn edge_effects(from: StateId, to: StateId, warmup: bool, fx: &mut Effects) {
    match (from, to) {
        (StateId::Installed, StateId::Prepared) => {
            // The overture must not interleave with any other prop
            // behaviour, at the cost of suspending sensing for its
            // duration.
            if warmup {
                emit(
                    fx,
                    Effect::PlayCue {
                        cue: CueId::Overture,
                        blocking: true,
                    },
                );
            }
        }
        (StateId::Prepared, StateId::Mounted) => {
            emit(fx, Effect::Restrain);
            emit(
                fx,
                Effect::PlayCue {
                    cue: CueId::Waiting,
                    blocking: false,
                },
            );
        }
        (StateId::Mounted, StateId::Equipped) => {
            emit(
                fx,
                Effect::PlayCue {
                    cue: CueId::Theme,
                    blocking: false,
                },
            );
            emit(fx, Effect::StartFlame);
        }
        (StateId::Mounted, StateId::Prepared) => {
            emit(fx, Effect::Release);
        }
        (StateId::Equipped, StateId::Triggered) => {
            emit(fx, Effect::Release);
            emit(
                fx,
                Effect::PlayCue {
                    cue: CueId::Laugh,
                    blocking: false,
                },
            );
            emit(fx, Effect::StartStrobe);
        }
        (StateId::Triggered, StateId::Stopped) => {
            emit(fx, Effect::StopLight);
        }
        _ => {}
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Global entry hooks
// ═══════════════════════════════════════════════════════════════════════════

/// Every arrival in Prepared frees the activator and invites adjustment,
/// whatever edge brought us here.
fn prepared_enter(fx: &mut Effects) {
    emit(fx, Effect::Release);
    emit(
        fx,
        Effect::PlayCue {
            cue: CueId::Adjustment,
            blocking: false,
        },
    );
}

fn crashed_enter(fx: &mut Effects) {
    warn!("jack crashed — silencing audio and lights");
    emit(fx, Effect::StopAudio);
    emit(fx, Effect::StopLight);
}

// ═══════════════════════════════════════════════════════════════════════════
//  Per-state update handlers
// ═══════════════════════════════════════════════════════════════════════════

fn installed_update(_ctx: &EvalContext, _fx: &mut Effects) -> Option<Request> {
    // Ready to go.
    Some(Request::Goto(StateId::Prepared))
}

fn prepared_update(ctx: &EvalContext, _fx: &mut Effects) -> Option<Request> {
    // The operator signals the activator is set by releasing the button.
    if ctx.button.fell {
        return Some(Request::Goto(StateId::Mounted));
    }
    None
}

fn mounted_update(ctx: &EvalContext, _fx: &mut Effects) -> Option<Request> {
    // Armed once the operator has had time to clear the sensor's field.
    if ctx.ms_in_state > ctx.config.mount_settle_ms && !ctx.receptor.active {
        return Some(Request::Goto(StateId::Equipped));
    }
    // A tap sends the prop back to the adjustment phase.
    if ctx.button.fell {
        return Some(Request::Goto(StateId::Prepared));
    }
    // A long hold skips the settle wait; the release edge is consumed by
    // the override so Equipped does not see it as a trigger.
    if ctx.button.active && ctx.button.held_ms >= ctx.config.hold_override_ms {
        return Some(Request::HoldViaPress(StateId::Equipped));
    }
    None
}

fn equipped_update(ctx: &EvalContext, _fx: &mut Effects) -> Option<Request> {
    if ctx.receptor.rose || ctx.button.rose {
        return Some(Request::Goto(StateId::Triggered));
    }
    None
}

fn triggered_update(ctx: &EvalContext, _fx: &mut Effects) -> Option<Request> {
    if ctx.ms_in_state > ctx.config.triggered_timeout_ms || ctx.button.rose {
        return Some(Request::Goto(StateId::Stopped));
    }
    None
}

fn stopped_update(ctx: &EvalContext, _fx: &mut Effects) -> Option<Request> {
    // Steady level, not an edge: whoever silenced the prop may still be
    // holding the button down.
    if !ctx.button.active {
        return Some(Request::Goto(StateId::Prepared));
    }
    None
}

fn crashed_update(ctx: &EvalContext, fx: &mut Effects) -> Option<Request> {
    // 100ms blip once a second — the device's only fault channel.
    emit(fx, Effect::FaultLed(ctx.ms_in_state % 1000 < 100));
    None
}

fn holding_for_press_update(ctx: &EvalContext, _fx: &mut Effects) -> Option<Request> {
    if ctx.button.fell {
        return Some(Request::Resume);
    }
    None
}

fn holding_for_release_update(ctx: &EvalContext, _fx: &mut Effects) -> Option<Request> {
    if ctx.button.rose {
        return Some(Request::Resume);
    }
    None
}
