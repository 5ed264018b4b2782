//! Application service — the per-cycle orchestrator.
//!
//! [`PropService`] owns the lifecycle controller and both debounced
//! inputs.  Within a tick the ordering is fixed and significant:
//!
//! 1. sample both inputs,
//! 2. tick the three collaborators so playback/animations advance,
//! 3. evaluate the controller against the just-updated snapshots and
//!    apply the one-shot effects it returns.
//!
//! Reversing (1) and (3) would let the controller act on stale input.
//! All I/O flows through port traits, making the entire service testable
//! with mock adapters.
//!
//! ```text
//!  button ─┐                                  ┌──▶ ActuatorPort
//!          ├──▶ ┌──────────────────────────┐ ─┼──▶ AudioPort
//!  receptor┘    │       PropService         │ ├──▶ LightPort
//!               │  DebouncedInput ×2 · FSM  │ └──▶ StatusPort
//!               └──────────────────────────┘ ───▶ EventSink
//! ```

use embedded_hal::digital::InputPin;
use log::{info, warn};

use crate::config::PropConfig;
use crate::error::Result;
use crate::fsm::states::build_state_table;
use crate::fsm::{Controller, Effect, Effects, StateId};
use crate::input::DebouncedInput;

use super::events::AppEvent;
use super::ports::{ActuatorPort, AudioPort, EventSink, LightPort, Playback, StatusPort};

/// The application service orchestrates all domain logic.
pub struct PropService<B, R> {
    controller: Controller,
    button: DebouncedInput<B>,
    receptor: DebouncedInput<R>,
    config: PropConfig,
}

impl<B: InputPin, R: InputPin> PropService<B, R> {
    /// Construct the service from configuration and the two wrapped
    /// input pins.  Does **not** touch hardware — call
    /// [`begin`](Self::begin) next.
    pub fn new(
        config: PropConfig,
        button: DebouncedInput<B>,
        receptor: DebouncedInput<R>,
    ) -> Self {
        let controller = Controller::new(
            build_state_table(),
            StateId::Installed,
            0,
            config.warmup_announcement,
        );
        Self {
            controller,
            button,
            receptor,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Seed both inputs from an immediate raw read and announce the
    /// initial state.  A seed failure is fatal at startup.
    pub fn begin(&mut self, now_ms: u32, sink: &mut impl EventSink) -> Result<()> {
        self.button.begin(now_ms)?;
        self.receptor.begin(now_ms)?;
        sink.emit(&AppEvent::Started(self.controller.current_state()));
        info!(
            "prop service started in {:?}",
            self.controller.current_state()
        );
        Ok(())
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// The `hw` parameter satisfies all four collaborator ports — this
    /// avoids a many-way mutable borrow while keeping the port boundary
    /// explicit.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl ActuatorPort + AudioPort + LightPort + StatusPort),
        sink: &mut impl EventSink,
    ) {
        // 1. Sample the sensors.
        self.button.sample(now_ms);
        self.receptor.sample(now_ms);

        // 2. Advance the collaborators.
        ActuatorPort::tick(hw, now_ms);
        AudioPort::tick(hw, now_ms);
        LightPort::tick(hw, now_ms);

        // 3. Evaluate the controller and apply its effects.
        let prev = self.controller.current_state();
        let fx = self.controller.tick(
            now_ms,
            self.button.snapshot(),
            self.receptor.snapshot(),
            &self.config,
        );
        self.apply_effects(&fx, hw, sink);

        let state = self.controller.current_state();
        if state != prev {
            sink.emit(&AppEvent::StateChanged { from: prev, to: state });
            if state == StateId::Crashed {
                sink.emit(&AppEvent::Crashed { from: prev });
            }
        }
    }

    /// Inject a transition request outside the per-tick evaluation.
    ///
    /// Runs the controller's validated transition path — an edge not in
    /// the table crashes the prop — and applies the resulting effects.
    pub fn request_state(
        &mut self,
        to: StateId,
        now_ms: u32,
        hw: &mut (impl ActuatorPort + AudioPort + LightPort + StatusPort),
        sink: &mut impl EventSink,
    ) {
        let prev = self.controller.current_state();
        let fx = self.controller.request(to, now_ms);
        self.apply_effects(&fx, hw, sink);

        let state = self.controller.current_state();
        if state != prev {
            sink.emit(&AppEvent::StateChanged { from: prev, to: state });
            if state == StateId::Crashed {
                sink.emit(&AppEvent::Crashed { from: prev });
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current lifecycle state.
    pub fn state(&self) -> StateId {
        self.controller.current_state()
    }

    /// Milliseconds spent in the current state as of the last tick.
    pub fn ms_in_state(&self) -> u32 {
        self.controller.ms_in_state()
    }

    /// The live (immutable) configuration.
    pub fn config(&self) -> &PropConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate the controller's one-shot effects into port calls.
    fn apply_effects(
        &self,
        fx: &Effects,
        hw: &mut (impl ActuatorPort + AudioPort + LightPort + StatusPort),
        sink: &mut impl EventSink,
    ) {
        for effect in fx {
            match *effect {
                Effect::Release => {
                    if let Err(e) = hw.release() {
                        warn!("activator release failed: {e}");
                        sink.emit(&AppEvent::ActuatorFault(e));
                    }
                }
                Effect::Restrain => {
                    if let Err(e) = hw.restrain() {
                        warn!("activator restrain failed: {e}");
                        sink.emit(&AppEvent::ActuatorFault(e));
                    }
                }
                Effect::PlayCue { cue, blocking } => {
                    let playback = if blocking {
                        Playback::Blocking
                    } else {
                        Playback::NonBlocking
                    };
                    hw.play(cue, playback);
                }
                Effect::StopAudio => AudioPort::stop(hw),
                Effect::StartFlame => hw.start_flame(),
                Effect::StartStrobe => hw.start_strobe(),
                Effect::StopLight => LightPort::stop(hw),
                Effect::FaultLed(on) => hw.set_fault_led(on),
            }
        }
    }
}
