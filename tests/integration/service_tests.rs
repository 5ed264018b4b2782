//! End-to-end lifecycle scenarios driven through raw pin levels.
//!
//! Each test owns a [`Rig`]: the real service with scriptable input
//! lines, a recording mock for all four collaborator ports, and a
//! recording event sink.  Time advances in 5ms control ticks, so the
//! 25ms debounce windows behave exactly as on the device.

use std::cell::Cell;
use std::rc::Rc;

use crate::mock_hw::{HwCall, MockHardware, RecordingSink, SharedLine};

use jackbox::app::events::AppEvent;
use jackbox::app::service::PropService;
use jackbox::config::PropConfig;
use jackbox::error::ActuatorError;
use jackbox::fsm::{CueId, StateId};
use jackbox::input::{ActiveLevel, DebouncedInput, InputConfig, PullMode};

const TICK_MS: u32 = 5;

// ── Test rig ──────────────────────────────────────────────────

struct Rig {
    service: PropService<SharedLine, SharedLine>,
    /// Electrical button level: LOW = pressed (pull-up wiring).
    button_line: Rc<Cell<bool>>,
    /// Electrical receptor level: HIGH = motion.
    receptor_line: Rc<Cell<bool>>,
    hw: MockHardware,
    sink: RecordingSink,
    now: u32,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(PropConfig::default())
    }

    fn with_config(config: PropConfig) -> Self {
        let (button_pin, button_line) = SharedLine::new(true); // idle: released
        let (receptor_pin, receptor_line) = SharedLine::new(false); // idle: clear

        let button = DebouncedInput::new(
            button_pin,
            InputConfig {
                active: ActiveLevel::Low,
                pull: PullMode::Up,
                debounce_ms: config.button_debounce_ms,
            },
        );
        let receptor = DebouncedInput::new(
            receptor_pin,
            InputConfig {
                active: ActiveLevel::High,
                pull: PullMode::Up,
                debounce_ms: config.receptor_debounce_ms,
            },
        );

        let service = PropService::new(config, button, receptor);
        let mut rig = Self {
            service,
            button_line,
            receptor_line,
            hw: MockHardware::new(),
            sink: RecordingSink::new(),
            now: 0,
        };
        rig.service.begin(0, &mut rig.sink).unwrap();
        rig
    }

    fn step(&mut self) {
        self.now += TICK_MS;
        self.service.tick(self.now, &mut self.hw, &mut self.sink);
    }

    fn run_for(&mut self, ms: u32) {
        let end = self.now + ms;
        while self.now < end {
            self.step();
        }
    }

    /// Tick until the service reaches `state`, asserting it happens
    /// within `max_ms`.
    fn step_until(&mut self, state: StateId, max_ms: u32) {
        let deadline = self.now + max_ms;
        while self.service.state() != state {
            assert!(
                self.now < deadline,
                "did not reach {state:?} within {max_ms}ms (still {:?})",
                self.service.state()
            );
            self.step();
        }
    }

    fn press(&mut self) {
        self.button_line.set(false);
    }

    fn release(&mut self) {
        self.button_line.set(true);
    }

    fn motion(&mut self, present: bool) {
        self.receptor_line.set(present);
    }

    /// Installed → Prepared → Mounted via one press/release gesture,
    /// stopping on the tick that enters Mounted.
    fn into_mounted(&mut self) {
        self.step();
        assert_eq!(self.service.state(), StateId::Prepared);
        self.press();
        self.run_for(50); // stable press; Prepared ignores it
        assert_eq!(self.service.state(), StateId::Prepared);
        self.release();
        self.step_until(StateId::Mounted, 100);
    }

    /// All the way to Equipped via the natural settle path.
    fn into_equipped(&mut self) {
        self.into_mounted();
        self.run_for(5000);
        assert_eq!(self.service.state(), StateId::Mounted);
        self.step();
        assert_eq!(self.service.state(), StateId::Equipped);
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_prepares_the_prop() {
    let mut rig = Rig::new();
    assert_eq!(rig.service.state(), StateId::Installed);
    assert_eq!(rig.sink.events, [AppEvent::Started(StateId::Installed)]);

    rig.step();
    assert_eq!(rig.service.state(), StateId::Prepared);
    // Prepared entry: free the activator and invite adjustment.
    assert_eq!(rig.hw.count(HwCall::Release), 1);
    assert_eq!(rig.hw.count_plays(CueId::Adjustment), 1);
    assert!(rig.sink.events.contains(&AppEvent::StateChanged {
        from: StateId::Installed,
        to: StateId::Prepared,
    }));
}

#[test]
fn warmup_overture_plays_blocking_before_anything_else() {
    let config = PropConfig {
        warmup_announcement: true,
        ..PropConfig::default()
    };
    let mut rig = Rig::with_config(config);
    rig.step();
    assert_eq!(
        rig.hw.calls[0],
        HwCall::Play {
            cue: CueId::Overture,
            blocking: true
        }
    );
    assert_eq!(rig.service.state(), StateId::Prepared);
}

// ── Mounting ──────────────────────────────────────────────────

#[test]
fn release_gesture_mounts_and_restrains() {
    let mut rig = Rig::new();
    rig.into_mounted();
    assert_eq!(rig.hw.count(HwCall::Restrain), 1);
    assert_eq!(rig.hw.count_plays(CueId::Waiting), 1);
}

#[test]
fn second_gesture_returns_to_prepared() {
    let mut rig = Rig::new();
    rig.into_mounted();
    rig.hw.clear();

    rig.press();
    rig.run_for(50);
    rig.release();
    rig.step_until(StateId::Prepared, 100);
    assert!(rig.hw.count(HwCall::Release) >= 1);
    assert_eq!(rig.hw.count_plays(CueId::Adjustment), 1);
}

// ── Scenario: natural arming after the settle window ──────────

#[test]
fn mounted_arms_after_settle_with_no_actuator_motion() {
    let mut rig = Rig::new();
    rig.into_mounted();
    rig.hw.clear();

    rig.run_for(5000);
    assert_eq!(rig.service.state(), StateId::Mounted);

    rig.step(); // elapsed is now strictly past the settle threshold
    assert_eq!(rig.service.state(), StateId::Equipped);
    assert_eq!(rig.hw.count(HwCall::StartFlame), 1);
    assert_eq!(rig.hw.count_plays(CueId::Theme), 1);
    assert_eq!(rig.hw.count(HwCall::Release), 0);
    assert_eq!(rig.hw.count(HwCall::Restrain), 0);
}

#[test]
fn mounted_waits_for_the_receptor_to_clear() {
    let mut rig = Rig::new();
    rig.into_mounted();
    rig.motion(true);

    rig.run_for(7000);
    assert_eq!(rig.service.state(), StateId::Mounted);

    rig.motion(false);
    rig.step_until(StateId::Equipped, 100);
}

// ── Scenario: long hold forces arming through the override ────

#[test]
fn long_hold_arms_early_without_double_effects() {
    let mut rig = Rig::new();
    rig.into_mounted();
    rig.hw.clear();

    rig.press();
    rig.step_until(StateId::HoldingForButtonPress, 3200);
    assert_eq!(rig.hw.count(HwCall::StartFlame), 1);
    assert_eq!(rig.hw.count_plays(CueId::Theme), 1);

    // Keep holding: nothing more happens.
    rig.run_for(500);
    assert_eq!(rig.service.state(), StateId::HoldingForButtonPress);

    // Release resolves the override without replaying arrival effects.
    rig.release();
    rig.step_until(StateId::Equipped, 100);
    assert_eq!(rig.hw.count(HwCall::StartFlame), 1);
    assert_eq!(rig.hw.count_plays(CueId::Theme), 1);

    // The consumed release edge must not count as a trigger press.
    rig.run_for(200);
    assert_eq!(rig.service.state(), StateId::Equipped);
}

// ── Scenario: motion springs the trap ─────────────────────────

#[test]
fn motion_triggers_with_exactly_one_release() {
    let mut rig = Rig::new();
    rig.into_equipped();
    rig.hw.clear();

    rig.motion(true);
    rig.step_until(StateId::Triggered, 200);
    assert_eq!(rig.hw.count(HwCall::Release), 1);
    assert_eq!(rig.hw.count(HwCall::StartStrobe), 1);
    assert_eq!(rig.hw.count_plays(CueId::Laugh), 1);
}

#[test]
fn button_press_also_triggers() {
    let mut rig = Rig::new();
    rig.into_equipped();

    rig.press();
    rig.step_until(StateId::Triggered, 200);
}

// ── Scenario: show times out into Stopped ─────────────────────

#[test]
fn triggered_times_out_and_kills_the_lights() {
    let mut rig = Rig::new();
    rig.into_equipped();
    rig.motion(true);
    rig.step_until(StateId::Triggered, 200);
    rig.motion(false);
    rig.hw.clear();

    rig.run_for(10_000);
    assert_eq!(rig.service.state(), StateId::Triggered);

    rig.step();
    assert_eq!(rig.service.state(), StateId::Stopped);
    assert_eq!(rig.hw.count(HwCall::StopLight), 1);

    // Button is idle, so the next tick starts the cycle over.
    rig.step();
    assert_eq!(rig.service.state(), StateId::Prepared);
}

// ── Scenario: illegal transition fails safe ───────────────────

#[test]
fn illegal_request_crashes_and_silences_once() {
    let mut rig = Rig::new();
    rig.into_equipped();
    rig.motion(true);
    rig.step_until(StateId::Triggered, 200);
    rig.motion(false);
    rig.press();
    rig.step_until(StateId::Stopped, 200);
    rig.hw.clear();

    let now = rig.now;
    rig.service
        .request_state(StateId::Equipped, now, &mut rig.hw, &mut rig.sink);

    assert_eq!(rig.service.state(), StateId::Crashed);
    assert_eq!(rig.hw.count(HwCall::StopAudio), 1);
    assert_eq!(rig.hw.count(HwCall::StopLight), 1);
    assert!(rig.sink.events.contains(&AppEvent::Crashed {
        from: StateId::Stopped
    }));

    // Absorbing: only the heartbeat from here on.
    rig.hw.clear();
    rig.run_for(2000);
    assert_eq!(rig.service.state(), StateId::Crashed);
    assert!(rig.hw.count(HwCall::FaultLed(true)) >= 1);
    assert!(rig.hw.count(HwCall::FaultLed(false)) >= 1);
    assert_eq!(rig.hw.count(HwCall::Release), 0);
    assert_eq!(rig.hw.count(HwCall::StartFlame), 0);
}

// ── Collaborator failure is non-fatal ─────────────────────────

#[test]
fn actuator_fault_is_reported_but_does_not_stall_the_lifecycle() {
    let mut rig = Rig::new();
    rig.hw.fail_actuator = true;

    rig.step();
    assert_eq!(rig.service.state(), StateId::Prepared);
    assert!(rig.sink.events.contains(&AppEvent::ActuatorFault(
        ActuatorError::PwmWriteFailed
    )));

    // The prop keeps sequencing despite the dead servo.
    rig.press();
    rig.run_for(50);
    rig.release();
    rig.step_until(StateId::Mounted, 100);
}

// ── Full happy-path cycle ─────────────────────────────────────

#[test]
fn full_cycle_returns_to_prepared() {
    let mut rig = Rig::new();
    rig.into_equipped();
    rig.motion(true);
    rig.step_until(StateId::Triggered, 200);
    rig.motion(false);
    rig.run_for(10_005);
    rig.step_until(StateId::Prepared, 100);

    // And it can mount again.
    rig.press();
    rig.run_for(50);
    rig.release();
    rig.step_until(StateId::Mounted, 100);
}
