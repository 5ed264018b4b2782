//! Jackbox firmware — main entry point.
//!
//! Wires the ESP-IDF peripherals to the port traits and runs the
//! cooperative control loop:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter (servo · mp3 · lights · fault LED)          │
//! │  LogEventSink    (EventSink)                                 │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │          PropService (pure logic)                  │      │
//! │  │  DebouncedInput ×2 · lifecycle controller          │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::info;

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, IOPin, Input, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;

use jackbox::adapters::hardware::HardwareAdapter;
use jackbox::adapters::log_sink::LogEventSink;
use jackbox::app::service::PropService;
use jackbox::config::PropConfig;
use jackbox::drivers::fault_led::FaultLed;
use jackbox::drivers::hw;
use jackbox::drivers::light_fx::LightFx;
use jackbox::drivers::mp3::Mp3Driver;
use jackbox::drivers::servo::ServoDriver;
use jackbox::input::{ActiveLevel, DebouncedInput, InputConfig, PullMode};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("jackbox v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration (fixed for the process lifetime) ─────
    let config = PropConfig::default();
    config.validate()?;
    info!(
        "config: {}",
        serde_json::to_string(&config).unwrap_or_default()
    );

    // ── 3. Input pins, pulls applied at construction ──────────
    let peripherals = Peripherals::take().context("peripherals already taken")?;

    // Assignments mirror crate::pins — the typed singletons below are
    // the same GPIOs.
    let button_pin = input_pin(
        PinDriver::input(peripherals.pins.gpio4.downgrade())?,
        PullMode::Up,
    )?;
    let receptor_pin = input_pin(
        PinDriver::input(peripherals.pins.gpio7.downgrade())?,
        PullMode::Up,
    )?;

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

    // ── 4. Output peripherals and drivers ─────────────────────
    hw::init_outputs()?;

    let mut mp3 = Mp3Driver::new(config.audio_volume);
    mp3.begin();

    let mut hw_adapter = HardwareAdapter::new(
        ServoDriver::new(),
        mp3,
        LightFx::new(config.led_count, config.led_brightness),
        FaultLed::new(),
    );
    let mut sink = LogEventSink::new();

    // ── 5. Service ────────────────────────────────────────────
    let tick_ms = config.control_loop_interval_ms;
    let mut service = PropService::new(config, button, receptor);
    service.begin(hw::now_ms(), &mut sink)?;

    info!("jackbox running ...");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        service.tick(hw::now_ms(), &mut hw_adapter, &mut sink);
        FreeRtos::delay_ms(tick_ms);
    }
}

/// Apply the configured pull resistor to a freshly constructed input
/// pin.  A rejected pin/pull combination is fatal at startup.
fn input_pin(
    mut pin: PinDriver<'static, AnyIOPin, Input>,
    pull: PullMode,
) -> Result<PinDriver<'static, AnyIOPin, Input>> {
    let hal_pull = match pull {
        PullMode::Floating => Pull::Floating,
        PullMode::Up => Pull::Up,
        PullMode::Down => Pull::Down,
    };
    pin.set_pull(hal_pull)
        .context("input pin pull configuration rejected")?;
    Ok(pin)
}
