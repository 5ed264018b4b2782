//! System configuration parameters
//!
//! All tunable parameters for the Jackbox prop.  Supplied once at startup
//! and never mutated while the control loop runs; pin assignments live in
//! [`crate::pins`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core prop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropConfig {
    // --- Inputs ---
    /// Button debounce interval (milliseconds)
    pub button_debounce_ms: u32,
    /// Motion receptor debounce interval (milliseconds)
    pub receptor_debounce_ms: u32,

    // --- Lifecycle thresholds ---
    /// Minimum settle time in Mounted before arming (milliseconds)
    pub mount_settle_ms: u32,
    /// Button hold duration that forces arming from Mounted (milliseconds)
    pub hold_override_ms: u32,
    /// Time in Triggered after which the prop stops on its own (milliseconds)
    pub triggered_timeout_ms: u32,

    // --- Audio ---
    /// Master volume on the MP3 module's 0-30 scale
    pub audio_volume: u8,
    /// Play the blocking overture announcement when leaving Installed
    pub warmup_announcement: bool,

    // --- Lights ---
    /// Number of LEDs on the ring
    pub led_count: u8,
    /// Master brightness (0-255)
    pub led_brightness: u8,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
}

impl Default for PropConfig {
    fn default() -> Self {
        Self {
            // Inputs
            button_debounce_ms: 25,
            receptor_debounce_ms: 25,

            // Lifecycle
            mount_settle_ms: 5000,
            hold_override_ms: 3000,
            triggered_timeout_ms: 10_000,

            // Audio
            audio_volume: 30,
            warmup_announcement: false,

            // Lights
            led_count: 12,
            led_brightness: 50,

            // Timing
            control_loop_interval_ms: 5, // 200 Hz — well under the debounce window
        }
    }
}

impl PropConfig {
    /// Range-check the configuration.  Called once in `main` before the
    /// control loop starts; a bad value here is fatal at startup.
    pub fn validate(&self) -> Result<()> {
        if self.button_debounce_ms == 0 || self.receptor_debounce_ms == 0 {
            return Err(Error::Config("debounce interval must be non-zero"));
        }
        if self.audio_volume > 30 {
            return Err(Error::Config("audio volume exceeds the module's 0-30 range"));
        }
        if self.led_count == 0 || self.led_count > crate::drivers::light_fx::MAX_LEDS as u8 {
            return Err(Error::Config("led count out of range"));
        }
        if self.control_loop_interval_ms == 0 {
            return Err(Error::Config("control loop interval must be non-zero"));
        }
        if self.control_loop_interval_ms >= self.button_debounce_ms {
            return Err(Error::Config(
                "control loop must tick faster than the debounce window",
            ));
        }
        Ok(())
    }
}
