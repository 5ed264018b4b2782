//! Procedural light effects for the addressable LED ring.
//!
//! Two effects, both rendered at 25 FPS from `tick()`:
//!
//! - **Flame** — the armed idle.  One flame per three LEDs; each flame's
//!   heat ramps up by a random increment until saturation, then cools
//!   back to zero and re-ignites.  The centre LED shows the full heat
//!   colour, its neighbours roughly two thirds of it.
//! - **Strobe** — the triggered dance.  Dashes of palette colour sweep
//!   the ring, with period, width, and speed wobbling on slow triangle
//!   waves; the frame is lit only every fourth render for the hard
//!   strobe feel.
//!
//! Integer math only — no float trig, no `libm`.  Randomness comes from
//! a tiny xorshift generator; exact colour sequences do not matter.

use crate::drivers::hw;

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// Upper bound on ring size; the config validator enforces it.
pub const MAX_LEDS: usize = 64;

/// Render cadence.
const FPS: u32 = 25;
const FRAME_MS: u32 = 1000 / FPS;

/// Halloween strobe palette, 16 entries indexed by the top nibble of an
/// 8-bit hue.
const PALETTE: [Rgb; 16] = [
    PURPLE, PURPLE, PURPLE, PURPLE,
    ORANGE, ORANGE, ORANGE, ORANGE,
    PURPLE, PURPLE, PURPLE, PURPLE,
    GREEN, GREEN, GREEN, WHITE,
];

const PURPLE: Rgb = (0x66, 0x11, 0xFF);
const ORANGE: Rgb = (0xFF, 0x66, 0x00);
const GREEN: Rgb = (0x00, 0xFF, 0x11);
const WHITE: Rgb = (0xCC, 0xCC, 0xCC);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectMode {
    Off,
    Flame,
    Strobe,
}

#[derive(Debug, Clone, Copy, Default)]
struct Flame {
    heat: u8,
    step: u8,
    cooling: bool,
}

/// Minimal xorshift32 — good enough for fire flicker.
struct XorShift32(u32);

impl XorShift32 {
    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    /// Uniform-ish value in `lo..hi`.
    fn range_u8(&mut self, lo: u8, hi: u8) -> u8 {
        lo + (self.next() % u32::from(hi - lo)) as u8
    }
}

pub struct LightFx {
    count: usize,
    brightness: u8,

    mode: EffectMode,
    mode_brightness: u8,
    frame: heapless::Vec<Rgb, MAX_LEDS>,
    last_frame_ms: u32,

    flames: heapless::Vec<Flame, { MAX_LEDS / 3 }>,
    rng: XorShift32,

    // Strobe bookkeeping.
    strobe_gate: u8,
    strobe_counter: u8,
    strobe_hue: u8,
    strobe_position: i32,
}

impl LightFx {
    pub fn new(count: u8, brightness: u8) -> Self {
        let count = (count as usize).min(MAX_LEDS);
        let mut frame = heapless::Vec::new();
        let _ = frame.resize(count, (0, 0, 0));
        let mut flames = heapless::Vec::new();
        let _ = flames.resize(count / 3, Flame::default());

        Self {
            count,
            brightness,
            mode: EffectMode::Off,
            mode_brightness: 0,
            frame,
            last_frame_ms: 0,
            flames,
            rng: XorShift32(0x2A65_D3C1),
            strobe_gate: 0,
            strobe_counter: 0,
            strobe_hue: 0,
            strobe_position: 0,
        }
    }

    /// Begin the flame idle.  Idempotent — a second call while the flame
    /// already burns changes nothing.
    pub fn start_flame(&mut self) {
        if self.mode == EffectMode::Flame {
            return;
        }
        for i in 0..self.flames.len() {
            self.ignite(i);
        }
        self.mode = EffectMode::Flame;
        // Flame runs dimmed so the strobe reads as the climax.
        self.mode_brightness = scale8(self.brightness, 100);
    }

    /// Begin the strobe.  Idempotent.
    pub fn start_strobe(&mut self) {
        if self.mode == EffectMode::Strobe {
            return;
        }
        self.mode = EffectMode::Strobe;
        self.mode_brightness = self.brightness;
    }

    /// Everything off, immediately.  Idempotent.
    pub fn stop(&mut self) {
        self.mode = EffectMode::Off;
        for led in &mut self.frame {
            *led = (0, 0, 0);
        }
        self.push_frame();
    }

    /// Per-cycle update; renders the next frame when one is due.
    pub fn tick(&mut self, now_ms: u32) {
        if self.mode == EffectMode::Off {
            return;
        }
        if now_ms.wrapping_sub(self.last_frame_ms) < FRAME_MS {
            return;
        }
        self.last_frame_ms = now_ms;

        match self.mode {
            EffectMode::Flame => self.burn(),
            EffectMode::Strobe => self.pulse(now_ms),
            EffectMode::Off => {}
        }
        self.push_frame();
    }

    /// Current effect mode.
    pub fn mode(&self) -> EffectMode {
        self.mode
    }

    /// Raw (unscaled) framebuffer, for inspection.
    pub fn frame(&self) -> &[Rgb] {
        &self.frame
    }

    // ── Flame ─────────────────────────────────────────────────

    fn ignite(&mut self, index: usize) {
        let heat = self.rng.range_u8(160, 255);
        let step = self.rng.range_u8(1, 70);
        let flame = &mut self.flames[index];
        flame.heat = flame.heat.saturating_add(heat);
        flame.step = step;
        flame.cooling = false;
    }

    fn burn(&mut self) {
        for i in 0..self.flames.len() {
            let flame = self.flames[i];
            if flame.cooling {
                let heat = flame.heat.saturating_sub(flame.step);
                self.flames[i].heat = heat;
                if heat == 0 {
                    self.ignite(i);
                }
            } else {
                let heat = flame.heat.saturating_add(flame.step);
                self.flames[i].heat = heat;
                if heat == 0xFF {
                    self.flames[i].cooling = true;
                }
            }
        }
        for (i, flame) in self.flames.iter().enumerate() {
            let base = i * 3;
            let centre = heat_colour(flame.heat);
            let side = heat_colour((u16::from(flame.heat) * 2 / 3) as u8);
            if base + 2 < self.count {
                self.frame[base] = side;
                self.frame[base + 1] = centre;
                self.frame[base + 2] = side;
            }
        }
    }

    // ── Strobe ────────────────────────────────────────────────

    fn pulse(&mut self, now_ms: u32) {
        for led in &mut self.frame {
            *led = (0, 0, 0);
        }

        // Lit every fourth frame only.
        self.strobe_gate = (self.strobe_gate + 1) % 4;
        if self.strobe_gate != 0 {
            return;
        }

        let dash_period = i32::from(tri_wave(now_ms, 7500, 4, 10)); // ~8 bpm
        let dash_width = dash_period / 4 + 1;
        let mut dash_speed = i32::from(tri_wave(now_ms, 2000, 1, dash_period as u8)); // ~30 bpm
        if dash_speed >= dash_period / 2 {
            dash_speed -= dash_period;
        }
        let hue_delta = scale8(tri_wave(now_ms, 30_000, 0, 255), 130);

        self.strobe_hue = self.strobe_hue.wrapping_add(1);

        self.strobe_counter += 1;
        if self.strobe_counter >= 2 {
            self.strobe_counter = 0;
            self.strobe_position += dash_speed;
            if self.strobe_position >= dash_period {
                while self.strobe_position >= dash_period {
                    self.strobe_position -= dash_period;
                }
                self.strobe_hue = self.strobe_hue.wrapping_sub(hue_delta);
            } else if self.strobe_position < 0 {
                while self.strobe_position < 0 {
                    self.strobe_position += dash_period;
                }
                self.strobe_hue = self.strobe_hue.wrapping_add(hue_delta);
            }
        }

        let mut hue = self.strobe_hue;
        let mut i = self.strobe_position;
        while i < self.count as i32 {
            let colour = PALETTE[usize::from(hue >> 4)];
            let mut p = i;
            let mut w = 0;
            while w < dash_width && (p as usize) < self.count {
                self.frame[p as usize] = colour;
                p += 1;
                w += 1;
            }
            hue = hue.wrapping_add(hue_delta);
            i += dash_period;
        }
    }

    // ── Output ────────────────────────────────────────────────

    fn push_frame(&self) {
        let mut scaled: heapless::Vec<Rgb, MAX_LEDS> = heapless::Vec::new();
        for &(r, g, b) in &self.frame {
            let _ = scaled.push((
                scale8(r, self.mode_brightness),
                scale8(g, self.mode_brightness),
                scale8(b, self.mode_brightness),
            ));
        }
        hw::strip_write(&scaled);
    }
}

// ── Colour / waveform helpers ─────────────────────────────────

/// `value * scale / 256`, the classic 8-bit brightness scaler.
fn scale8(value: u8, scale: u8) -> u8 {
    ((u16::from(value) * u16::from(scale)) >> 8) as u8
}

/// Black-body ramp: black → red → yellow → white over an 8-bit heat.
fn heat_colour(heat: u8) -> Rgb {
    let t192 = (u16::from(heat) * 191 / 255) as u8;
    let ramp = (t192 & 0x3F) << 2;
    if t192 & 0x80 != 0 {
        (255, 255, ramp)
    } else if t192 & 0x40 != 0 {
        (255, ramp, 0)
    } else {
        (ramp, 0, 0)
    }
}

/// Triangle wave between `lo` and `hi` with the given period — a
/// trig-free stand-in for the usual sine beat generators.
fn tri_wave(now_ms: u32, period_ms: u32, lo: u8, hi: u8) -> u8 {
    if hi <= lo {
        return lo;
    }
    let span = u32::from(hi - lo);
    let pos = now_ms % period_ms;
    let half = period_ms / 2;
    let ramp = if pos < half {
        pos * span / half
    } else {
        (period_ms - pos) * span / half
    };
    lo + ramp as u8
}
