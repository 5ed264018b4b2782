//! MP3 cue player driver (DFPlayer-mini class module on UART1).
//!
//! The module streams tracks from its own SD card; this driver only
//! sends 10-byte command frames and keeps playback bookkeeping so the
//! controller can ask "is a cue still running".  There is no reliable
//! busy feedback line, so completion is tracked against each cue's
//! nominal duration.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes command frames out through the UART helper.
//! On host/test: frames go nowhere; the duration bookkeeping still runs,
//! which is what the tests exercise.

use log::debug;

use crate::drivers::hw;
use crate::fsm::CueId;

// ── DFPlayer command bytes ────────────────────────────────────

const CMD_SET_VOLUME: u8 = 0x06;
const CMD_RESET: u8 = 0x0C;
const CMD_PLAY_MP3_FOLDER: u8 = 0x12;
const CMD_STOP: u8 = 0x16;

/// The module's volume scale tops out at 30.
const VOLUME_MAX: u8 = 30;

// ── Cue catalog ───────────────────────────────────────────────

/// Per-cue track metadata: MP3-folder track number, nominal duration,
/// and the volume numerator applied on top of the master volume
/// (`master * scale / 30`).
struct TrackMeta {
    track: u16,
    duration_ms: u32,
    volume_scale: u8,
}

fn track_meta(cue: CueId) -> TrackMeta {
    match cue {
        CueId::Overture => TrackMeta {
            track: 1,
            duration_ms: 40_000,
            volume_scale: VOLUME_MAX,
        },
        CueId::Laugh => TrackMeta {
            track: 2,
            duration_ms: 3936,
            volume_scale: VOLUME_MAX,
        },
        CueId::Ready => TrackMeta {
            track: 3,
            duration_ms: 1568,
            volume_scale: VOLUME_MAX,
        },
        CueId::Waiting => TrackMeta {
            track: 4,
            duration_ms: 567,
            volume_scale: VOLUME_MAX,
        },
        CueId::Adjustment => TrackMeta {
            track: 5,
            duration_ms: 433,
            volume_scale: VOLUME_MAX,
        },
        // The theme loops for minutes; played at half volume so it sits
        // under the prop instead of announcing it.
        CueId::Theme => TrackMeta {
            track: 6,
            duration_ms: 206_968,
            volume_scale: 15,
        },
    }
}

// ── Driver ────────────────────────────────────────────────────

pub struct Mp3Driver {
    master_volume: u8,
    now_ms: u32,
    /// Timestamp at which the current cue ends, if one is playing.
    busy_until_ms: Option<u32>,
}

impl Mp3Driver {
    pub fn new(master_volume: u8) -> Self {
        Self {
            master_volume: master_volume.min(VOLUME_MAX),
            now_ms: 0,
            busy_until_ms: None,
        }
    }

    /// Reset the module and apply the master volume.  Call once at
    /// startup, after the UART is up.
    pub fn begin(&mut self) {
        self.send(CMD_RESET, 0);
        self.send(CMD_SET_VOLUME, u16::from(self.master_volume));
    }

    /// Start a cue.  When `blocking` the call busy-waits — servicing
    /// only this driver — until the cue's nominal duration has elapsed.
    pub fn play(&mut self, cue: CueId, blocking: bool) {
        let meta = track_meta(cue);
        let volume = u16::from(self.master_volume) * u16::from(meta.volume_scale)
            / u16::from(VOLUME_MAX);
        self.send(CMD_SET_VOLUME, volume);
        self.send(CMD_PLAY_MP3_FOLDER, meta.track);
        self.busy_until_ms = Some(self.now_ms.wrapping_add(meta.duration_ms));
        debug!("mp3: cue {cue:?} (track {}, {}ms)", meta.track, meta.duration_ms);

        if blocking {
            self.wait_for_completion();
        }
    }

    /// Halt playback immediately.  Idempotent.
    pub fn stop(&mut self) {
        self.send(CMD_STOP, 0);
        self.busy_until_ms = None;
    }

    /// A cue is still within its nominal duration.
    pub fn is_busy(&self) -> bool {
        self.busy_until_ms.is_some()
    }

    /// Per-cycle update: advance the clock and retire finished cues.
    pub fn tick(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
        if let Some(until) = self.busy_until_ms {
            // Wrapping-aware "now >= until": the remaining time, seen as
            // a wrapped difference, flips past half the u32 range.
            if until.wrapping_sub(now_ms) > u32::MAX / 2 || until == now_ms {
                self.busy_until_ms = None;
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Busy-wait until the running cue completes.  Everything except
    /// this driver's own clock is suspended for the duration.
    fn wait_for_completion(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            while self.is_busy() {
                // SAFETY: plain FreeRTOS delay from task context.
                unsafe { esp_idf_svc::sys::vTaskDelay(1) };
                self.tick(hw::now_ms());
            }
        }
        #[cfg(not(target_os = "espidf"))]
        {
            // Host simulation: fast-forward the driver clock.
            if let Some(until) = self.busy_until_ms.take() {
                self.now_ms = until;
            }
        }
    }

    /// Encode and send one 10-byte DFPlayer frame.
    fn send(&self, cmd: u8, arg: u16) {
        let hi = (arg >> 8) as u8;
        let lo = (arg & 0xFF) as u8;
        // Checksum covers version through the argument bytes.
        let sum = 0xFFu16 + 0x06 + u16::from(cmd) + u16::from(hi) + u16::from(lo);
        let checksum = 0u16.wrapping_sub(sum);
        let frame = [
            0x7E,
            0xFF,
            0x06,
            cmd,
            0x00,
            hi,
            lo,
            (checksum >> 8) as u8,
            (checksum & 0xFF) as u8,
            0xEF,
        ];
        hw::mp3_send(&frame);
    }
}
