//! Jackbox firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module, so the library and
//! its whole test suite build on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod input;
pub mod pins;

// The cfg-gated hardware layers: real peripherals on ESP-IDF, in-memory
// simulation everywhere else.
pub mod adapters;
pub mod drivers;
