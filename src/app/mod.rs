//! Application layer: the per-cycle service, its port traits, and the
//! structured events it emits.

pub mod events;
pub mod ports;
pub mod service;
