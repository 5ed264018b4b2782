//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production).  The prop has no other
//! reporting channel.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => info!("EVENT | started in {state:?}"),
            AppEvent::StateChanged { from, to } => {
                info!("EVENT | {from:?} -> {to:?}");
            }
            AppEvent::Crashed { from } => {
                warn!("EVENT | crashed (was {from:?}); power-cycle to recover");
            }
            AppEvent::ActuatorFault(e) => warn!("EVENT | actuator fault: {e}"),
        }
    }
}
