//! Outbound application events.
//!
//! The [`PropService`](super::service::PropService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them — the production adapter just
//! logs to serial; the device has no other reporting channel.

use crate::error::ActuatorError;
use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the initial state).
    Started(StateId),

    /// The controller transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The controller entered the absorbing crash state.
    Crashed { from: StateId },

    /// An actuator command failed; the transition completed anyway.
    ActuatorFault(ActuatorError),
}
