//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them; today they go to the serial log.

use crate::config::{LightConfig, Mode};
use crate::error::Error;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The controller initialised with its boot configuration.
    Started { config: LightConfig },

    /// The messaging transport came up; subscriptions were restored.
    LinkUp,

    /// The messaging transport dropped.
    LinkDown,

    /// Periodic illuminance sample, same cadence as the telemetry publish.
    Telemetry { lux: f32, duty: u8 },

    /// A new fade transition began.
    FadeStarted { from: u8, to: u8 },

    /// A connection-signal blink pattern was queued.
    SignalStarted { blinks: u8 },

    /// Thresholds were validated, applied, and persisted.
    ThresholdsUpdated { min_lux: f32, max_lux: f32 },

    /// The brightness direction changed and was persisted.
    ModeChanged { mode: Mode },

    /// An inbound message was rejected before it changed any state.
    MessageRejected { error: Error },

    /// A configuration change could not be persisted; the in-memory state
    /// was rolled back to match the durable view.
    PersistFailed,

    /// An acknowledgment was dropped because the link was down.
    AckDropped { topic: &'static str },
}
