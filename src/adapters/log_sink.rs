//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! The integration tests swap in a recording sink through the same trait.

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

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry { lux, duty } => {
                info!("TELEM | lux={:.2} | duty={}", lux, duty);
            }
            AppEvent::Started { config } => {
                info!(
                    "START | thresholds={:.1}..{:.1} | mode={}",
                    config.thresholds.min_lux,
                    config.thresholds.max_lux,
                    config.mode.as_str(),
                );
            }
            AppEvent::LinkUp => {
                info!("LINK  | broker connected");
            }
            AppEvent::LinkDown => {
                info!("LINK  | broker disconnected");
            }
            AppEvent::FadeStarted { from, to } => {
                info!("FADE  | {} -> {}", from, to);
            }
            AppEvent::SignalStarted { blinks } => {
                info!("BLINK | {} cycle(s)", blinks);
            }
            AppEvent::ThresholdsUpdated { min_lux, max_lux } => {
                info!("CONF  | thresholds={:.2}..{:.2}", min_lux, max_lux);
            }
            AppEvent::ModeChanged { mode } => {
                info!("CONF  | mode={}", mode.as_str());
            }
            AppEvent::MessageRejected { error } => {
                warn!("RJCT  | {}", error);
            }
            AppEvent::PersistFailed => {
                warn!("SAVE  | persist failed, running on previous settings");
            }
            AppEvent::AckDropped { topic } => {
                warn!("DROP  | ack for {} lost, broker offline", topic);
            }
        }
    }
}
