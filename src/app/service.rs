//! Application controller — the hexagonal core.
//!
//! [`Controller`] owns the light configuration, the fade engine, and the
//! connection signaler.  It exposes a hardware-agnostic API; all I/O flows
//! through port traits injected at call sites, so the whole control path
//! runs under test with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       Controller        │
//! ActuatorPort ◀──│  brightness · fade ·    │◀──▶ TransportPort
//!  StoragePort ◀──│  signaler · thresholds  │
//!                 └────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::{
    LightConfig, Mode, Thresholds, KEY_MAX_LUX, KEY_MIN_LUX, KEY_NIGHT_MODE, NS_CONFIG,
    NS_THRESHOLDS,
};
use crate::control::brightness::{compute_brightness, percent_to_duty};
use crate::control::fade::{Fader, Signaler};
use crate::error::Error;
use crate::rpc::channels::LinkEvent;
use crate::rpc::messages::{
    mode_set_ack, mode_swapped_ack, parse_message, telemetry_message, thresholds_updated_ack,
    ParseError, ERR_INVALID_THRESHOLDS, ERR_MISSING_THRESHOLD, ERR_MODE_SAVE, ERR_THRESHOLDS_SAVE,
    ERR_UNKNOWN_MESSAGE, TOPIC_CONFIG_ERROR, TOPIC_CONFIG_SUCCESS, TOPIC_LIGHT_ERROR,
    TOPIC_LIGHT_SUCCESS, TOPIC_LUX, TOPIC_DIRECTION, TOPIC_THRESHOLDS,
};

use super::commands::{ControlMessage, ModeRequest};
use super::events::AppEvent;
use super::ports::{
    ActuatorPort, ConfigError, EventSink, SensorPort, StorageError, StoragePort, TransportPort,
};

/// Minimum spacing between telemetry publishes.
pub const TELEMETRY_INTERVAL_MS: u32 = 5_000;

/// Blink count used to signal a fresh broker connection.
pub const CONNECT_BLINKS: u8 = 3;

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// Orchestrates ambient tracking, remote configuration, and telemetry.
pub struct Controller {
    config: LightConfig,
    fader: Fader,
    signaler: Signaler,
    last_telemetry_ms: u32,
    tick_count: u64,
    /// Collapses the per-tick degenerate-range warning to one line.
    range_fault_logged: bool,
}

impl Controller {
    /// Construct the controller.  The strips start dark; the first tick
    /// fades them toward the ambient target.
    pub fn new(config: LightConfig) -> Self {
        Self {
            config,
            fader: Fader::new(0),
            signaler: Signaler::new(),
            last_telemetry_ms: 0,
            tick_count: 0,
            range_fault_logged: false,
        }
    }

    /// Read the persisted configuration, falling back to defaults for any
    /// key that is absent or unreadable.
    pub fn load_config(storage: &impl StoragePort) -> LightConfig {
        let defaults = Thresholds::default();
        let thresholds = Thresholds::new(
            load_f32(storage, NS_THRESHOLDS, KEY_MIN_LUX, defaults.min_lux),
            load_f32(storage, NS_THRESHOLDS, KEY_MAX_LUX, defaults.max_lux),
        );
        let mode = Mode::from_night_flag(load_bool(storage, NS_CONFIG, KEY_NIGHT_MODE, false));
        LightConfig { thresholds, mode }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            config: self.config,
        });
        info!(
            "Controller started: {:.1}..{:.1} lux, {} mode",
            self.config.thresholds.min_lux,
            self.config.thresholds.max_lux,
            self.config.mode.as_str()
        );
    }

    /// Queue a blink pattern on the strips (connection feedback).
    pub fn signal(&mut self, blinks: u8, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::SignalStarted { blinks });
        self.signaler.start(blinks);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: sample → target → fade → telemetry.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + ActuatorPort),
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Sample ambient light
        let lux = hw.read_lux();

        // 2. Connection signaling has priority over ambient tracking
        self.signaler.tick(&mut self.fader, now_ms);

        // 3. Ambient level → fade target
        if !self.signaler.is_active() {
            match compute_brightness(lux, &self.config.thresholds, self.config.mode) {
                Ok(percent) => {
                    let duty = percent_to_duty(percent);
                    if duty != self.fader.target() {
                        sink.emit(&AppEvent::FadeStarted {
                            from: self.fader.current(),
                            to: duty,
                        });
                        self.fader.begin_fade(duty, now_ms);
                    }
                }
                Err(e) => {
                    // Hold the last output; corrupt thresholds must not
                    // slam the strips to an arbitrary level.
                    if !self.range_fault_logged {
                        warn!("Brightness held: {}", e);
                        self.range_fault_logged = true;
                    }
                }
            }
        }

        // 4. Advance the fade and drive the strips
        if let Some(duty) = self.fader.tick(now_ms) {
            hw.set_duty(duty);
        }

        // 5. Rate-limited telemetry
        if now_ms.wrapping_sub(self.last_telemetry_ms) >= TELEMETRY_INTERVAL_MS {
            self.last_telemetry_ms = now_ms;
            sink.emit(&AppEvent::Telemetry {
                lux,
                duty: self.fader.current(),
            });
            if transport.is_connected() {
                let msg = telemetry_message(lux);
                if let Err(e) = transport.publish(TOPIC_LUX, &msg) {
                    warn!("Telemetry publish failed: {}", e);
                }
            } else {
                debug!("Telemetry skipped, broker offline");
            }
        }
    }

    // ── Message handling ──────────────────────────────────────

    /// Process one inbound broker message and publish the matching
    /// acknowledgment.  Messages on unrelated topics are ignored.
    pub fn handle_message(
        &mut self,
        topic: &str,
        payload: &str,
        storage: &mut impl StoragePort,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        let Some(parsed) = parse_message(topic, payload) else {
            debug!("Ignoring message on unrelated topic {:?}", topic);
            return;
        };

        match parsed {
            Ok(ControlMessage::SetThresholds(t)) => match self.update_thresholds(t, storage) {
                Ok(()) => {
                    sink.emit(&AppEvent::ThresholdsUpdated {
                        min_lux: t.min_lux,
                        max_lux: t.max_lux,
                    });
                    let ack = thresholds_updated_ack(t.min_lux, t.max_lux);
                    publish_ack(transport, TOPIC_LIGHT_SUCCESS, &ack, sink);
                }
                Err(ConfigError::InvalidRange) => {
                    sink.emit(&AppEvent::MessageRejected {
                        error: Error::Config(ConfigError::InvalidRange),
                    });
                    publish_ack(transport, TOPIC_LIGHT_ERROR, ERR_INVALID_THRESHOLDS, sink);
                }
                Err(ConfigError::PersistFailure) => {
                    sink.emit(&AppEvent::PersistFailed);
                    publish_ack(transport, TOPIC_LIGHT_ERROR, ERR_THRESHOLDS_SAVE, sink);
                }
            },
            Ok(ControlMessage::SetMode(req)) => match self.update_mode(req, storage) {
                Ok(mode) => {
                    sink.emit(&AppEvent::ModeChanged { mode });
                    let ack = match req {
                        ModeRequest::Toggle => mode_swapped_ack(mode),
                        ModeRequest::Day | ModeRequest::Night => mode_set_ack(mode),
                    };
                    publish_ack(transport, TOPIC_CONFIG_SUCCESS, ack, sink);
                }
                Err(_) => {
                    sink.emit(&AppEvent::PersistFailed);
                    publish_ack(transport, TOPIC_CONFIG_ERROR, ERR_MODE_SAVE, sink);
                }
            },
            Err(e) => {
                sink.emit(&AppEvent::MessageRejected {
                    error: Error::Parse(e),
                });
                let (ack_topic, ack) = match e {
                    ParseError::MissingThreshold => (TOPIC_LIGHT_ERROR, ERR_MISSING_THRESHOLD),
                    ParseError::UnknownDirective => (TOPIC_CONFIG_ERROR, ERR_UNKNOWN_MESSAGE),
                };
                publish_ack(transport, ack_topic, ack, sink);
            }
        }
    }

    /// React to a broker session edge.  On connect, (re)subscribe the
    /// control topics and blink the strips.
    pub fn on_link_event(
        &mut self,
        event: LinkEvent,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        match event {
            LinkEvent::Connected => {
                sink.emit(&AppEvent::LinkUp);
                for topic in [TOPIC_THRESHOLDS, TOPIC_DIRECTION] {
                    if let Err(e) = transport.subscribe(topic) {
                        warn!("Subscribe to {} failed: {}", topic, e);
                    }
                }
                self.signal(CONNECT_BLINKS, sink);
            }
            LinkEvent::Disconnected => {
                sink.emit(&AppEvent::LinkDown);
                info!("Broker link lost, continuing on local control");
            }
        }
    }

    // ── Config updates ────────────────────────────────────────

    /// Validate, apply, and persist a threshold pair.  RAM and flash move
    /// together: a persist failure rolls the live value back.
    fn update_thresholds(
        &mut self,
        t: Thresholds,
        storage: &mut impl StoragePort,
    ) -> Result<(), ConfigError> {
        if !t.is_valid() {
            return Err(ConfigError::InvalidRange);
        }

        let previous = self.config.thresholds;
        self.config.thresholds = t;
        self.range_fault_logged = false;

        if let Err(e) = storage.put_f32(NS_THRESHOLDS, KEY_MIN_LUX, t.min_lux) {
            warn!("Threshold persist failed: {}", e);
            self.config.thresholds = previous;
            return Err(ConfigError::PersistFailure);
        }
        if let Err(e) = storage.put_f32(NS_THRESHOLDS, KEY_MAX_LUX, t.max_lux) {
            warn!("Threshold persist failed: {}", e);
            // First key already hit flash; point it back at the old value.
            let _ = storage.put_f32(NS_THRESHOLDS, KEY_MIN_LUX, previous.min_lux);
            self.config.thresholds = previous;
            return Err(ConfigError::PersistFailure);
        }
        info!("Thresholds updated to {:.2}..{:.2} lux", t.min_lux, t.max_lux);
        Ok(())
    }

    /// Resolve a mode request against the current mode, apply, persist.
    fn update_mode(
        &mut self,
        req: ModeRequest,
        storage: &mut impl StoragePort,
    ) -> Result<Mode, ConfigError> {
        let next = match req {
            ModeRequest::Day => Mode::Day,
            ModeRequest::Night => Mode::Night,
            ModeRequest::Toggle => self.config.mode.toggled(),
        };

        let previous = self.config.mode;
        self.config.mode = next;

        if let Err(e) = storage.put_bool(NS_CONFIG, KEY_NIGHT_MODE, next.is_night()) {
            warn!("Mode persist failed: {}", e);
            self.config.mode = previous;
            return Err(ConfigError::PersistFailure);
        }
        info!("Brightness direction set to {}", next.as_str());
        Ok(next)
    }

    // ── Queries ───────────────────────────────────────────────

    /// The live configuration.
    pub fn config(&self) -> LightConfig {
        self.config
    }

    /// The duty value currently applied to the strips.
    pub fn duty(&self) -> u8 {
        self.fader.current()
    }

    /// Whether a blink pattern currently owns the strips.
    pub fn is_signaling(&self) -> bool {
        self.signaler.is_active()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

// ── Internal ──────────────────────────────────────────────────

/// Publish an acknowledgment, or record the drop when the broker is away.
fn publish_ack(
    transport: &mut impl TransportPort,
    topic: &'static str,
    payload: &str,
    sink: &mut impl EventSink,
) {
    if !transport.is_connected() {
        sink.emit(&AppEvent::AckDropped { topic });
        return;
    }
    if let Err(e) = transport.publish(topic, payload) {
        warn!("Publish to {} failed: {}", topic, e);
        sink.emit(&AppEvent::AckDropped { topic });
    }
}

fn load_f32(storage: &impl StoragePort, namespace: &str, key: &str, default: f32) -> f32 {
    match storage.get_f32(namespace, key) {
        Ok(v) => v,
        Err(StorageError::NotFound) => default,
        Err(e) => {
            warn!("Read of {}/{} failed: {}", namespace, key, e);
            default
        }
    }
}

fn load_bool(storage: &impl StoragePort, namespace: &str, key: &str, default: bool) -> bool {
    match storage.get_bool(namespace, key) {
        Ok(v) => v,
        Err(StorageError::NotFound) => default,
        Err(e) => {
            warn!("Read of {}/{} failed: {}", namespace, key, e);
            default
        }
    }
}
