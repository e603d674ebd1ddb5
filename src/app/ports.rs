//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (sensor, PWM bank, MQTT client, NVS store, event sinks)
//! implement these traits.  The [`Controller`](super::service::Controller)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every test runs against mock implementations.

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain the ambient light level.
pub trait SensorPort {
    /// Current illuminance in lux.
    ///
    /// Implementations absorb bus errors by returning the last good
    /// reading; a flaky sensor must not stall the control loop.
    fn read_lux(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the LED outputs.
pub trait ActuatorPort {
    /// Apply one 8-bit duty value to every LED channel.
    fn set_duty(&mut self, duty: u8);
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ messaging channel)
// ───────────────────────────────────────────────────────────────

/// Publish/subscribe boundary toward the operator.
///
/// Connection lifecycle (session setup, reconnects) belongs to the
/// implementation; the domain only observes
/// [`is_connected`](Self::is_connected) and skips publishes while the
/// link is down.
pub trait TransportPort {
    /// Whether the link is usable right now.
    fn is_connected(&self) -> bool;

    /// Enqueue an outbound message, QoS 0 / no retain.
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError>;

    /// Register interest in an inbound topic.
    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Typed persistent key-value storage.
///
/// Keys are namespaced; each write commits atomically (the ESP-IDF NVS API
/// guarantees this natively, the in-memory simulation trivially).  Reads of
/// absent keys return [`StorageError::NotFound`] so callers can substitute
/// their documented defaults.
pub trait StoragePort {
    fn get_f32(&self, namespace: &str, key: &str) -> Result<f32, StorageError>;

    fn put_f32(&mut self, namespace: &str, key: &str, value: f32) -> Result<(), StorageError>;

    fn get_bool(&self, namespace: &str, key: &str) -> Result<bool, StorageError>;

    fn put_bool(&mut self, namespace: &str, key: &str, value: bool) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / diagnostics)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log today;
/// a metrics or display adapter would implement the same trait).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Requested thresholds violate `0 <= min < max`.
    InvalidRange,
    /// The durable store rejected the write; the in-memory change was
    /// rolled back.
    PersistFailure,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`TransportPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The link is down; the message was dropped (best-effort contract).
    NotConnected,
    /// The client backend refused the message.
    Backend,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidRange => write!(f, "thresholds out of range"),
            Self::PersistFailure => write!(f, "persist failed, change rolled back"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "transport not connected"),
            Self::Backend => write!(f, "transport backend error"),
        }
    }
}
