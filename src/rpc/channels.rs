//! Static bounded channels between the broker receiver thread and the
//! control loop.
//!
//! ```text
//! ┌──────────────┐ InboundMessage ┌───────────────┐
//! │ MQTT receiver│───────────────▶│  Control loop │
//! │   (thread)   │───────────────▶│    (sync)     │
//! └──────────────┘   LinkEvent    └───────────────┘
//! ```
//!
//! The receiver runs on its own thread and must never block on the
//! controller, so both channels are fixed-capacity with `try_send` at the
//! producer end.  A full queue drops the newest message; inbound traffic
//! is operator-paced, so in practice the queues stay near empty.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Longest control topic is `light/thresholds` (16 bytes).
pub const TOPIC_CAPACITY: usize = 32;
/// Threshold payloads are two short decimals; directives are one word.
pub const PAYLOAD_CAPACITY: usize = 64;

/// One broker message, copied out of the transport's receive buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: heapless::String<TOPIC_CAPACITY>,
    pub payload: heapless::String<PAYLOAD_CAPACITY>,
}

impl InboundMessage {
    /// Copy a wire message into owned storage.  `None` when either part
    /// exceeds its capacity; oversized traffic is noise, not control input.
    pub fn from_wire(topic: &str, payload: &str) -> Option<Self> {
        Some(Self {
            topic: heapless::String::try_from(topic).ok()?,
            payload: heapless::String::try_from(payload).ok()?,
        })
    }
}

/// Broker session edges, observed by the receiver thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
}

/// Control messages waiting for the next loop pass.
pub static INBOUND: Channel<CriticalSectionRawMutex, InboundMessage, 8> = Channel::new();

/// Session edges waiting for the next loop pass.
pub static LINK_EVENTS: Channel<CriticalSectionRawMutex, LinkEvent, 4> = Channel::new();
