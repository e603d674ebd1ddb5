//! Broker-facing messaging subsystem.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    Messaging Stack                        │
//! │                                                           │
//! │  ┌───────────┐   ┌───────────┐   ┌─────────────────────┐ │
//! │  │ Transport  │──▶│ channels  │──▶│ messages (parse)    │ │
//! │  │ (receiver) │   │ (bounded) │   │ → Controller        │ │
//! │  └───────────┘   └───────────┘   └─────────────────────┘ │
//! │        ▲                                   │              │
//! │        └────────── acks / telemetry ◀──────┘              │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! `messages` owns the wire vocabulary (topics, payload grammar, ack
//! strings); `channels` carries traffic between the receiver thread and
//! the control loop.  The MQTT transport itself lives in `adapters::mqtt`.

pub mod channels;
pub mod messages;
