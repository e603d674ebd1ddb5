//! MQTT transport adapter.
//!
//! Implements [`TransportPort`] over the ESP-IDF MQTT client.  The
//! client's event connection is drained by a dedicated receiver thread
//! that copies traffic into the static channels; the control loop never
//! blocks on the network.
//!
//! ```text
//!  broker ──▶ EspMqttConnection ──▶ mqtt-rx thread ──▶ INBOUND / LINK_EVENTS
//!  broker ◀── EspMqttClient::enqueue ◀── TransportPort::publish
//! ```
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`MqttAdapter`] wraps the real client.
//! On host/test: [`SimTransport`] records traffic in-memory.
//! [`NullTransport`] serves degraded boots on both targets.

use crate::app::ports::{TransportError, TransportPort};

#[cfg(target_os = "espidf")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(target_os = "espidf")]
use std::sync::Arc;

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EventPayload, MqttClientConfiguration, QoS,
};

#[cfg(target_os = "espidf")]
use log::{info, warn};

#[cfg(target_os = "espidf")]
use crate::rpc::channels::{InboundMessage, LinkEvent, INBOUND, LINK_EVENTS};

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct MqttAdapter {
    client: EspMqttClient<'static>,
    connected: Arc<AtomicBool>,
}

#[cfg(target_os = "espidf")]
impl MqttAdapter {
    /// Connect to the broker and start the receiver thread.
    ///
    /// The client reconnects on its own; every (re)connection surfaces as
    /// a [`LinkEvent::Connected`] so the control loop can resubscribe.
    pub fn connect(
        broker_url: &str,
        client_id: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> anyhow::Result<Self> {
        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            username,
            password,
            ..Default::default()
        };
        let (client, mut connection) = EspMqttClient::new(broker_url, &conf)?;

        let connected = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&connected);

        std::thread::Builder::new()
            .name("mqtt-rx".into())
            .stack_size(6144)
            .spawn(move || {
                while let Ok(event) = connection.next() {
                    match event.payload() {
                        EventPayload::Connected(_) => {
                            flag.store(true, Ordering::SeqCst);
                            if LINK_EVENTS.try_send(LinkEvent::Connected).is_err() {
                                warn!("MQTT: link event queue full");
                            }
                        }
                        EventPayload::Disconnected => {
                            flag.store(false, Ordering::SeqCst);
                            if LINK_EVENTS.try_send(LinkEvent::Disconnected).is_err() {
                                warn!("MQTT: link event queue full");
                            }
                        }
                        EventPayload::Received {
                            topic,
                            data,
                            details,
                            ..
                        } => {
                            // Control payloads are tiny; chunked deliveries
                            // are oversized noise and get dropped whole.
                            if !matches!(details, Details::Complete) {
                                continue;
                            }
                            let (Some(topic), Ok(payload)) =
                                (topic, core::str::from_utf8(data))
                            else {
                                continue;
                            };
                            match InboundMessage::from_wire(topic, payload) {
                                Some(msg) => {
                                    if INBOUND.try_send(msg).is_err() {
                                        warn!("MQTT: inbound queue full, dropping {}", topic);
                                    }
                                }
                                None => {
                                    warn!("MQTT: oversized message on {}, dropped", topic);
                                }
                            }
                        }
                        EventPayload::Error(e) => {
                            warn!("MQTT: event error: {}", e);
                        }
                        _ => (),
                    }
                }
                info!("MQTT: connection closed, receiver exiting");
            })?;

        info!("MQTT: client '{}' started for {}", client_id, broker_url);
        Ok(Self { client, connected })
    }
}

#[cfg(target_os = "espidf")]
impl TransportPort for MqttAdapter {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.client
            .enqueue(topic, QoS::AtMostOnce, false, payload.as_bytes())
            .map(|_| ())
            .map_err(|e| {
                warn!("MQTT: enqueue to {} failed: {}", topic, e);
                TransportError::Backend
            })
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|e| {
                warn!("MQTT: subscribe to {} failed: {}", topic, e);
                TransportError::Backend
            })
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// Records outbound traffic; connection state is a plain field the test
/// flips to model broker loss.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimTransport {
    pub connected: bool,
    pub published: Vec<(String, String)>,
    pub subscribed: Vec<String>,
    pub fail_publish: bool,
}

#[cfg(not(target_os = "espidf"))]
impl SimTransport {
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl TransportPort for SimTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        if self.fail_publish {
            return Err(TransportError::Backend);
        }
        self.published.push((topic.to_owned(), payload.to_owned()));
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.subscribed.push(topic.to_owned());
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Degraded boot
// ───────────────────────────────────────────────────────────────

/// Transport for a lamp running without a network: never connected,
/// every operation reports [`TransportError::NotConnected`].
pub struct NullTransport;

impl TransportPort for NullTransport {
    fn is_connected(&self) -> bool {
        false
    }

    fn publish(&mut self, _topic: &str, _payload: &str) -> Result<(), TransportError> {
        Err(TransportError::NotConnected)
    }

    fn subscribe(&mut self, _topic: &str) -> Result<(), TransportError> {
        Err(TransportError::NotConnected)
    }
}
