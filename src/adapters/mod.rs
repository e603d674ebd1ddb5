//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to              |
//! |------------|---------------|--------------------------|
//! | `hardware` | SensorPort    | BH1750 over I²C          |
//! |            | ActuatorPort  | ESP32 LEDC PWM           |
//! | `log_sink` | EventSink     | Serial log output        |
//! | `mqtt`     | TransportPort | ESP-IDF MQTT client      |
//! | `nvs`      | StoragePort   | NVS / in-memory store    |
//! | `time`     | (clock)       | ESP32 system timer       |
//! | `wifi`     | (setup)       | ESP-IDF WiFi STA         |

pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod time;
pub mod wifi;
