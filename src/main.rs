//! LuxDim Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single polled control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsStore     Esp32Time       │
//! │  (Sensor+Actuator) (EventSink)    (Storage)    (clock)         │
//! │  MqttAdapter       wifi::join                                  │
//! │  (TransportPort)   (station setup)                             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  Brightness curve · Fader · Signaler                   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
pub mod error;
mod esp_link_shims;
pub mod pins;

pub mod app;
mod adapters;
pub mod control;
mod drivers;
pub mod rpc;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info, warn};

use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogEventSink;
use adapters::mqtt::{MqttAdapter, NullTransport};
use adapters::nvs::NvsStore;
use adapters::time::Esp32TimeAdapter;
use adapters::wifi::{self, Credentials};
use app::ports::{ActuatorPort, EventSink, SensorPort, StoragePort, TransportPort};
use app::service::{Controller, CONNECT_BLINKS};
use drivers::led_pwm::LedBank;
use rpc::channels::{INBOUND, LINK_EVENTS};
use sensors::light::Bh1750;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::FromValueType;

// ── Compile-time configuration ────────────────────────────────
//
// Deployment settings are baked in at build time, matching how the
// rest of the image is produced:
//
//   LUXDIM_WIFI_SSID=mynet LUXDIM_WIFI_PASS=... cargo build ...
//
// With no SSID configured the firmware boots offline and still dims
// the LEDs from the sensor alone.

const WIFI_SSID: &str = match option_env!("LUXDIM_WIFI_SSID") {
    Some(s) => s,
    None => "",
};
const WIFI_PASS: &str = match option_env!("LUXDIM_WIFI_PASS") {
    Some(s) => s,
    None => "",
};
const MQTT_URL: &str = match option_env!("LUXDIM_MQTT_URL") {
    Some(s) => s,
    None => "mqtt://192.168.1.2:1883",
};
const MQTT_CLIENT_ID: &str = "ESP32Client";
const MQTT_USER: Option<&str> = option_env!("LUXDIM_MQTT_USER");
const MQTT_PASS: Option<&str> = option_env!("LUXDIM_MQTT_PASS");

/// Control loop period. The fader resolves one duty step per
/// millisecond, so 10 ms keeps fades visually smooth while leaving
/// the CPU mostly idle.
const LOOP_INTERVAL_MS: u32 = 10;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  LuxDim v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical: without LEDC there is
        // nothing to dim. Halt and let the watchdog reset us.
        error!("HAL init failed: {}. Halting.", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    // ── 3. Storage + persisted settings ───────────────────────
    let storage = match NvsStore::new() {
        Ok(s) => s,
        Err(e) => {
            warn!(
                "NVS init failed ({}), settings will not survive reboot",
                e
            );
            NvsStore::offline()
        }
    };
    let config = Controller::load_config(&storage);
    let mut controller = Controller::new(config);

    // ── 4. Light sensor on I2C ────────────────────────────────
    // Wiring is documented in `pins`: SDA on GPIO 21, SCL on GPIO 22.
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(100.kHz().into()),
    )?;
    let mut light = Bh1750::new(i2c, pins::BH1750_I2C_ADDR);
    if let Err(e) = light.start() {
        warn!("BH1750 start failed ({:?}), readings hold at 0 lux", e);
    }
    let hw = HardwareAdapter::new(light, LedBank::new());

    // ── 5. WiFi station ───────────────────────────────────────
    let wifi = match Credentials::new(WIFI_SSID, WIFI_PASS) {
        Ok(creds) => match wifi::join(peripherals.modem, sysloop.clone(), &creds) {
            Ok(w) => Some(w),
            Err(e) => {
                warn!("WiFi join failed ({}), running offline", e);
                None
            }
        },
        Err(e) => {
            warn!("WiFi credentials rejected ({}), running offline", e);
            None
        }
    };

    // ── 6. Transport + control loop ───────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();

    // `wifi` must outlive the loop; `run` never returns, so holding it
    // in this frame is enough.
    if wifi.is_some() {
        // Station is up: give the operator the three-blink confirmation.
        controller.signal(CONNECT_BLINKS, &mut sink);
        match MqttAdapter::connect(MQTT_URL, MQTT_CLIENT_ID, MQTT_USER, MQTT_PASS) {
            Ok(transport) => run(controller, hw, storage, transport, clock, sink),
            Err(e) => {
                warn!("MQTT client failed to start ({}), running offline", e);
                run(controller, hw, storage, NullTransport, clock, sink)
            }
        }
    } else {
        run(controller, hw, storage, NullTransport, clock, sink)
    }
}

// ── Control loop ──────────────────────────────────────────────

fn run(
    mut controller: Controller,
    mut hw: impl SensorPort + ActuatorPort,
    mut storage: impl StoragePort,
    mut transport: impl TransportPort,
    clock: Esp32TimeAdapter,
    mut sink: impl EventSink,
) -> ! {
    controller.start(&mut sink);
    info!("System ready. Entering control loop.");

    loop {
        // Link transitions first, so a fresh connection is subscribed
        // before its queued messages are handled.
        while let Ok(event) = LINK_EVENTS.try_receive() {
            controller.on_link_event(event, &mut transport, &mut sink);
        }

        while let Ok(msg) = INBOUND.try_receive() {
            controller.handle_message(
                &msg.topic,
                &msg.payload,
                &mut storage,
                &mut transport,
                &mut sink,
            );
        }

        controller.tick(clock.now_ms(), &mut hw, &mut transport, &mut sink);

        FreeRtos::delay_ms(LOOP_INTERVAL_MS);
    }
}
