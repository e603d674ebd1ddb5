//! Integration tests for the broker message path: parse → validate →
//! persist → acknowledge.
//!
//! Each scenario pushes a raw topic/payload pair through the controller
//! the same way the MQTT receiver thread does, then asserts on the
//! resulting configuration, storage contents, and published acks.

use crate::mock_hw::{MemNvs, RecordingSink};

use luxdim::adapters::mqtt::SimTransport;
use luxdim::app::events::AppEvent;
use luxdim::app::ports::StoragePort;
use luxdim::app::service::Controller;
use luxdim::config::{
    LightConfig, Mode, Thresholds, KEY_MAX_LUX, KEY_MIN_LUX, KEY_NIGHT_MODE, NS_CONFIG,
    NS_THRESHOLDS,
};
use luxdim::rpc::messages::{
    ERR_INVALID_THRESHOLDS, ERR_MISSING_THRESHOLD, ERR_MODE_SAVE, ERR_THRESHOLDS_SAVE,
    ERR_UNKNOWN_MESSAGE, TOPIC_CONFIG_ERROR, TOPIC_CONFIG_SUCCESS, TOPIC_DIRECTION,
    TOPIC_LIGHT_ERROR, TOPIC_LIGHT_SUCCESS, TOPIC_THRESHOLDS,
};

struct Rig {
    controller: Controller,
    store: MemNvs,
    transport: SimTransport,
    sink: RecordingSink,
}

fn rig() -> Rig {
    Rig {
        controller: Controller::new(LightConfig::default()),
        store: MemNvs::new(),
        transport: SimTransport::connected(),
        sink: RecordingSink::new(),
    }
}

impl Rig {
    fn deliver(&mut self, topic: &str, payload: &str) {
        self.controller.handle_message(
            topic,
            payload,
            &mut self.store,
            &mut self.transport,
            &mut self.sink,
        );
    }

    fn acked(&self, topic: &str, payload: &str) -> bool {
        self.transport
            .published
            .iter()
            .any(|(t, p)| t == topic && p == payload)
    }
}

// ── Threshold updates ─────────────────────────────────────────

#[test]
fn threshold_update_applies_persists_and_acks() {
    let mut r = rig();

    r.deliver(TOPIC_THRESHOLDS, "150,900");

    assert_eq!(
        r.controller.config().thresholds,
        Thresholds::new(150.0, 900.0)
    );
    assert_eq!(r.store.get_f32(NS_THRESHOLDS, KEY_MIN_LUX), Ok(150.0));
    assert_eq!(r.store.get_f32(NS_THRESHOLDS, KEY_MAX_LUX), Ok(900.0));
    assert!(r.acked(
        TOPIC_LIGHT_SUCCESS,
        "Thresholds have been updated to 150.00 - 900.00 lux."
    ));
    assert!(r.sink.events.contains(&AppEvent::ThresholdsUpdated {
        min_lux: 150.0,
        max_lux: 900.0
    }));
}

#[test]
fn inverted_thresholds_are_rejected_without_touching_flash() {
    let mut r = rig();

    r.deliver(TOPIC_THRESHOLDS, "900,150");

    assert_eq!(r.controller.config().thresholds, Thresholds::default());
    assert!(r.store.is_empty(), "a rejected update must not hit storage");
    assert!(r.acked(TOPIC_LIGHT_ERROR, ERR_INVALID_THRESHOLDS));
    assert_eq!(
        r.sink
            .count_matching(|e| matches!(e, AppEvent::MessageRejected { .. })),
        1
    );
}

#[test]
fn short_threshold_payload_reports_missing_threshold() {
    let mut r = rig();

    r.deliver(TOPIC_THRESHOLDS, "150");

    assert_eq!(r.controller.config().thresholds, Thresholds::default());
    assert!(r.acked(TOPIC_LIGHT_ERROR, ERR_MISSING_THRESHOLD));
}

#[test]
fn threshold_persist_failure_rolls_back_and_reports() {
    let mut r = rig();
    r.store.fail_puts = true;

    r.deliver(TOPIC_THRESHOLDS, "150,900");

    assert_eq!(
        r.controller.config().thresholds,
        Thresholds::default(),
        "live thresholds roll back when flash rejects the write"
    );
    assert!(r.acked(TOPIC_LIGHT_ERROR, ERR_THRESHOLDS_SAVE));
    assert!(r.sink.events.contains(&AppEvent::PersistFailed));
}

// ── Direction updates ─────────────────────────────────────────

#[test]
fn direction_set_and_swap_update_mode_and_ack() {
    let mut r = rig();

    r.deliver(TOPIC_DIRECTION, "night");
    assert_eq!(r.controller.config().mode, Mode::Night);
    assert_eq!(r.store.get_bool(NS_CONFIG, KEY_NIGHT_MODE), Ok(true));
    assert!(r.acked(
        TOPIC_CONFIG_SUCCESS,
        "Brightness direction has been set to night."
    ));

    r.deliver(TOPIC_DIRECTION, "swap");
    assert_eq!(r.controller.config().mode, Mode::Day);
    assert_eq!(r.store.get_bool(NS_CONFIG, KEY_NIGHT_MODE), Ok(false));
    assert!(r.acked(
        TOPIC_CONFIG_SUCCESS,
        "Brightness direction has been swapped to day."
    ));

    // A second swap round-trips back to the persisted night setting.
    r.deliver(TOPIC_DIRECTION, "swap");
    assert_eq!(r.controller.config().mode, Mode::Night);
    assert_eq!(r.store.get_bool(NS_CONFIG, KEY_NIGHT_MODE), Ok(true));
    assert!(r.acked(
        TOPIC_CONFIG_SUCCESS,
        "Brightness direction has been swapped to night."
    ));
}

#[test]
fn unknown_directive_reports_unknown_message() {
    let mut r = rig();

    r.deliver(TOPIC_DIRECTION, "dusk");

    assert_eq!(r.controller.config().mode, Mode::Day);
    assert!(r.acked(TOPIC_CONFIG_ERROR, ERR_UNKNOWN_MESSAGE));
}

#[test]
fn mode_persist_failure_rolls_back_and_reports() {
    let mut r = rig();
    r.store.fail_puts = true;

    r.deliver(TOPIC_DIRECTION, "night");

    assert_eq!(r.controller.config().mode, Mode::Day, "mode rolls back");
    assert!(r.acked(TOPIC_CONFIG_ERROR, ERR_MODE_SAVE));
}

// ── Unrelated traffic and offline acks ────────────────────────

#[test]
fn unrelated_topics_are_ignored_silently() {
    let mut r = rig();

    r.deliver("light/lux", "150,900");
    r.deliver("some/other/topic", "night");

    assert_eq!(r.controller.config(), LightConfig::default());
    assert!(r.store.is_empty());
    assert!(r.transport.published.is_empty());
    assert!(r.sink.events.is_empty(), "no events for unrelated traffic");
}

#[test]
fn updates_apply_locally_even_when_the_ack_cannot_be_sent() {
    let mut r = rig();
    r.transport.connected = false;

    r.deliver(TOPIC_THRESHOLDS, "150,900");

    assert_eq!(
        r.controller.config().thresholds,
        Thresholds::new(150.0, 900.0),
        "configuration is not held hostage by the broker"
    );
    assert_eq!(r.store.get_f32(NS_THRESHOLDS, KEY_MIN_LUX), Ok(150.0));
    assert!(r.transport.published.is_empty());
    assert!(r.sink.events.contains(&AppEvent::AckDropped {
        topic: TOPIC_LIGHT_SUCCESS
    }));
}

// ── Settings survive a reboot ─────────────────────────────────

#[test]
fn persisted_settings_are_what_the_next_boot_loads() {
    let mut r = rig();

    r.deliver(TOPIC_THRESHOLDS, "42.5,777");
    r.deliver(TOPIC_DIRECTION, "night");

    // Same storage, fresh controller: the second boot.
    let reloaded = Controller::load_config(&r.store);
    assert_eq!(reloaded.thresholds, Thresholds::new(42.5, 777.0));
    assert_eq!(reloaded.mode, Mode::Night);
}
