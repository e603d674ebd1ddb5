//! Integration tests for the sense → brightness → fade → PWM pipeline.
//!
//! These run on the host (x86_64) and drive the controller through whole
//! simulated sessions: booting dark, tracking ambient changes, blinking on
//! broker connect, and publishing rate-limited telemetry.

use crate::mock_hw::{MockHw, RecordingSink};

use luxdim::adapters::mqtt::SimTransport;
use luxdim::app::events::AppEvent;
use luxdim::app::service::{Controller, CONNECT_BLINKS};
use luxdim::config::{LightConfig, Mode, Thresholds};
use luxdim::rpc::channels::LinkEvent;
use luxdim::rpc::messages::TOPIC_LUX;

/// Drive the control loop at a fixed poll period over `[from_ms, to_ms]`.
fn run_ticks(
    c: &mut Controller,
    hw: &mut MockHw,
    transport: &mut SimTransport,
    sink: &mut RecordingSink,
    from_ms: u32,
    to_ms: u32,
    step_ms: u32,
) {
    let mut now = from_ms;
    while now <= to_ms {
        c.tick(now, hw, transport, sink);
        now += step_ms;
    }
}

// ── Boot: dark strips fade up to the ambient target ───────────

#[test]
fn boot_fade_climbs_smoothly_to_ambient_target() {
    let mut c = Controller::new(LightConfig::default());
    let mut hw = MockHw::new(5000.0); // far above max_lux: full brightness
    let mut transport = SimTransport::connected();
    let mut sink = RecordingSink::new();
    c.start(&mut sink);

    run_ticks(&mut c, &mut hw, &mut transport, &mut sink, 10, 400, 5);

    assert!(!hw.duties.is_empty(), "PWM must have been driven");
    for pair in hw.duties.windows(2) {
        assert!(pair[1] > pair[0], "fade up must be strictly increasing");
    }
    assert_eq!(hw.last_duty(), Some(255), "must land on full brightness");
    assert_eq!(c.duty(), 255);

    // A steady target keeps the fader idle: exactly one transition.
    assert_eq!(
        sink.count_matching(|e| matches!(e, AppEvent::FadeStarted { .. })),
        1
    );
    assert!(sink.events.contains(&AppEvent::FadeStarted { from: 0, to: 255 }));
}

// ── Ambient drop mid-fade: retarget from the current level ────

#[test]
fn ambient_drop_mid_fade_reverses_without_jumping() {
    let mut c = Controller::new(LightConfig::default());
    let mut hw = MockHw::new(5000.0);
    let mut transport = SimTransport::connected();
    let mut sink = RecordingSink::new();
    c.start(&mut sink);

    // Climb for 100 ms, then the room goes dark while the fade is in flight.
    run_ticks(&mut c, &mut hw, &mut transport, &mut sink, 10, 100, 5);
    hw.lux = 0.0;
    run_ticks(&mut c, &mut hw, &mut transport, &mut sink, 105, 600, 5);

    assert_eq!(hw.last_duty(), Some(0), "must settle dark");
    let peak = *hw.duties.iter().max().unwrap();
    assert!(
        peak < 255,
        "reversal must start from the interpolated level, not finish the climb"
    );
    assert_eq!(
        sink.count_matching(|e| matches!(e, AppEvent::FadeStarted { .. })),
        2
    );
    assert!(sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::FadeStarted { from, to: 0 } if *from > 0)));
}

// ── Telemetry: one publish per interval, never more ───────────

#[test]
fn telemetry_publishes_on_a_five_second_cadence() {
    let mut c = Controller::new(LightConfig::default());
    let mut hw = MockHw::new(433.719);
    let mut transport = SimTransport::connected();
    let mut sink = RecordingSink::new();
    c.start(&mut sink);

    run_ticks(&mut c, &mut hw, &mut transport, &mut sink, 0, 15_000, 10);

    assert_eq!(
        sink.count_matching(|e| matches!(e, AppEvent::Telemetry { .. })),
        3,
        "expected samples at 5 s, 10 s, and 15 s"
    );
    assert_eq!(transport.published.len(), 3);
    for (topic, payload) in &transport.published {
        assert_eq!(topic, TOPIC_LUX);
        assert_eq!(payload, "Current lux: 433.72 lx.");
    }
}

#[test]
fn telemetry_slot_is_consumed_but_not_published_while_offline() {
    let mut c = Controller::new(LightConfig::default());
    let mut hw = MockHw::new(300.0);
    let mut transport = SimTransport::default(); // broker away
    let mut sink = RecordingSink::new();
    c.start(&mut sink);

    run_ticks(&mut c, &mut hw, &mut transport, &mut sink, 0, 6_000, 10);

    assert_eq!(
        sink.count_matching(|e| matches!(e, AppEvent::Telemetry { .. })),
        1,
        "the local sample still happens on schedule"
    );
    assert!(
        transport.published.is_empty(),
        "nothing goes to the wire while disconnected"
    );
}

// ── Broker connect: subscribe, blink, then resume dimming ─────

#[test]
fn connect_blinks_three_times_then_ambient_reasserts() {
    let mut c = Controller::new(LightConfig::default());
    let mut hw = MockHw::new(5000.0);
    let mut transport = SimTransport::connected();
    let mut sink = RecordingSink::new();
    c.start(&mut sink);

    c.on_link_event(LinkEvent::Connected, &mut transport, &mut sink);

    assert_eq!(
        transport.subscribed,
        vec!["light/thresholds".to_owned(), "config/direction".to_owned()]
    );
    assert!(c.is_signaling());
    assert!(sink.events.contains(&AppEvent::LinkUp));
    assert!(sink.events.contains(&AppEvent::SignalStarted {
        blinks: CONNECT_BLINKS
    }));

    run_ticks(&mut c, &mut hw, &mut transport, &mut sink, 5, 3_000, 5);

    assert!(!c.is_signaling(), "pattern must complete");
    let peaks = hw.duties.iter().filter(|&&d| d == 255).count();
    let valleys = hw.duties.iter().filter(|&&d| d == 0).count();
    assert!(peaks >= 3, "three rises to full, got {peaks}");
    assert!(valleys >= 3, "three falls to dark, got {valleys}");
    assert_eq!(
        hw.last_duty(),
        Some(255),
        "ambient target wins back the strips after the pattern"
    );
}

#[test]
fn reconnect_resubscribes_the_control_topics() {
    let mut c = Controller::new(LightConfig::default());
    let mut transport = SimTransport::connected();
    let mut sink = RecordingSink::new();

    c.on_link_event(LinkEvent::Connected, &mut transport, &mut sink);
    c.on_link_event(LinkEvent::Disconnected, &mut transport, &mut sink);
    c.on_link_event(LinkEvent::Connected, &mut transport, &mut sink);

    assert_eq!(
        transport.subscribed.len(),
        4,
        "both topics subscribed again on the second session"
    );
    assert!(sink.events.contains(&AppEvent::LinkDown));
}

// ── Degenerate configuration: hold instead of slamming ────────

#[test]
fn degenerate_thresholds_hold_the_last_output() {
    let config = LightConfig {
        thresholds: Thresholds::new(500.0, 500.0),
        mode: Mode::Day,
    };
    let mut c = Controller::new(config);
    let mut hw = MockHw::new(800.0);
    let mut transport = SimTransport::connected();
    let mut sink = RecordingSink::new();
    c.start(&mut sink);

    run_ticks(&mut c, &mut hw, &mut transport, &mut sink, 10, 1_000, 5);

    assert!(
        hw.duties.is_empty(),
        "an undefined mapping must not move the strips"
    );
    assert_eq!(
        sink.count_matching(|e| matches!(e, AppEvent::FadeStarted { .. })),
        0
    );
}
