//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full duty
//! history without touching real GPIO/PWM registers.

use luxdim::app::events::AppEvent;
use luxdim::app::ports::{ActuatorPort, EventSink, SensorPort, StorageError, StoragePort};
use std::collections::HashMap;

// ── MockHw ────────────────────────────────────────────────────

/// Sensor and actuator double: `lux` is whatever the test sets it to,
/// and every PWM write is recorded in order.
pub struct MockHw {
    pub lux: f32,
    pub duties: Vec<u8>,
}

#[allow(dead_code)]
impl MockHw {
    pub fn new(lux: f32) -> Self {
        Self {
            lux,
            duties: Vec::new(),
        }
    }

    pub fn last_duty(&self) -> Option<u8> {
        self.duties.last().copied()
    }
}

impl SensorPort for MockHw {
    fn read_lux(&mut self) -> f32 {
        self.lux
    }
}

impl ActuatorPort for MockHw {
    fn set_duty(&mut self, duty: u8) {
        self.duties.push(duty);
    }
}

// ── MemNvs ────────────────────────────────────────────────────

/// In-memory storage double with a switchable write failure.
#[derive(Default)]
pub struct MemNvs {
    floats: HashMap<(String, String), f32>,
    bools: HashMap<(String, String), bool>,
    pub fail_puts: bool,
}

#[allow(dead_code)]
impl MemNvs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.floats.is_empty() && self.bools.is_empty()
    }
}

impl StoragePort for MemNvs {
    fn get_f32(&self, namespace: &str, key: &str) -> Result<f32, StorageError> {
        self.floats
            .get(&(namespace.into(), key.into()))
            .copied()
            .ok_or(StorageError::NotFound)
    }

    fn put_f32(&mut self, namespace: &str, key: &str, value: f32) -> Result<(), StorageError> {
        if self.fail_puts {
            return Err(StorageError::IoError);
        }
        self.floats.insert((namespace.into(), key.into()), value);
        Ok(())
    }

    fn get_bool(&self, namespace: &str, key: &str) -> Result<bool, StorageError> {
        self.bools
            .get(&(namespace.into(), key.into()))
            .copied()
            .ok_or(StorageError::NotFound)
    }

    fn put_bool(&mut self, namespace: &str, key: &str, value: bool) -> Result<(), StorageError> {
        if self.fail_puts {
            return Err(StorageError::IoError);
        }
        self.bools.insert((namespace.into(), key.into()), value);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Captures emitted events for structural assertions.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_matching(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
