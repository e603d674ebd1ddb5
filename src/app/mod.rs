//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the lamp: ambient lux to
//! brightness mapping, fade pacing, remote configuration, and telemetry
//! cadence.  All interaction with hardware and the broker happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
