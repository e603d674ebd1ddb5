//! Sensor drivers.
//!
//! Each driver is generic over its bus trait; peripheral ownership is
//! established in `main` and the adapter layer wires drivers to ports.

pub mod light;
