//! Inbound control messages.
//!
//! The wire parser in [`rpc::messages`](crate::rpc::messages) turns raw
//! topic/payload pairs into these tagged unions; the
//! [`Controller`](super::service::Controller) dispatches them with an
//! exhaustive match.  No raw strings cross the port boundary.

use crate::config::Thresholds;

/// A validated configuration request from the operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMessage {
    /// Replace the lux sensitivity window.
    SetThresholds(Thresholds),

    /// Set or toggle the brightness direction.
    SetMode(ModeRequest),
}

/// Requested direction change.  `Toggle` resolves against the mode that is
/// current at apply time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeRequest {
    Day,
    Night,
    Toggle,
}
