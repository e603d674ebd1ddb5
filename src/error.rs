//! Unified error types for the LuxDim firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be carried inside [`AppEvent`](crate::app::events::AppEvent)s without
//! allocation.  None of them is ever fatal: the loop keeps sensing and
//! driving the LEDs regardless of messaging or storage failures.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError, TransportError};
use crate::control::brightness::DomainError;
use crate::rpc::messages::ParseError;

// ───────────────────────────────────────────────────────────────
// Top-level firmware error
// ───────────────────────────────────────────────────────────────

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A pure computation received input its caller should have rejected.
    Domain(DomainError),
    /// A configuration update was rejected or could not be persisted.
    Config(ConfigError),
    /// An inbound message was malformed.
    Parse(ParseError),
    /// The key-value backend failed.
    Storage(StorageError),
    /// The messaging channel failed or is down.
    Transport(TransportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "domain: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl From<DomainError> for Error {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ───────────────────────────────────────────────────────────────
// Convenience Result alias
// ───────────────────────────────────────────────────────────────

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
