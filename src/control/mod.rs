//! Control algorithms: ambient mapping and fade pacing.
//!
//! Pure functions and pollable state machines, no I/O.  [`brightness`]
//! turns a lux sample into a target duty; [`fade`] spreads the transition
//! over a fixed budget of wall-clock time.

pub mod brightness;
pub mod fade;
