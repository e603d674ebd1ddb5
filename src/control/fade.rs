//! Non-blocking duty-cycle fade engine.
//!
//! Converts a `(current, target)` duty pair into a sequence of discrete PWM
//! writes spread over a fixed transition budget, so physical brightness never
//! jumps.  The engine is polled from the control loop and never sleeps:
//!
//! ```text
//!   Idle ──begin_fade──▶ Fading ──budget elapsed──▶ Idle
//!     └──begin_fade (equal endpoints)──▶ Holding ──▶ Idle
//! ```
//!
//! Pacing is pure integer math over wrapping millisecond timestamps.  At
//! `elapsed` ms into a fade of `steps = |to - from|` units, the due value is
//! `from ± elapsed * steps / budget`.  If the loop polls slower than one step
//! interval, a single write catches up to the due value, so the fade always
//! lands exactly on `to` when the budget expires and never overshoots.

/// Total wall-clock budget of one fade, in milliseconds.
pub const FADE_BUDGET_MS: u32 = 255;

// ── Fader ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Fading { from: u8, to: u8, started_at: u32 },
    /// Equal-endpoint fade: hold the level for the full budget, emit nothing.
    Holding { level: u8, started_at: u32 },
}

/// Pollable fade state machine.  Owns the last duty value it emitted, which
/// is also the retarget origin for any new fade.
pub struct Fader {
    phase: Phase,
    current: u8,
}

impl Fader {
    pub fn new(initial_duty: u8) -> Self {
        Self {
            phase: Phase::Idle,
            current: initial_duty,
        }
    }

    /// Start (or restart) a transition toward `to`.
    ///
    /// A retarget while a fade is in flight continues from the current
    /// interpolated value, never from the old origin, so a new target can
    /// not cause a reverse jump.
    pub fn begin_fade(&mut self, to: u8, now_ms: u32) {
        self.phase = if to == self.current {
            Phase::Holding {
                level: to,
                started_at: now_ms,
            }
        } else {
            Phase::Fading {
                from: self.current,
                to,
                started_at: now_ms,
            }
        };
    }

    /// Advance the fade.  Returns the next duty value to write to the PWM
    /// peripheral, or `None` when no step is due or the fade is complete.
    /// At most one value is returned per poll.
    pub fn tick(&mut self, now_ms: u32) -> Option<u8> {
        match self.phase {
            Phase::Idle => None,
            Phase::Holding { started_at, .. } => {
                if now_ms.wrapping_sub(started_at) >= FADE_BUDGET_MS {
                    self.phase = Phase::Idle;
                }
                None
            }
            Phase::Fading {
                from,
                to,
                started_at,
            } => {
                let elapsed = now_ms.wrapping_sub(started_at).min(FADE_BUDGET_MS);
                let steps = u32::from(to.abs_diff(from));
                let advanced = (elapsed * steps / FADE_BUDGET_MS) as u8;
                let due = if to >= from {
                    from + advanced
                } else {
                    from - advanced
                };

                if elapsed >= FADE_BUDGET_MS {
                    self.phase = Phase::Idle;
                }
                if due != self.current {
                    self.current = due;
                    Some(due)
                } else {
                    None
                }
            }
        }
    }

    /// The last duty value emitted (the physically applied level).
    pub fn current(&self) -> u8 {
        self.current
    }

    /// The value this fade is heading toward; `current()` when idle.
    pub fn target(&self) -> u8 {
        match self.phase {
            Phase::Idle => self.current,
            Phase::Holding { level, .. } => level,
            Phase::Fading { to, .. } => to,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }
}

// ── Signaler ──────────────────────────────────────────────────

/// Connection-signal blink pattern: N full cycles of fade-to-full then
/// fade-to-zero, expressed as consecutive fades so the pattern shares the
/// [`Fader`] with ambient dimming without blocking the loop.
///
/// While a pattern is pending the ambient pipeline must leave the fader
/// alone; the controller checks [`is_active`](Self::is_active) for that.
pub struct Signaler {
    half_cycles_left: u8,
    /// True from the first launch until the last launched fade lands, so
    /// the pattern keeps the fader through its final fall to zero.
    draining: bool,
}

impl Signaler {
    pub fn new() -> Self {
        Self {
            half_cycles_left: 0,
            draining: false,
        }
    }

    /// Queue `blinks` on/off cycles, replacing any pattern in progress.
    pub fn start(&mut self, blinks: u8) {
        self.half_cycles_left = blinks.saturating_mul(2);
    }

    pub fn is_active(&self) -> bool {
        self.half_cycles_left > 0 || self.draining
    }

    /// Launch the next half-cycle once the fader is free.  An in-flight
    /// ambient fade finishes first; the pattern then owns the fader until
    /// its last fade-to-zero completes.
    pub fn tick(&mut self, fader: &mut Fader, now_ms: u32) {
        if self.half_cycles_left == 0 {
            if self.draining && !fader.is_active() {
                self.draining = false;
            }
            return;
        }
        if fader.is_active() {
            return;
        }
        // Even half-cycles remaining: rising edge next.  Odd: falling.
        let to = if self.half_cycles_left % 2 == 0 {
            u8::MAX
        } else {
            0
        };
        fader.begin_fade(to, now_ms);
        self.half_cycles_left -= 1;
        self.draining = true;
    }
}

impl Default for Signaler {
    fn default() -> Self {
        Self::new()
    }
}
