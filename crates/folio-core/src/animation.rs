#![forbid(unsafe_code)]

//! Time-driven animation primitives.
//!
//! Animations produce normalized `f32` values in `[0, 1]` and advance only
//! when ticked with an explicit `dt`. They never read a clock themselves, so
//! the same animation behaves identically under wall time and virtual time.

use std::time::Duration;

/// Maps `t` in `[0, 1]` to an eased value in `[0, 1]`.
pub type EasingFn = fn(f32) -> f32;

#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// A time-based animation producing values in `[0, 1]`.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    fn is_complete(&self) -> bool;

    /// Current output, clamped to `[0, 1]`.
    fn value(&self) -> f32;

    /// Return to the initial state.
    fn reset(&mut self);
}

/// Progression from 0.0 to 1.0 over a fixed duration.
///
/// An inverted fade runs from 1.0 down to 0.0 (an exit animation).
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
    inverted: bool,
}

impl Fade {
    /// A linear fade-in lasting `duration`. A zero duration completes on the first tick.
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: duration.max(Duration::from_nanos(1)),
            easing: linear,
            inverted: false,
        }
    }

    /// A fade-out lasting `duration`.
    pub fn out(duration: Duration) -> Self {
        Self {
            inverted: true,
            ..Self::new(duration)
        }
    }

    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Linear progress before easing and inversion.
    fn progress(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        let v = (self.easing)(self.progress());
        if self.inverted { 1.0 - v } else { v }
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// Sine oscillation between 0.0 and 1.0. Never completes.
#[derive(Debug, Clone, Copy)]
pub struct Pulse {
    frequency: f32,
    phase: f32,
}

impl Pulse {
    /// A pulse with `frequency` full cycles per second.
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency: frequency.abs().max(f32::MIN_POSITIVE),
            phase: 0.0,
        }
    }
}

impl Animation for Pulse {
    fn tick(&mut self, dt: Duration) {
        self.phase += std::f32::consts::TAU * self.frequency * dt.as_secs_f32();
        self.phase %= std::f32::consts::TAU;
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn value(&self) -> f32 {
        (self.phase.sin() + 1.0) / 2.0
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Hold at 0.0 for `delay`, then play the inner animation.
///
/// Time that overshoots the delay is forwarded to the inner animation.
#[derive(Debug, Clone, Copy)]
pub struct Delayed<A> {
    delay: Duration,
    elapsed: Duration,
    inner: A,
}

impl<A: Animation> Delayed<A> {
    pub fn new(delay: Duration, inner: A) -> Self {
        Self {
            delay,
            elapsed: Duration::ZERO,
            inner,
        }
    }

    pub fn has_started(&self) -> bool {
        self.elapsed >= self.delay
    }
}

impl<A: Animation> Animation for Delayed<A> {
    fn tick(&mut self, dt: Duration) {
        if self.has_started() {
            self.inner.tick(dt);
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        let overshoot = self.elapsed.saturating_sub(self.delay);
        if self.has_started() && !overshoot.is_zero() {
            self.inner.tick(overshoot);
        }
    }

    fn is_complete(&self) -> bool {
        self.has_started() && self.inner.is_complete()
    }

    fn value(&self) -> f32 {
        if self.has_started() {
            self.inner.value()
        } else {
            0.0
        }
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.inner.reset();
    }
}

/// Convenience constructor for [`Delayed`].
pub fn delay<A: Animation>(d: Duration, a: A) -> Delayed<A> {
    Delayed::new(d, a)
}
