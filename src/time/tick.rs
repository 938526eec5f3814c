// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Tick arithmetic
//!
//! The kernel tick counter is 32 bits wide and wraps. Instants are compared
//! by their signed distance, which is correct as long as the two instants
//! are less than 2^31 ticks apart.

use core::fmt;
use core::ops::Add;
use core::time::Duration;

/// Nanoseconds per second
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// A point in time, in kernel ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tick(pub u32);

/// A span of time, in kernel ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u32);

impl Tick {
    /// Get raw value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether `self` comes strictly before `other`, across wraparound
    pub const fn is_before(self, other: Tick) -> bool {
        (self.0.wrapping_sub(other.0) as i32) < 0
    }

    /// Whether a deadline at `self` has been reached at `now`
    pub const fn is_due(self, now: Tick) -> bool {
        !now.is_before(self)
    }

    /// Instant `span` after `self`
    pub const fn wrapping_add(self, span: Ticks) -> Tick {
        Tick(self.0.wrapping_add(span.0))
    }

    /// Ticks from `self` to `now`
    pub const fn elapsed(self, now: Tick) -> Ticks {
        Ticks(now.0.wrapping_sub(self.0))
    }
}

impl Add<Ticks> for Tick {
    type Output = Tick;

    fn add(self, span: Ticks) -> Tick {
        self.wrapping_add(span)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {}", self.0)
    }
}

impl Ticks {
    /// Longest span a deadline can be ahead of now
    ///
    /// Anything further reads as a deadline in the past.
    pub const MAX: Ticks = Ticks(i32::MAX as u32);

    /// Limit the span to `[1, Ticks::MAX]`
    pub const fn clamped(self) -> Self {
        if self.0 == 0 {
            Self(1)
        } else if self.0 > Self::MAX.0 {
            Self::MAX
        } else {
            self
        }
    }

    /// Convert a duration at `hz` ticks per second
    ///
    /// Rounds up so a timer never fires early, never returns less than one
    /// tick, and saturates at [`Ticks::MAX`].
    pub fn from_duration(duration: Duration, hz: u32) -> Self {
        let scaled = duration.as_nanos() * u128::from(hz);
        let ticks = scaled.div_ceil(NANOS_PER_SEC).max(1);
        Self(u32::try_from(ticks).unwrap_or(u32::MAX)).clamped()
    }

    /// Convert milliseconds at `hz` ticks per second
    pub fn from_millis(millis: u64, hz: u32) -> Self {
        Self::from_duration(Duration::from_millis(millis), hz)
    }

    /// Get raw value
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_across_wrap() {
        let before_wrap = Tick(u32::MAX - 1);
        let after_wrap = Tick(2);

        assert!(before_wrap.is_before(after_wrap));
        assert!(!after_wrap.is_before(before_wrap));
        assert!(!after_wrap.is_before(after_wrap));
        assert_eq!(before_wrap + Ticks(4), after_wrap);
        assert_eq!(before_wrap.elapsed(after_wrap), Ticks(4));
    }

    #[test]
    fn test_is_due() {
        let deadline = Tick(10);
        assert!(!deadline.is_due(Tick(9)));
        assert!(deadline.is_due(Tick(10)));
        assert!(deadline.is_due(Tick(11)));
    }

    #[test]
    fn test_from_duration_rounds_up() {
        assert_eq!(Ticks::from_millis(10, 100), Ticks(1));
        assert_eq!(Ticks::from_millis(15, 100), Ticks(2));
        assert_eq!(Ticks::from_millis(1000, 100), Ticks(100));
        assert_eq!(Ticks::from_millis(1, 1000), Ticks(1));
    }

    #[test]
    fn test_from_duration_minimum_and_saturation() {
        assert_eq!(Ticks::from_duration(Duration::ZERO, 100), Ticks(1));
        assert_eq!(Ticks::from_duration(Duration::from_nanos(1), 100), Ticks(1));
        assert_eq!(Ticks::from_duration(Duration::MAX, 1000), Ticks::MAX);
    }

    #[test]
    fn test_long_duration_stays_in_the_future() {
        let thirty_days = Duration::from_secs(30 * 24 * 3600);
        let span = Ticks::from_duration(thirty_days, 1000);
        assert_eq!(span, Ticks::MAX);

        let deadline = Tick(0) + span;
        assert!(!deadline.is_due(Tick(1)));
        assert!(deadline.is_due(deadline));
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Ticks(0).clamped(), Ticks(1));
        assert_eq!(Ticks(7).clamped(), Ticks(7));
        assert_eq!(Ticks(u32::MAX).clamped(), Ticks::MAX);
    }
}
