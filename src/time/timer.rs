// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Timers
//!
//! Tick-driven one-shot and periodic callbacks.
//!
//! # Design
//!
//! - **One-shot**: Fire once at the deadline
//! - **Periodic**: Fire every interval; the next deadline is the previous
//!   deadline plus the interval, so late ticks or slow callbacks never shift
//!   the schedule
//! - **Interrupt context**: Callbacks run from [`TimerQueue::tick`] and must
//!   only call non-blocking operations such as `Queue::write_isr`
//! - **Fixed capacity**: The pending list is allocated once, so arming never
//!   allocates
//!
//! # Usage
//!
//! ```ignore
//! let sample = || { queue.write_isr(&read_pins()); };
//! let timers = TimerQueue::new(sched, 1000);
//! let timer = Timer::new(&timers, Ticks(1), &sample, TimerFlags::PERIODIC);
//! timer.start()?;
//!
//! // tick interrupt
//! timers.tick();
//! ```

use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use core::time::Duration;

use bitflags::bitflags;
use spin::Mutex;

use crate::config::{DEFAULT_TICK_FREQUENCY_HZ, MAX_PENDING_TIMERS};
use crate::error::{Error, Result};
use crate::sync::critical::CriticalSection;
use crate::time::tick::{Tick, Ticks};
use crate::traits::Scheduler;

/// ============================================================================
/// Timer ID
/// ============================================================================

/// Timer identifier
pub type TimerId = u64;

/// Allocate a new timer ID
fn alloc_timer_id() -> TimerId {
    static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

    NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed)
}

bitflags! {
    /// Timer mode flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TimerFlags: u32 {
        /// Re-arm after every expiry
        const PERIODIC = 1 << 0;
    }
}

/// Timer callback, run from interrupt context
pub type TimerCallback<'a> = &'a (dyn Fn() + Sync);

/// ============================================================================
/// Timer Queue
/// ============================================================================

/// Armed timer
#[derive(Clone, Copy)]
struct PendingTimer<'a> {
    id: TimerId,
    deadline: Tick,
    interval: Ticks,
    periodic: bool,
    callback: TimerCallback<'a>,
}

/// Pending timers of one tick source, earliest deadline first
pub struct TimerQueue<'a> {
    /// Scheduler used to mask the tick interrupt
    sched: &'a dyn Scheduler,

    /// Current tick
    now: AtomicU32,

    /// Tick rate
    hz: u32,

    /// Armed timers sorted by deadline; equal deadlines in arming order
    pending: Mutex<Vec<PendingTimer<'a>>>,
}

impl<'a> TimerQueue<'a> {
    /// Create an empty timer queue at tick 0
    pub fn new(sched: &'a dyn Scheduler, hz: u32) -> Self {
        Self::starting_at(sched, hz, Tick(0))
    }

    /// Create an empty timer queue at the kernel's default tick rate
    pub fn with_default_rate(sched: &'a dyn Scheduler) -> Self {
        Self::new(sched, DEFAULT_TICK_FREQUENCY_HZ)
    }

    /// Create an empty timer queue whose clock reads `now`
    pub fn starting_at(sched: &'a dyn Scheduler, hz: u32, now: Tick) -> Self {
        Self {
            sched,
            now: AtomicU32::new(now.0),
            hz,
            pending: Mutex::new(Vec::with_capacity(MAX_PENDING_TIMERS)),
        }
    }

    /// Current tick
    pub fn now(&self) -> Tick {
        Tick(self.now.load(Ordering::Acquire))
    }

    /// Tick rate in Hz
    pub fn frequency_hz(&self) -> u32 {
        self.hz
    }

    /// Convert a duration to ticks at this queue's rate
    pub fn ticks(&self, duration: Duration) -> Ticks {
        Ticks::from_duration(duration, self.hz)
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        let _cs = CriticalSection::enter(self.sched);
        self.pending.lock().len()
    }

    /// Tick interrupt handler: advance the clock by one tick
    ///
    /// Returns the number of callbacks fired.
    pub fn tick(&self) -> usize {
        self.advance(Ticks(1))
    }

    /// Advance the clock by `elapsed` ticks and fire everything due
    ///
    /// Periodic timers that missed several deadlines fire once per missed
    /// deadline, in deadline order.
    pub fn advance(&self, elapsed: Ticks) -> usize {
        let now = Tick(self.now.fetch_add(elapsed.0, Ordering::AcqRel)).wrapping_add(elapsed);
        let mut fired = 0;

        while let Some(callback) = self.pop_due(now) {
            callback();
            fired += 1;
        }

        fired
    }

    /// Remove the earliest timer if it is due, re-arming periodic ones
    fn pop_due(&self, now: Tick) -> Option<TimerCallback<'a>> {
        let _cs = CriticalSection::enter(self.sched);
        let mut pending = self.pending.lock();

        let first = *pending.first()?;
        if !first.deadline.is_due(now) {
            return None;
        }

        pending.remove(0);
        if first.periodic {
            let next = PendingTimer {
                deadline: first.deadline.wrapping_add(first.interval),
                ..first
            };
            Self::insert(&mut pending, now, next);
        }

        Some(first.callback)
    }

    /// Sorted insert; the caller guarantees a free slot
    fn insert(pending: &mut Vec<PendingTimer<'a>>, now: Tick, timer: PendingTimer<'a>) {
        let key = |t: &PendingTimer<'_>| t.deadline.0.wrapping_sub(now.0) as i32;
        let timer_key = key(&timer);
        let index = pending
            .iter()
            .position(|t| key(t) > timer_key)
            .unwrap_or(pending.len());
        pending.insert(index, timer);
    }

    fn arm(&self, timer: PendingTimer<'a>) -> Result<()> {
        let _cs = CriticalSection::enter(self.sched);
        let mut pending = self.pending.lock();

        pending.retain(|t| t.id != timer.id);
        if pending.len() >= MAX_PENDING_TIMERS {
            drop(pending);
            log::debug!("timer: queue full, cannot arm timer {}", timer.id);
            return Err(Error::TimerQueueFull);
        }

        Self::insert(&mut pending, self.now(), timer);
        log::trace!("timer: armed {} for {}", timer.id, timer.deadline);
        Ok(())
    }

    fn cancel(&self, id: TimerId) -> bool {
        let _cs = CriticalSection::enter(self.sched);
        let mut pending = self.pending.lock();

        let before = pending.len();
        pending.retain(|t| t.id != id);
        let removed = pending.len() != before;
        if removed {
            log::trace!("timer: cancelled {}", id);
        }
        removed
    }

    fn contains(&self, id: TimerId) -> bool {
        let _cs = CriticalSection::enter(self.sched);
        self.pending.lock().iter().any(|t| t.id == id)
    }
}

impl fmt::Debug for TimerQueue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now())
            .field("hz", &self.hz)
            .field("pending", &self.pending())
            .finish()
    }
}

/// ============================================================================
/// Timer
/// ============================================================================

/// Timer
///
/// Configured once, armed with [`start`](Self::start). Dropping the timer
/// disarms it.
pub struct Timer<'q, 'a> {
    /// Timer ID
    id: TimerId,

    /// Queue the timer is armed on
    queue: &'q TimerQueue<'a>,

    /// Delay to the first expiry, and the period of a periodic timer
    timeout: Ticks,

    /// Expiry callback
    callback: TimerCallback<'a>,

    /// Mode flags
    flags: TimerFlags,
}

impl<'q, 'a> Timer<'q, 'a> {
    /// Configure a timer without arming it
    ///
    /// The timeout is clamped to `[1, Ticks::MAX]` so the deadline is never
    /// read as already past.
    pub fn new(
        queue: &'q TimerQueue<'a>,
        timeout: Ticks,
        callback: TimerCallback<'a>,
        flags: TimerFlags,
    ) -> Self {
        Self {
            id: alloc_timer_id(),
            queue,
            timeout: timeout.clamped(),
            callback,
            flags,
        }
    }

    /// Get timer ID
    pub const fn id(&self) -> TimerId {
        self.id
    }

    /// Get the configured timeout
    pub const fn timeout(&self) -> Ticks {
        self.timeout
    }

    /// Check if the timer is periodic
    pub fn is_periodic(&self) -> bool {
        self.flags.contains(TimerFlags::PERIODIC)
    }

    /// Arm the timer `timeout` ticks from now
    ///
    /// Re-arms a timer that is already pending.
    pub fn start(&self) -> Result<()> {
        self.start_at(self.queue.now().wrapping_add(self.timeout))
    }

    /// Arm the timer for an absolute first deadline
    ///
    /// A deadline already in the past fires on the next tick. Deadlines are
    /// compared by signed distance from now, so `deadline` must lie within
    /// [`Ticks::MAX`] of the current tick to count as future.
    pub fn start_at(&self, deadline: Tick) -> Result<()> {
        self.queue.arm(PendingTimer {
            id: self.id,
            deadline,
            interval: self.timeout,
            periodic: self.is_periodic(),
            callback: self.callback,
        })
    }

    /// Disarm the timer
    ///
    /// Returns true if it was pending. Safe to call on a timer that already
    /// fired or was never started.
    pub fn stop(&self) -> bool {
        self.queue.cancel(self.id)
    }

    /// Whether the timer is armed
    pub fn is_pending(&self) -> bool {
        self.queue.contains(self.id)
    }
}

impl Drop for Timer<'_, '_> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for Timer<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id)
            .field("timeout", &self.timeout)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
