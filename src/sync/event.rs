// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Event
//!
//! An event is a 32-bit signal word. Any context may OR bits into it;
//! threads wait for any bit of a mask and consume what they get.
//!
//! # Design
//!
//! - **Sticky bits**: A set bit stays set until a waiter consumes it
//! - **Consume on wait**: `wait` clears exactly the bits it returns
//! - **Selective wake**: A write wakes only waiters whose mask now matches
//! - **Channel**: Events also speak the [`Transport`] interface, 4 bytes at a time
//!
//! # Usage
//!
//! ```ignore
//! let event = Event::new(sched);
//!
//! // Interrupt handler
//! event.write_isr(RX_DONE);
//!
//! // Thread
//! let bits = event.wait(RX_DONE | TX_DONE);
//! ```

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::chan::Transport;
use crate::error::{Error, Result};
use crate::sync::critical::assert_thread_context;
use crate::sync::wait_queue::{WaitQueue, WaitQueueEntry};
use crate::traits::Scheduler;

/// Size of a mask on the channel interface
const MASK_SIZE: usize = core::mem::size_of::<u32>();

/// Event synchronization primitive
pub struct Event<'k> {
    /// Scheduler used to block and wake waiters
    sched: &'k dyn Scheduler,

    /// Currently set bits
    signal: AtomicU32,

    /// Blocked waiters, interest = requested mask
    waiters: WaitQueue,
}

impl<'k> Event<'k> {
    /// Create an event with no bits set
    pub const fn new(sched: &'k dyn Scheduler) -> Self {
        Self {
            sched,
            signal: AtomicU32::new(0),
            waiters: WaitQueue::new(),
        }
    }

    /// Block until any bit of `mask` is set
    ///
    /// Returns the matched bits and clears them from the signal. A zero
    /// mask returns 0 immediately.
    ///
    /// # Panics
    ///
    /// Called from interrupt context.
    pub fn wait(&self, mask: u32) -> u32 {
        if mask == 0 {
            return 0;
        }

        assert_thread_context(self.sched, "event: wait");

        let entry = WaitQueueEntry::current(self.sched, mask);

        let matched = loop {
            let matched = self.take(mask);
            if matched != 0 {
                break matched;
            }

            self.waiters.enqueue(self.sched, entry);

            // A write between take() and enqueue() saw no waiter
            if self.signal.load(Ordering::SeqCst) & mask != 0 {
                continue;
            }

            self.sched.block();
        };

        self.waiters.remove(self.sched, entry.waiter_id);
        matched
    }

    /// Consume the bits of `mask` that are set, without blocking
    ///
    /// Returns 0 when none is set.
    pub fn poll(&self, mask: u32) -> u32 {
        self.take(mask)
    }

    /// Set `mask` and wake matching waiters (thread context)
    ///
    /// Yields if a waiter was woken so a higher-priority one can run now.
    pub fn write(&self, mask: u32) {
        if self.signal_and_wake(mask) > 0 {
            self.sched.yield_now();
        }
    }

    /// Set `mask` and wake matching waiters (interrupt context)
    ///
    /// Never yields; the switch happens on interrupt return.
    pub fn write_isr(&self, mask: u32) {
        self.signal_and_wake(mask);
    }

    /// Current signal word
    pub fn value(&self) -> u32 {
        self.signal.load(Ordering::SeqCst)
    }

    /// 1 if any bit is set, else 0
    pub fn size(&self) -> usize {
        (self.value() != 0) as usize
    }

    fn take(&self, mask: u32) -> u32 {
        self.signal.fetch_and(!mask, Ordering::SeqCst) & mask
    }

    fn signal_and_wake(&self, mask: u32) -> usize {
        if mask == 0 {
            return 0;
        }

        let signal = self.signal.fetch_or(mask, Ordering::SeqCst) | mask;
        self.waiters.wake_matching(self.sched, signal)
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("signal", &format_args!("{:#x}", self.value()))
            .finish()
    }
}

impl Transport for Event<'_> {
    /// Read exactly one mask: requested bits in, matched bits out
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let bytes: &mut [u8; MASK_SIZE] = buf.try_into().map_err(|_| Error::InvalidArgument)?;
        let matched = self.wait(u32::from_ne_bytes(*bytes));
        *bytes = matched.to_ne_bytes();
        Ok(MASK_SIZE)
    }

    /// Write exactly one mask
    fn write(&self, buf: &[u8]) -> Result<usize> {
        let bytes: [u8; MASK_SIZE] = buf.try_into().map_err(|_| Error::InvalidArgument)?;
        Event::write(self, u32::from_ne_bytes(bytes));
        Ok(MASK_SIZE)
    }

    fn size(&self) -> usize {
        Event::size(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
