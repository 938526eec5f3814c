// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Deadline Integration Tests
//!
//! The primitives have no per-call timeout. A driver that needs one arms a
//! one-shot timer whose callback raises a timeout bit on the same event the
//! data path raises its ready bit on.

use std::thread;

use crate::sched::HostScheduler;
use crate::sync::Event;
use crate::testing::wait_for_blocked;
use crate::time::{Ticks, Timer, TimerFlags, TimerQueue};

const RX_READY: u32 = 1 << 0;
const TIMEOUT: u32 = 1 << 1;

/// Test that the timeout bit releases a waiter when no data arrives
#[test]
fn test_wait_with_timeout_expires() {
    let sched = HostScheduler::new();
    let event = Event::new(&sched);
    let on_timeout = || event.write_isr(TIMEOUT);
    let timers = TimerQueue::new(&sched, 100);

    let timer = Timer::new(&timers, Ticks(5), &on_timeout, TimerFlags::empty());

    thread::scope(|s| {
        let waiter = s.spawn(|| event.wait(RX_READY | TIMEOUT));

        timer.start().unwrap();
        wait_for_blocked(&sched, 1);
        for _ in 0..5 {
            sched.interrupt(|| timers.tick());
        }

        assert_eq!(waiter.join().unwrap(), TIMEOUT);
    });

    assert!(!timer.is_pending());
    assert_eq!(event.value(), 0);
}

/// Test that data beats the deadline and the timer is cancelled
#[test]
fn test_wait_with_timeout_data_first() {
    let sched = HostScheduler::new();
    let event = Event::new(&sched);
    let on_timeout = || event.write_isr(TIMEOUT);
    let timers = TimerQueue::new(&sched, 100);

    let timer = Timer::new(&timers, Ticks(5), &on_timeout, TimerFlags::empty());

    thread::scope(|s| {
        let waiter = s.spawn(|| {
            let bits = event.wait(RX_READY | TIMEOUT);
            if bits & RX_READY != 0 {
                timer.stop();
            }
            bits
        });

        timer.start().unwrap();
        wait_for_blocked(&sched, 1);
        sched.interrupt(|| timers.tick());
        sched.interrupt(|| event.write_isr(RX_READY));

        assert_eq!(waiter.join().unwrap(), RX_READY);
    });

    // Cancelled before its deadline: later ticks raise nothing
    for _ in 0..10 {
        timers.tick();
    }
    assert_eq!(event.value(), 0);
}
