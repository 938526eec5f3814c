// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Critical sections and context checks
//!
//! On a single core, masking interrupts is enough to make a short sequence
//! atomic with respect to every interrupt handler. Thread-context code takes
//! a [`CriticalSection`] before grabbing any lock an ISR may also take, so
//! the ISR can never spin on a lock held by the thread it interrupted.

use crate::traits::Scheduler;

/// RAII guard masking interrupts for its lifetime
pub struct CriticalSection<'a> {
    sched: &'a dyn Scheduler,
    was_enabled: bool,
}

impl<'a> CriticalSection<'a> {
    /// Mask interrupts until the guard is dropped
    pub fn enter(sched: &'a dyn Scheduler) -> Self {
        let was_enabled = sched.disable_interrupts();
        Self { sched, was_enabled }
    }
}

impl Drop for CriticalSection<'_> {
    fn drop(&mut self) {
        self.sched.restore_interrupts(self.was_enabled);
    }
}

/// Run `f` with interrupts masked
pub fn critical<R>(sched: &dyn Scheduler, f: impl FnOnce() -> R) -> R {
    let _cs = CriticalSection::enter(sched);
    f()
}

/// Panic if a suspending operation is issued from an interrupt handler
pub(crate) fn assert_thread_context(sched: &dyn Scheduler, operation: &str) {
    if sched.in_isr() {
        log::error!("{}: blocking call from interrupt context", operation);
        panic!("{}: blocking call from interrupt context", operation);
    }
}
