// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Hosted scheduler backend
//!
//! Runs the primitives on a regular operating system: each kernel thread is
//! an OS thread, `block`/`wake` map to `park`/`unpark`, and interrupt context
//! is a per-thread flag raised by [`HostScheduler::interrupt`].
//!
//! Threads stay registered while they are alive. Each registration holds a
//! weak reference to a per-thread token dropped at thread exit, and exited
//! threads are pruned on the next call to `current`.
//!
//! Interrupt masking is a no-op here. The primitives keep their shared state
//! behind spin locks, which is what keeps real concurrent OS threads safe.

use core::cell::Cell;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, Thread};
use std::vec::Vec;

use spin::Mutex;

use crate::sched::thread::{new_thread_id, ThreadId, ThreadPriority};
use crate::traits::Scheduler;

std::thread_local! {
    static THREAD_ID: Cell<Option<ThreadId>> = const { Cell::new(None) };
    static PRIORITY: Cell<ThreadPriority> = const { Cell::new(ThreadPriority::Normal) };
    static IN_ISR: Cell<bool> = const { Cell::new(false) };
    static ALIVE: Arc<()> = Arc::new(());
}

/// Registered OS thread
struct HostThread {
    id: ThreadId,
    handle: Thread,
    /// Dead once the thread has exited
    alive: Weak<()>,
}

/// Scheduler backed by OS threads
pub struct HostScheduler {
    /// Live threads that have asked for their id
    threads: Mutex<Vec<HostThread>>,

    /// Threads currently parked in `block`
    blocked: AtomicUsize,
}

impl HostScheduler {
    /// Create a new hosted scheduler
    pub const fn new() -> Self {
        Self {
            threads: Mutex::new(Vec::new()),
            blocked: AtomicUsize::new(0),
        }
    }

    /// Run `handler` as if it were an interrupt service routine
    ///
    /// While `handler` runs, [`Scheduler::in_isr`] reports `true` on the
    /// calling thread.
    pub fn interrupt<R>(&self, handler: impl FnOnce() -> R) -> R {
        let previous = IN_ISR.with(|flag| flag.replace(true));
        let result = handler();
        IN_ISR.with(|flag| flag.set(previous));
        result
    }

    /// Set the priority reported for the calling thread
    pub fn set_priority(&self, priority: ThreadPriority) {
        PRIORITY.with(|p| p.set(priority));
    }

    /// Number of threads currently parked in `block`
    pub fn blocked_count(&self) -> usize {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Number of threads in the registry
    pub fn registered_threads(&self) -> usize {
        self.threads.lock().len()
    }
}

impl Default for HostScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostScheduler")
            .field("threads", &self.threads.lock().len())
            .field("blocked", &self.blocked_count())
            .finish()
    }
}

impl Scheduler for HostScheduler {
    fn current(&self) -> ThreadId {
        let id = THREAD_ID.with(|cell| match cell.get() {
            Some(id) => id,
            None => {
                let id = new_thread_id();
                cell.set(Some(id));
                id
            }
        });

        let mut threads = self.threads.lock();
        threads.retain(|t| t.alive.strong_count() > 0);
        if !threads.iter().any(|t| t.id == id) {
            threads.push(HostThread {
                id,
                handle: thread::current(),
                alive: ALIVE.with(Arc::downgrade),
            });
        }

        id
    }

    fn current_priority(&self) -> ThreadPriority {
        PRIORITY.with(|p| p.get())
    }

    fn block(&self) {
        self.blocked.fetch_add(1, Ordering::SeqCst);
        thread::park();
        self.blocked.fetch_sub(1, Ordering::SeqCst);
    }

    fn wake(&self, thread: ThreadId) {
        let target = self
            .threads
            .lock()
            .iter()
            .find(|t| t.id == thread)
            .map(|t| t.handle.clone());

        if let Some(handle) = target {
            handle.unpark();
        }
    }

    fn yield_now(&self) {
        thread::yield_now();
    }

    fn in_isr(&self) -> bool {
        IN_ISR.with(|flag| flag.get())
    }

    fn disable_interrupts(&self) -> bool {
        false
    }

    fn restore_interrupts(&self, _was_enabled: bool) {}
}
