// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Wait Queue
//!
//! This module provides the wait lists the primitives park threads on.
//!
//! # Design
//!
//! - **Priority-ordered**: Threads queued by priority (higher first)
//! - **Fair ordering**: FIFO within same priority level
//! - **Fixed capacity**: No allocation, so waking is safe from interrupt handlers
//! - **Interest word**: Each entry carries a mask the owner filters on
//!
//! Every operation masks interrupts while it holds the list lock.
//!
//! # Usage
//!
//! ```ignore
//! let wq = WaitQueue::new();
//!
//! // Register the current thread, re-check the condition, then block
//! wq.enqueue(sched, WaitQueueEntry::current(sched, 0));
//! sched.block();
//!
//! // From the producer side
//! wq.wake_one(sched);
//! ```

use spin::Mutex;

use crate::config::MAX_WAITERS;
use crate::sched::{ThreadId, ThreadPriority};
use crate::sync::critical::CriticalSection;
use crate::traits::Scheduler;

/// Wait queue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitQueueEntry {
    /// Waiter ID
    pub waiter_id: ThreadId,

    /// Waiter priority
    pub priority: ThreadPriority,

    /// Owner-defined interest mask (Event stores the awaited bits here)
    pub interest: u32,
}

impl WaitQueueEntry {
    /// Entry describing the calling thread
    pub fn current(sched: &dyn Scheduler, interest: u32) -> Self {
        Self {
            waiter_id: sched.current(),
            priority: sched.current_priority(),
            interest,
        }
    }
}

/// Inner queue data, kept sorted: index 0 is released first
struct WaitQueueInner {
    entries: [Option<WaitQueueEntry>; MAX_WAITERS],
    size: usize,
}

impl WaitQueueInner {
    const fn new() -> Self {
        Self {
            entries: [None; MAX_WAITERS],
            size: 0,
        }
    }

    fn position(&self, waiter_id: ThreadId) -> Option<usize> {
        self.entries[..self.size]
            .iter()
            .position(|e| matches!(e, Some(e) if e.waiter_id == waiter_id))
    }

    /// Insert behind every entry of equal or higher priority
    fn push_sorted(&mut self, entry: WaitQueueEntry) -> bool {
        if self.size >= MAX_WAITERS {
            return false;
        }

        let insert_pos = self.entries[..self.size]
            .iter()
            .position(|e| matches!(e, Some(e) if e.priority < entry.priority))
            .unwrap_or(self.size);

        let mut pos = self.size;
        while pos > insert_pos {
            self.entries[pos] = self.entries[pos - 1];
            pos -= 1;
        }

        self.entries[insert_pos] = Some(entry);
        self.size += 1;
        true
    }

    fn remove_at(&mut self, index: usize) -> Option<WaitQueueEntry> {
        if index >= self.size {
            return None;
        }

        let entry = self.entries[index].take();
        for pos in index..self.size - 1 {
            self.entries[pos] = self.entries[pos + 1];
        }
        self.entries[self.size - 1] = None;
        self.size -= 1;

        entry
    }
}

/// Wait queue
///
/// Tracks threads blocked on one condition of a primitive.
pub struct WaitQueue {
    queue: Mutex<WaitQueueInner>,
}

impl WaitQueue {
    /// Create a new wait queue
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(WaitQueueInner::new()),
        }
    }

    /// Number of queued waiters
    pub fn len(&self, sched: &dyn Scheduler) -> usize {
        let _cs = CriticalSection::enter(sched);
        self.queue.lock().size
    }

    /// Check if the queue is empty
    pub fn is_empty(&self, sched: &dyn Scheduler) -> bool {
        self.len(sched) == 0
    }

    /// Whether `waiter_id` is queued
    pub fn contains(&self, sched: &dyn Scheduler, waiter_id: ThreadId) -> bool {
        let _cs = CriticalSection::enter(sched);
        self.queue.lock().position(waiter_id).is_some()
    }

    /// Queue a waiter, or refresh its entry if it is already queued
    ///
    /// # Panics
    ///
    /// More than [`MAX_WAITERS`] distinct waiters is a configuration error.
    pub fn enqueue(&self, sched: &dyn Scheduler, entry: WaitQueueEntry) {
        let _cs = CriticalSection::enter(sched);
        let mut queue = self.queue.lock();

        if let Some(index) = queue.position(entry.waiter_id) {
            queue.remove_at(index);
        }

        if !queue.push_sorted(entry) {
            drop(queue);
            log::error!("wait_queue: more than {} waiters", MAX_WAITERS);
            panic!("wait_queue: more than {} waiters", MAX_WAITERS);
        }
    }

    /// Drop a waiter without waking it
    ///
    /// Returns true if it was queued.
    pub fn remove(&self, sched: &dyn Scheduler, waiter_id: ThreadId) -> bool {
        let _cs = CriticalSection::enter(sched);
        let mut queue = self.queue.lock();
        match queue.position(waiter_id) {
            Some(index) => queue.remove_at(index).is_some(),
            None => false,
        }
    }

    /// Wake the first waiter (highest priority, then oldest)
    pub fn wake_one(&self, sched: &dyn Scheduler) -> Option<ThreadId> {
        let entry = {
            let _cs = CriticalSection::enter(sched);
            self.queue.lock().remove_at(0)
        };

        entry.map(|entry| {
            sched.wake(entry.waiter_id);
            entry.waiter_id
        })
    }

    /// Wake all waiters
    ///
    /// # Returns
    ///
    /// Number of waiters woken
    pub fn wake_all(&self, sched: &dyn Scheduler) -> usize {
        self.wake_where(sched, |_| true)
    }

    /// Wake every waiter whose interest intersects `signal`
    pub fn wake_matching(&self, sched: &dyn Scheduler, signal: u32) -> usize {
        self.wake_where(sched, |entry| entry.interest & signal != 0)
    }

    fn wake_where(&self, sched: &dyn Scheduler, pred: impl Fn(&WaitQueueEntry) -> bool) -> usize {
        let mut woken = [0 as ThreadId; MAX_WAITERS];
        let mut count = 0;

        {
            let _cs = CriticalSection::enter(sched);
            let mut queue = self.queue.lock();
            let mut index = 0;
            while index < queue.size {
                let current = queue.entries[index];
                match current {
                    Some(entry) if pred(&entry) => {
                        queue.remove_at(index);
                        woken[count] = entry.waiter_id;
                        count += 1;
                    }
                    _ => index += 1,
                }
            }
        }

        for &waiter in &woken[..count] {
            sched.wake(waiter);
        }

        count
    }
}

impl Default for WaitQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::HostScheduler;

    fn entry(waiter_id: ThreadId, priority: ThreadPriority) -> WaitQueueEntry {
        WaitQueueEntry {
            waiter_id,
            priority,
            interest: 0,
        }
    }

    #[test]
    fn test_wait_queue_empty() {
        let sched = HostScheduler::new();
        let wq = WaitQueue::new();
        assert!(wq.is_empty(&sched));
        assert!(wq.wake_one(&sched).is_none());
        assert_eq!(wq.wake_all(&sched), 0);
    }

    #[test]
    fn test_wait_queue_priority_order() {
        let sched = HostScheduler::new();
        let wq = WaitQueue::new();

        wq.enqueue(&sched, entry(1, ThreadPriority::Low));
        wq.enqueue(&sched, entry(2, ThreadPriority::Realtime));
        wq.enqueue(&sched, entry(3, ThreadPriority::High));

        assert_eq!(wq.wake_one(&sched), Some(2));
        assert_eq!(wq.wake_one(&sched), Some(3));
        assert_eq!(wq.wake_one(&sched), Some(1));
        assert_eq!(wq.wake_one(&sched), None);
    }

    #[test]
    fn test_wait_queue_fifo_within_priority() {
        let sched = HostScheduler::new();
        let wq = WaitQueue::new();

        wq.enqueue(&sched, entry(10, ThreadPriority::Normal));
        wq.enqueue(&sched, entry(11, ThreadPriority::Normal));
        wq.enqueue(&sched, entry(12, ThreadPriority::Normal));

        assert_eq!(wq.wake_one(&sched), Some(10));
        assert_eq!(wq.wake_one(&sched), Some(11));
        assert_eq!(wq.wake_one(&sched), Some(12));
    }

    #[test]
    fn test_enqueue_twice_keeps_one_entry() {
        let sched = HostScheduler::new();
        let wq = WaitQueue::new();

        wq.enqueue(&sched, entry(5, ThreadPriority::Normal));
        wq.enqueue(&sched, entry(5, ThreadPriority::Normal));
        assert_eq!(wq.len(&sched), 1);

        assert!(wq.remove(&sched, 5));
        assert!(!wq.remove(&sched, 5));
        assert!(wq.is_empty(&sched));
    }

    #[test]
    fn test_wake_matching() {
        let sched = HostScheduler::new();
        let wq = WaitQueue::new();

        wq.enqueue(
            &sched,
            WaitQueueEntry {
                waiter_id: 1,
                priority: ThreadPriority::Normal,
                interest: 0b001,
            },
        );
        wq.enqueue(
            &sched,
            WaitQueueEntry {
                waiter_id: 2,
                priority: ThreadPriority::Normal,
                interest: 0b110,
            },
        );
        wq.enqueue(
            &sched,
            WaitQueueEntry {
                waiter_id: 3,
                priority: ThreadPriority::Normal,
                interest: 0b100,
            },
        );

        assert_eq!(wq.wake_matching(&sched, 0b100), 2);
        assert_eq!(wq.len(&sched), 1);
        assert!(wq.contains(&sched, 1));
    }

    #[test]
    #[should_panic(expected = "more than")]
    fn test_overflow_panics() {
        let sched = HostScheduler::new();
        let wq = WaitQueue::new();

        for id in 0..=MAX_WAITERS as ThreadId {
            wq.enqueue(&sched, entry(id, ThreadPriority::Normal));
        }
    }
}
