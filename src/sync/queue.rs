// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Queue
//!
//! A fixed-capacity byte ring shared between interrupt handlers and threads.
//!
//! # Design
//!
//! - **Fixed storage**: Allocated once at construction, never resized
//! - **Split cursors**: Producers only advance the write cursor, readers
//!   only advance the read cursor; the fill level is derived from both, so
//!   no field is written by both sides
//! - **ISR path**: [`Queue::write_isr`] never blocks. When the ring is full
//!   it writes what fits and reports the short count. That truncation is the
//!   only way this queue loses data, and callers must treat it as backpressure.
//! - **Short reads**: [`Queue::read`] returns as soon as any byte is available
//! - **Stop/start**: [`Queue::stop`] releases every blocked caller with
//!   end-of-stream (0) and keeps buffered bytes; [`Queue::start`] re-arms
//!   blocking
//!
//! Cursors run over `[0, 2 * capacity)` so that "empty" (equal cursors) and
//! "full" (cursors `capacity` apart) stay distinguishable without a counter.
//!
//! # Usage
//!
//! ```ignore
//! let rx = Queue::new(sched, 128);
//!
//! // UART receive interrupt
//! let stored = rx.write_isr(&[byte]);
//!
//! // Reader thread
//! let mut buf = [0u8; 32];
//! let n = rx.read(&mut buf);
//! if n == 0 {
//!     // queue stopped: connection gone
//! }
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::UnsafeCell;
use core::fmt;
use core::ptr;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use spin::Mutex;

use crate::chan::Transport;
use crate::error::Result;
use crate::sync::critical::{assert_thread_context, CriticalSection};
use crate::sync::wait_queue::{WaitQueue, WaitQueueEntry};
use crate::traits::Scheduler;

/// Bounded byte queue
pub struct Queue<'k> {
    /// Scheduler used to block and wake callers
    sched: &'k dyn Scheduler,

    /// Ring storage
    storage: Box<[UnsafeCell<u8>]>,

    /// Write cursor in `[0, 2 * capacity)`, advanced only by producers
    write_pos: AtomicUsize,

    /// Read cursor in `[0, 2 * capacity)`, advanced only by readers
    read_pos: AtomicUsize,

    /// Set between `stop` and `start`
    stopped: AtomicBool,

    /// Bumped by every `stop`; blocked callers compare against it
    stop_generation: AtomicU32,

    /// Serializes producers (thread writers and ISR writers)
    producer: Mutex<()>,

    /// Serializes readers
    consumer: Mutex<()>,

    /// Readers blocked on empty
    readers: WaitQueue,

    /// Writers blocked on full
    writers: WaitQueue,
}

// Storage regions are handed out by the cursor protocol: producers touch
// only the free region, readers only the filled region.
unsafe impl Sync for Queue<'_> {}

impl<'k> Queue<'k> {
    /// Create an empty queue with `capacity` bytes of storage
    ///
    /// # Panics
    ///
    /// A zero capacity is a configuration error.
    pub fn new(sched: &'k dyn Scheduler, capacity: usize) -> Self {
        let storage: Vec<UnsafeCell<u8>> = (0..capacity).map(|_| UnsafeCell::new(0)).collect();
        Self::with_storage(sched, storage.into_boxed_slice())
    }

    /// Create an empty queue that adopts `buffer` as its storage
    ///
    /// # Panics
    ///
    /// An empty buffer is a configuration error.
    pub fn from_buffer(sched: &'k dyn Scheduler, buffer: Box<[u8]>) -> Self {
        let raw = Box::into_raw(buffer) as *mut [UnsafeCell<u8>];
        // SAFETY: UnsafeCell<u8> is repr(transparent) over u8, so the slice
        // layout is identical and ownership moves back into a Box.
        let storage = unsafe { Box::from_raw(raw) };
        Self::with_storage(sched, storage)
    }

    fn with_storage(sched: &'k dyn Scheduler, storage: Box<[UnsafeCell<u8>]>) -> Self {
        assert!(!storage.is_empty(), "queue: capacity must be non-zero");
        assert!(storage.len() <= usize::MAX / 2, "queue: capacity too large");

        Self {
            sched,
            storage,
            write_pos: AtomicUsize::new(0),
            read_pos: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
            stop_generation: AtomicU32::new(0),
            producer: Mutex::new(()),
            consumer: Mutex::new(()),
            readers: WaitQueue::new(),
            writers: WaitQueue::new(),
        }
    }

    /// Total storage in bytes
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of buffered bytes
    pub fn size(&self) -> usize {
        loop {
            let read = self.read_pos.load(Ordering::Acquire);
            let write = self.write_pos.load(Ordering::Acquire);
            if self.read_pos.load(Ordering::Acquire) == read {
                return self.distance(read, write);
            }
        }
    }

    /// Number of free bytes
    pub fn unused_size(&self) -> usize {
        self.capacity() - self.size()
    }

    /// Whether the queue is between `stop` and `start`
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Copy up to `dst.len()` bytes out, blocking while the queue is empty
    ///
    /// Returns as soon as at least one byte is available. Returns 0 for
    /// end-of-stream: the queue is stopped and empty, or it was stopped while
    /// this call was blocked. An empty `dst` returns 0 at once.
    ///
    /// # Panics
    ///
    /// Called from interrupt context.
    pub fn read(&self, dst: &mut [u8]) -> usize {
        if dst.is_empty() {
            return 0;
        }

        assert_thread_context(self.sched, "queue: read");

        let len = dst.len();
        let generation = self.stop_generation.load(Ordering::SeqCst);
        let entry = WaitQueueEntry::current(self.sched, 0);

        let read = loop {
            if self.stop_generation.load(Ordering::SeqCst) != generation {
                break 0;
            }

            let n = self.pop(Some(&mut *dst), len);
            if n > 0 {
                break n;
            }

            if self.is_stopped() {
                break 0;
            }

            self.readers.enqueue(self.sched, entry);

            // Data or a stop may have landed before we were queued
            if self.size() > 0
                || self.is_stopped()
                || self.stop_generation.load(Ordering::SeqCst) != generation
            {
                continue;
            }

            self.sched.block();
        };

        self.readers.remove(self.sched, entry.waiter_id);

        if read > 0 && self.writers.wake_one(self.sched).is_some() {
            self.sched.yield_now();
        }

        read
    }

    /// Copy all of `src` in, blocking while the queue is full
    ///
    /// Returns `src.len()` unless the queue is stopped first, in which case
    /// the bytes stored before the stop are reported (possibly 0).
    ///
    /// # Panics
    ///
    /// Called from interrupt context.
    pub fn write(&self, src: &[u8]) -> usize {
        if src.is_empty() {
            return 0;
        }

        assert_thread_context(self.sched, "queue: write");

        let generation = self.stop_generation.load(Ordering::SeqCst);
        let entry = WaitQueueEntry::current(self.sched, 0);
        let mut written = 0;

        loop {
            if self.is_stopped() || self.stop_generation.load(Ordering::SeqCst) != generation {
                break;
            }

            let n = {
                let _cs = CriticalSection::enter(self.sched);
                let _producer = self.producer.lock();
                self.push(&src[written..])
            };

            if n > 0 {
                written += n;
                if self.readers.wake_one(self.sched).is_some() {
                    self.sched.yield_now();
                }
            }

            if written == src.len() {
                break;
            }

            self.writers.enqueue(self.sched, entry);

            // Space or a stop may have landed before we were queued
            if self.unused_size() > 0
                || self.is_stopped()
                || self.stop_generation.load(Ordering::SeqCst) != generation
            {
                continue;
            }

            self.sched.block();
        }

        self.writers.remove(self.sched, entry.waiter_id);
        written
    }

    /// Copy as much of `src` as fits, never blocking
    ///
    /// Safe from interrupt context. Returns the number of bytes stored: less
    /// than `src.len()` (possibly 0) when the queue is full, and 0 when it is
    /// stopped. Unread bytes are never overwritten.
    pub fn write_isr(&self, src: &[u8]) -> usize {
        if src.is_empty() || self.is_stopped() {
            return 0;
        }

        let n = {
            let _cs = CriticalSection::enter(self.sched);
            let _producer = self.producer.lock();
            self.push(src)
        };

        if n < src.len() {
            log::trace!("queue: isr write truncated to {} of {} bytes", n, src.len());
        }

        if n > 0 {
            self.readers.wake_one(self.sched);
        }

        n
    }

    /// Discard up to `size` buffered bytes without copying them
    ///
    /// Returns the number of bytes dropped.
    pub fn ignore(&self, size: usize) -> usize {
        let n = self.pop(None, size);
        if n > 0 {
            self.writers.wake_one(self.sched);
        }
        n
    }

    /// Release every blocked reader and writer with end-of-stream
    ///
    /// Buffered bytes stay readable. Until [`start`](Self::start), reads of
    /// an empty queue return 0 instead of blocking and writes store nothing.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.stop_generation.fetch_add(1, Ordering::SeqCst);

        let woken = self.readers.wake_all(self.sched) + self.writers.wake_all(self.sched);
        log::debug!("queue: stopped, released {} waiters", woken);
    }

    /// Re-arm blocking after [`stop`](Self::stop)
    pub fn start(&self) {
        self.stopped.store(false, Ordering::SeqCst);
        log::debug!("queue: started");
    }

    // ------------------------------------------------------------------------
    // Cursor arithmetic
    // ------------------------------------------------------------------------

    fn distance(&self, from: usize, to: usize) -> usize {
        if to >= from {
            to - from
        } else {
            to + 2 * self.capacity() - from
        }
    }

    fn advance(&self, pos: usize, n: usize) -> usize {
        let next = pos + n;
        if next >= 2 * self.capacity() {
            next - 2 * self.capacity()
        } else {
            next
        }
    }

    fn index(&self, pos: usize) -> usize {
        if pos >= self.capacity() {
            pos - self.capacity()
        } else {
            pos
        }
    }

    fn base(&self) -> *mut u8 {
        UnsafeCell::raw_get(self.storage.as_ptr())
    }

    /// Store as much of `src` as fits; caller holds the producer lock
    fn push(&self, src: &[u8]) -> usize {
        let write = self.write_pos.load(Ordering::Relaxed);
        let read = self.read_pos.load(Ordering::Acquire);
        let free = self.capacity() - self.distance(read, write);
        let n = free.min(src.len());
        if n == 0 {
            return 0;
        }

        let start = self.index(write);
        let first = n.min(self.capacity() - start);

        // SAFETY: [start, start + n) modulo capacity is the free region. Only
        // the producer lock holder writes it and readers do not look at it
        // until the cursor store below publishes it.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), self.base().add(start), first);
            ptr::copy_nonoverlapping(src.as_ptr().add(first), self.base(), n - first);
        }

        self.write_pos.store(self.advance(write, n), Ordering::Release);
        n
    }

    /// Take up to `limit` bytes, copying into `dst` when given
    fn pop(&self, dst: Option<&mut [u8]>, limit: usize) -> usize {
        let _cs = CriticalSection::enter(self.sched);
        let _consumer = self.consumer.lock();

        let read = self.read_pos.load(Ordering::Relaxed);
        let write = self.write_pos.load(Ordering::Acquire);
        let n = self.distance(read, write).min(limit);
        if n == 0 {
            return 0;
        }

        if let Some(dst) = dst {
            let start = self.index(read);
            let first = n.min(self.capacity() - start);

            // SAFETY: [start, start + n) modulo capacity was published by the
            // Acquire load above. Producers leave it alone until the read
            // cursor moves past it.
            unsafe {
                ptr::copy_nonoverlapping(self.base().add(start), dst.as_mut_ptr(), first);
                ptr::copy_nonoverlapping(self.base(), dst.as_mut_ptr().add(first), n - first);
            }
        }

        self.read_pos.store(self.advance(read, n), Ordering::Release);
        n
    }
}

impl fmt::Debug for Queue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("capacity", &self.capacity())
            .field("size", &self.size())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl Transport for Queue<'_> {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        Ok(Queue::read(self, buf))
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        Ok(Queue::write(self, buf))
    }

    fn size(&self) -> usize {
        Queue::size(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
