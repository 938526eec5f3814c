// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! # Ferrite - Synchronization and I/O Core
//!
//! Ferrite is the synchronization layer of a cooperative, interrupt-driven
//! kernel for small embedded devices. Drivers, protocol decoders and
//! application threads build on four primitives:
//!
//! - **Event**: process-wide bitmask signal with consume-on-wait semantics
//! - **Queue**: fixed-capacity byte ring with blocking thread-side paths and
//!   a non-blocking path for interrupt handlers
//! - **Channel**: uniform read/write/size interface over any byte transport
//! - **Timer**: one-shot and periodic callbacks driven by the kernel tick
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── traits.rs          # Scheduler collaborator trait
//! ├── sched/             # Thread ids, priorities, hosted scheduler
//! ├── sync/              # Critical sections, wait queues, Event, Queue
//! ├── chan/              # Transport trait, Channel, null and stub transports
//! ├── time/              # Tick arithmetic, timer queue, timers
//! ├── config.rs          # Compile-time limits
//! └── error.rs           # Error taxonomy
//! ```
//!
//! ## Scheduler Integration
//!
//! The primitives never touch a run queue. They call into a kernel-supplied
//! [`Scheduler`] to block the current thread, wake another one, and check
//! whether they run in interrupt context:
//!
//! ```ignore
//! use ferrite::{Queue, Event, Scheduler};
//!
//! fn setup(sched: &'static dyn Scheduler) {
//!     let rx = Queue::new(sched, 128);
//!     let events = Event::new(sched);
//!     // hand `rx` to the UART ISR and the reader thread
//! }
//! ```
//!
//! ## Context Rules
//!
//! - `Event::wait`, `Queue::read` and `Queue::write` may suspend the caller
//!   and must only be used from thread context.
//! - Everything else (`write_isr`, `size`, `stop`, `start`, timer tick) never
//!   blocks and is safe from interrupt handlers.

#![cfg_attr(not(any(test, feature = "host")), no_std)]

// Alloc crate for the queue buffer and boxed transports
extern crate alloc;

// Kernel collaborator traits
pub mod traits;

// Compile-time configuration
pub mod config;

// Error taxonomy
pub mod error;

// Thread identity and hosted scheduler
pub mod sched;

// Synchronization primitives
pub mod sync;

// Byte-stream channels
pub mod chan;

// Tick-driven timers
pub mod time;

// Testing infrastructure
#[cfg(test)]
pub mod testing;

// Re-export commonly used types
pub use traits::Scheduler;

pub use error::{Error, Result};

pub use sched::{ThreadId, ThreadPriority};

#[cfg(any(test, feature = "host"))]
pub use sched::HostScheduler;

pub use sync::{
    CriticalSection,
    Event,
    Queue,
    WaitQueue, WaitQueueEntry,
};

pub use chan::{Channel, Transport, NullTransport};

#[cfg(any(test, feature = "host"))]
pub use chan::StubTransport;

pub use time::{Tick, Ticks, Timer, TimerFlags, TimerQueue};

// Integration tests (only compiled in test mode)
#[cfg(test)]
mod tests;
