// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Thread identity and scheduler backends
//!
//! The run-queue algorithm belongs to the kernel. This module only defines
//! what the primitives need to name a thread, plus a hosted backend used by
//! tests and simulators.
//!
//! # Example
//! ```ignore
//! use ferrite::sched::HostScheduler;
//! use ferrite::Queue;
//!
//! let sched = HostScheduler::new();
//! let queue = Queue::new(&sched, 64);
//! sched.interrupt(|| queue.write_isr(b"rx"));
//! ```

pub mod thread;

#[cfg(any(test, feature = "host"))]
pub mod host;

pub use thread::{ThreadId, ThreadPriority, new_thread_id};

#[cfg(any(test, feature = "host"))]
pub use host::HostScheduler;
