// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Synchronization Primitives
//!
//! This module provides the primitives drivers and threads share between
//! interrupt and thread context.
//!
//! # Primitives
//!
//! - **CriticalSection**: Interrupt mask guard for short atomic sequences
//! - **WaitQueue**: Priority-ordered list of threads blocked on a condition
//! - **Event**: Bitmask signal with consume-on-wait semantics
//! - **Queue**: Bounded byte ring with an interrupt-safe write path
//!
//! # Design
//!
//! Every blocking path follows the same shape: check the condition, register
//! on a wait queue, check again, then block. A producer that publishes
//! between the two checks either sees the registration and wakes the thread,
//! or the second check sees the data.

pub mod critical;
pub mod wait_queue;
pub mod event;
pub mod queue;

// Re-exports
pub use critical::{critical, CriticalSection};
pub use wait_queue::{WaitQueue, WaitQueueEntry};
pub use event::Event;
pub use queue::Queue;
