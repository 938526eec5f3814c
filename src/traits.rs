// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel collaborator traits
//!
//! The synchronization primitives do not own a run queue. Every kernel that
//! hosts them implements [`Scheduler`], which is the whole contract between
//! the primitives and thread management:
//! - suspend/resume hooks (`block`, `wake`)
//! - the interrupt-context flag (`in_isr`)
//! - local interrupt masking for short critical sections

use crate::sched::{ThreadId, ThreadPriority};

/// Trait for scheduler operations needed by the primitives
///
/// Implementations exist per target:
/// - bare-metal: the kernel's cooperative scheduler plus the CPU interrupt mask
/// - hosted: [`HostScheduler`](crate::sched::HostScheduler), one OS thread per kernel thread
pub trait Scheduler: Sync {
    /// Identifier of the calling thread
    ///
    /// Only meaningful in thread context.
    fn current(&self) -> ThreadId;

    /// Priority of the calling thread, used to order wait lists
    fn current_priority(&self) -> ThreadPriority {
        ThreadPriority::Normal
    }

    /// Suspend the calling thread until [`wake`](Self::wake) targets it
    ///
    /// A wake delivered before the thread blocks is not lost: the next
    /// `block` returns immediately. `block` may also return spuriously, so
    /// callers always re-check their wait condition.
    fn block(&self);

    /// Make `thread` runnable
    ///
    /// Never blocks; safe from interrupt context.
    fn wake(&self, thread: ThreadId);

    /// Let a freshly woken thread of higher priority run
    ///
    /// Called by thread-context writers after waking someone. Interrupt
    /// handlers never call it; the switch happens on interrupt return.
    fn yield_now(&self) {}

    /// Whether the caller is executing an interrupt handler
    fn in_isr(&self) -> bool;

    /// Mask interrupts on the local CPU
    ///
    /// # Returns
    /// * `true` if interrupts were enabled before the call
    fn disable_interrupts(&self) -> bool;

    /// Restore the interrupt mask saved by [`disable_interrupts`](Self::disable_interrupts)
    fn restore_interrupts(&self, was_enabled: bool);
}
