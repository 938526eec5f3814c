// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Time
//!
//! The kernel tick interrupt calls [`TimerQueue::tick`] at a fixed rate
//! (see [`DEFAULT_TICK_FREQUENCY_HZ`](crate::config::DEFAULT_TICK_FREQUENCY_HZ)).
//! Everything time-based in the primitives is expressed in those ticks.

pub mod tick;
pub mod timer;

// Re-exports
pub use tick::{Tick, Ticks};
pub use timer::{Timer, TimerCallback, TimerFlags, TimerId, TimerQueue};
