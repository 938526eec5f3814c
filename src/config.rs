// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Compile-time configuration
//!
//! Limits are fixed at build time so no primitive allocates after
//! construction.

/// Default kernel tick rate
pub const DEFAULT_TICK_FREQUENCY_HZ: u32 = 100;

/// Maximum number of threads blocked on one wait queue
pub const MAX_WAITERS: usize = 16;

/// Maximum number of armed timers per timer queue
pub const MAX_PENDING_TIMERS: usize = 32;

/// Size of each queue in the stub transport
pub const STUB_QUEUE_SIZE: usize = 256;
