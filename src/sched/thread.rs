// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Thread identity
//!
//! Defines the thread id and priority levels shared between the primitives
//! and the scheduler.

use core::sync::atomic::{AtomicU64, Ordering};

/// Thread ID type
pub type ThreadId = u64;

/// Thread priority levels
///
/// Wait queues release higher priorities first.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ThreadPriority {
    /// Idle priority (lowest)
    Idle = 0,
    /// Low priority
    Low = 1,
    /// Normal priority (default)
    #[default]
    Normal = 2,
    /// High priority
    High = 3,
    /// Real-time priority (highest)
    Realtime = 4,
}

impl ThreadPriority {
    /// Create from raw value, saturating at `Realtime`
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Low,
            2 => Self::Normal,
            3 => Self::High,
            _ => Self::Realtime,
        }
    }

    /// Get raw value
    pub const fn into_raw(self) -> u8 {
        self as u8
    }
}

/// Create a new thread ID
///
/// Ids start at 1 and are never reused.
pub fn new_thread_id() -> ThreadId {
    static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

    NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(ThreadPriority::Realtime > ThreadPriority::High);
        assert!(ThreadPriority::Idle < ThreadPriority::Low);
        assert_eq!(ThreadPriority::default(), ThreadPriority::Normal);
    }

    #[test]
    fn test_priority_raw() {
        assert_eq!(ThreadPriority::from_raw(3), ThreadPriority::High);
        assert_eq!(ThreadPriority::from_raw(200), ThreadPriority::Realtime);
        assert_eq!(ThreadPriority::Low.into_raw(), 1);
    }

    #[test]
    fn test_thread_ids_unique() {
        let a = new_thread_id();
        let b = new_thread_id();
        assert_ne!(a, b);
        assert!(a >= 1);
    }
}
