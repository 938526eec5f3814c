// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Error taxonomy
//!
//! Only recoverable conditions are errors. Backpressure shows up as a short
//! byte count and end-of-stream as a zero-byte result; misuse (blocking from
//! an interrupt handler, overflowing a wait list) panics.

use core::fmt;

/// Result type used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by transports and the timer queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The peer closed the connection
    Closed,

    /// The transport gave up waiting
    Timeout,

    /// The transport does not implement the operation
    Unsupported,

    /// Bad buffer size or argument
    InvalidArgument,

    /// Every pending-timer slot is in use
    TimerQueueFull,

    /// Transport-specific fault code, passed through untouched
    Fault(i32),
}

impl Error {
    /// Negative errno-style code for C-facing drivers
    pub const fn code(self) -> i32 {
        match self {
            Self::Closed => -104,
            Self::Timeout => -110,
            Self::Unsupported => -95,
            Self::InvalidArgument => -22,
            Self::TimerQueueFull => -12,
            Self::Fault(code) => code,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("connection closed"),
            Self::Timeout => f.write_str("operation timed out"),
            Self::Unsupported => f.write_str("operation not supported"),
            Self::InvalidArgument => f.write_str("invalid argument"),
            Self::TimerQueueFull => f.write_str("timer queue full"),
            Self::Fault(code) => write!(f, "transport fault {}", code),
        }
    }
}
