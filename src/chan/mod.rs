// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Byte-Stream Channels
//!
//! A channel gives protocol code one read/write/size interface over any byte
//! transport: a [`Queue`](crate::Queue) used as a loopback pipe, a serial
//! line, a network socket, or a test double.
//!
//! # Design
//!
//! - **Bound once**: A [`Channel`] wraps exactly one transport, chosen at
//!   construction and never reassigned
//! - **No translation**: Results and errors come back from the transport
//!   untouched
//! - **End-of-stream**: `Ok(0)` from `read` means the stream is over, never
//!   "no data yet"
//!
//! # Usage
//!
//! ```ignore
//! let rx = Queue::new(sched, 128);
//! let chan = Channel::new(&rx);
//!
//! let mut line = [0u8; 82];
//! let n = chan.read(&mut line)?;
//! ```

pub mod null;

#[cfg(any(test, feature = "host"))]
pub mod stub;

use alloc::boxed::Box;
use core::fmt;

use crate::error::{Error, Result};

pub use null::NullTransport;

#[cfg(any(test, feature = "host"))]
pub use stub::StubTransport;

/// Concrete byte transport behind a [`Channel`]
pub trait Transport: Sync {
    /// Read up to `buf.len()` bytes
    ///
    /// Blocking behavior is up to the transport. `Ok(0)` for a non-empty
    /// buffer means end-of-stream.
    fn read(&self, buf: &mut [u8]) -> Result<usize>;

    /// Write up to `buf.len()` bytes, returning how many were accepted
    fn write(&self, buf: &[u8]) -> Result<usize>;

    /// Bytes buffered locally and not yet read, 0 when the transport has no
    /// local buffer
    fn size(&self) -> usize;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn size(&self) -> usize {
        (**self).size()
    }
}

/// Channel
///
/// Type-erased handle over one transport.
pub struct Channel<'a> {
    transport: Box<dyn Transport + 'a>,
}

impl<'a> Channel<'a> {
    /// Bind a channel to `transport`
    pub fn new(transport: impl Transport + 'a) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Read up to `buf.len()` bytes from the transport
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.transport.read(buf)
    }

    /// Write up to `buf.len()` bytes to the transport
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        self.transport.write(buf)
    }

    /// Bytes buffered by the transport
    pub fn size(&self) -> usize {
        self.transport.size()
    }

    /// Read until `buf` is full or the stream ends
    ///
    /// Returns the number of bytes read; less than `buf.len()` only at
    /// end-of-stream.
    pub fn read_exact(&self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.transport.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled)
    }

    /// Write all of `buf`
    ///
    /// Fails with [`Error::Closed`] if the transport stops accepting bytes.
    pub fn write_all(&self, buf: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < buf.len() {
            match self.transport.write(&buf[written..])? {
                0 => return Err(Error::Closed),
                n => written += n,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Channel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::HostScheduler;
    use crate::sync::Queue;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Transport that fails every call with a fixed error
    struct Faulty(Error);

    impl Transport for Faulty {
        fn read(&self, _buf: &mut [u8]) -> Result<usize> {
            Err(self.0)
        }

        fn write(&self, _buf: &[u8]) -> Result<usize> {
            Err(self.0)
        }

        fn size(&self) -> usize {
            0
        }
    }

    /// Transport that accepts at most `chunk` bytes per write
    struct Trickle {
        chunk: usize,
        accepted: AtomicUsize,
        limit: usize,
    }

    impl Transport for Trickle {
        fn read(&self, _buf: &mut [u8]) -> Result<usize> {
            Ok(0)
        }

        fn write(&self, buf: &[u8]) -> Result<usize> {
            let so_far = self.accepted.load(Ordering::SeqCst);
            let n = buf.len().min(self.chunk).min(self.limit - so_far);
            self.accepted.fetch_add(n, Ordering::SeqCst);
            Ok(n)
        }

        fn size(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_channel_over_queue() {
        let sched = HostScheduler::new();
        let queue = Queue::new(&sched, 16);
        let chan = Channel::new(&queue);

        assert_eq!(chan.write(b"$GPGGA"), Ok(6));
        assert_eq!(chan.size(), 6);

        let mut buf = [0u8; 16];
        assert_eq!(chan.read(&mut buf), Ok(6));
        assert_eq!(&buf[..6], b"$GPGGA");
        assert_eq!(chan.size(), 0);
    }

    #[test]
    fn test_errors_pass_through() {
        let chan = Channel::new(Faulty(Error::Fault(-5)));
        assert_eq!(chan.read(&mut [0u8; 4]), Err(Error::Fault(-5)));
        assert_eq!(chan.write(b"x"), Err(Error::Fault(-5)));

        let chan = Channel::new(Faulty(Error::Timeout));
        assert_eq!(chan.read_exact(&mut [0u8; 4]), Err(Error::Timeout));
        assert_eq!(chan.write_all(b"x"), Err(Error::Timeout));
    }

    #[test]
    fn test_read_exact_collects_short_reads() {
        let sched = HostScheduler::new();
        let queue = Queue::new(&sched, 4);
        let chan = Channel::new(&queue);

        thread::scope(|s| {
            s.spawn(|| {
                for chunk in [&b"ab"[..], &b"cd"[..], &b"ef"[..]] {
                    queue.write(chunk);
                }
            });

            let mut buf = [0u8; 6];
            assert_eq!(chan.read_exact(&mut buf), Ok(6));
            assert_eq!(&buf, b"abcdef");
        });
    }

    #[test]
    fn test_read_exact_stops_at_end_of_stream() {
        let sched = HostScheduler::new();
        let queue = Queue::new(&sched, 8);
        let chan = Channel::new(&queue);

        queue.write(b"abc");
        queue.stop();

        let mut buf = [0u8; 6];
        assert_eq!(chan.read_exact(&mut buf), Ok(3));
        assert_eq!(&buf[..3], b"abc");
    }

    #[test]
    fn test_write_all_loops_over_partial_writes() {
        let trickle = Trickle {
            chunk: 3,
            accepted: AtomicUsize::new(0),
            limit: usize::MAX,
        };
        let chan = Channel::new(&trickle);

        assert_eq!(chan.write_all(b"0123456789"), Ok(()));
        assert_eq!(trickle.accepted.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_write_all_reports_closed() {
        let trickle = Trickle {
            chunk: 3,
            accepted: AtomicUsize::new(0),
            limit: 4,
        };
        let chan = Channel::new(&trickle);

        assert_eq!(chan.write_all(b"0123456789"), Err(Error::Closed));
        assert_eq!(trickle.accepted.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_channel_over_event() {
        let sched = HostScheduler::new();
        let event = crate::sync::Event::new(&sched);
        let chan = Channel::new(&event);

        assert_eq!(chan.write(&0b100u32.to_ne_bytes()), Ok(4));
        assert_eq!(chan.size(), 1);

        let mut mask = 0b110u32.to_ne_bytes();
        assert_eq!(chan.read(&mut mask), Ok(4));
        assert_eq!(u32::from_ne_bytes(mask), 0b100);
    }
}
