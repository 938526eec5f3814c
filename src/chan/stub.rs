// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Socket stub
//!
//! In-memory stand-in for an accepted TCP connection. Built for tests and
//! hosted simulators only (`host` feature). Server code under test
//! talks to the stub through [`Transport`]; the test drives the other side:
//! it injects request bytes, collects response bytes, and simulates connect
//! and disconnect.
//!
//! ```text
//!   test ── input() ──▶ [input queue] ──▶ read()  ── server
//!   test ◀─ output() ── [output queue] ◀── write() ── server
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let stub = StubTransport::new(&sched);
//!
//! // server thread
//! stub.wait_accept();
//! let chan = Channel::new(&stub);
//! ...
//! stub.close();
//!
//! // test thread
//! stub.accept();
//! stub.input(b"GET / HTTP/1.1\r\n\r\n");
//! let n = stub.output(&mut response);
//! stub.wait_closed();
//! ```

use crate::chan::Transport;
use crate::config::STUB_QUEUE_SIZE;
use crate::error::Result;
use crate::sync::{Event, Queue};
use crate::traits::Scheduler;

/// Bit used on the accept and closed events
const CONNECTION_MASK: u32 = 0x1;

/// In-memory socket test double
#[derive(Debug)]
pub struct StubTransport<'k> {
    /// Bytes flowing towards the code under test
    input: Queue<'k>,

    /// Bytes emitted by the code under test
    output: Queue<'k>,

    /// Raised when a peer connects
    accepted: Event<'k>,

    /// Raised when the code under test closes the connection
    closed: Event<'k>,
}

impl<'k> StubTransport<'k> {
    /// Create a stub with empty queues and no pending connection
    pub fn new(sched: &'k dyn Scheduler) -> Self {
        Self {
            input: Queue::new(sched, STUB_QUEUE_SIZE),
            output: Queue::new(sched, STUB_QUEUE_SIZE),
            accepted: Event::new(sched),
            closed: Event::new(sched),
        }
    }

    /// Inject bytes for the code under test to read
    ///
    /// Blocks while the input queue is full.
    pub fn input(&self, buf: &[u8]) -> usize {
        self.input.write(buf)
    }

    /// Collect bytes the code under test wrote
    ///
    /// Blocks until at least one byte is available; may return fewer than
    /// `buf.len()`.
    pub fn output(&self, buf: &mut [u8]) -> usize {
        self.output.read(buf)
    }

    /// Drop every injected byte not read yet
    pub fn input_flush(&self) {
        while self.input.size() > 0 {
            self.input.ignore(self.input.size());
        }
    }

    /// Simulate the peer hanging up
    ///
    /// A read blocked on the input side returns end-of-stream. Later reads
    /// block again.
    pub fn close_connection(&self) {
        self.input.stop();
        self.input.start();
    }

    /// Simulate a peer connecting
    pub fn accept(&self) {
        self.accepted.write(CONNECTION_MASK);
    }

    /// Block until a peer connects (server side of `accept`)
    pub fn wait_accept(&self) {
        self.accepted.wait(CONNECTION_MASK);
    }

    /// Close the connection (server side)
    pub fn close(&self) {
        self.closed.write(CONNECTION_MASK);
    }

    /// Block until the code under test closes the connection
    pub fn wait_closed(&self) {
        self.closed.wait(CONNECTION_MASK);
    }
}

impl Transport for StubTransport<'_> {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.input.read(buf))
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        Ok(self.output.write(buf))
    }

    /// A socket keeps no local buffer
    fn size(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chan::Channel;
    use crate::sched::HostScheduler;
    use crate::testing::wait_for_blocked;
    use std::thread;

    #[test]
    fn test_stub_round_trip() {
        let sched = HostScheduler::new();
        let stub = StubTransport::new(&sched);
        let chan = Channel::new(&stub);

        assert_eq!(stub.input(b"ping"), 4);
        let mut buf = [0u8; 8];
        assert_eq!(chan.read(&mut buf), Ok(4));
        assert_eq!(&buf[..4], b"ping");

        assert_eq!(chan.write(b"pong"), Ok(4));
        assert_eq!(chan.size(), 0);
        assert_eq!(stub.output(&mut buf), 4);
        assert_eq!(&buf[..4], b"pong");
    }

    #[test]
    fn test_input_flush() {
        let sched = HostScheduler::new();
        let stub = StubTransport::new(&sched);

        stub.input(b"stale request");
        stub.input_flush();
        stub.input(b"x");

        let mut buf = [0u8; 16];
        assert_eq!(Transport::read(&stub, &mut buf), Ok(1));
        assert_eq!(buf[0], b'x');
    }

    #[test]
    fn test_close_connection_unblocks_reader() {
        let sched = HostScheduler::new();
        let stub = StubTransport::new(&sched);

        thread::scope(|s| {
            let server = s.spawn(|| Transport::read(&stub, &mut [0u8; 16]));

            wait_for_blocked(&sched, 1);
            stub.close_connection();

            assert_eq!(server.join().unwrap(), Ok(0));
        });

        // The stub is reusable for the next connection
        stub.input(b"next");
        assert_eq!(Transport::read(&stub, &mut [0u8; 16]), Ok(4));
    }

    #[test]
    fn test_accept_and_close_events() {
        let sched = HostScheduler::new();
        let stub = StubTransport::new(&sched);

        thread::scope(|s| {
            s.spawn(|| {
                stub.wait_accept();
                stub.close();
            });

            stub.accept();
            stub.wait_closed();
        });
    }
}
