// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Testing infrastructure for blocking primitives
//!
//! Tests drive the primitives with [`HostScheduler`] and real OS threads.
//! The helpers here let a test wait until the threads it spawned are
//! actually parked before it acts on them.
//!
//! # Usage
//! ```ignore
//! std::thread::scope(|s| {
//!     let reader = s.spawn(|| queue.read(&mut buf));
//!     testing::wait_for_blocked(&sched, 1);
//!     sched.interrupt(|| queue.write_isr(b"x"));
//!     assert_eq!(reader.join().unwrap(), 1);
//! });
//! ```

use std::thread;
use std::time::{Duration, Instant};

use crate::sched::HostScheduler;

/// Upper bound on how long a helper waits before failing the test
pub const BLOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Spin until at least `count` threads are parked in `sched`
///
/// # Panics
///
/// Fails the test if the threads do not block within [`BLOCK_TIMEOUT`].
pub fn wait_for_blocked(sched: &HostScheduler, count: usize) {
    let deadline = Instant::now() + BLOCK_TIMEOUT;

    while sched.blocked_count() < count {
        if Instant::now() > deadline {
            panic!(
                "timed out waiting for {} blocked threads ({} blocked)",
                count,
                sched.blocked_count()
            );
        }
        thread::sleep(Duration::from_millis(1));
    }
}

/// Give other threads a moment to run and prove they stay blocked
pub fn settle() {
    thread::sleep(Duration::from_millis(20));
}
