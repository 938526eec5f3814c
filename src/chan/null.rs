// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Null transport
//!
//! Swallows everything written to it and is always at end-of-stream.
//! Useful as the default sink for a console that has not been wired up yet.

use crate::chan::Transport;
use crate::error::Result;

/// Transport that discards writes and reads nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn read(&self, _buf: &mut [u8]) -> Result<usize> {
        Ok(0)
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        Ok(buf.len())
    }

    fn size(&self) -> usize {
        0
    }
}
