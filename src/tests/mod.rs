// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Integration Tests
//!
//! This module contains integration tests for the primitives.
//! These tests wire timers, queues, events and channels together the way
//! drivers and protocol code do, with interrupts simulated by
//! [`HostScheduler::interrupt`](crate::sched::HostScheduler::interrupt).

mod deadline_tests;
