// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable tracker doubles and release stress drivers for accretion tests.
//!
//! [`RecordingTracker`] wraps a [`MemoryLedger`] and records every tracker
//! call together with the thread it arrived on, so tests can assert *where*
//! teardown ran, not just that totals balance. [`spawn_releasers`] is the
//! driver for cross-thread release stress: it burns through a batch of layer
//! references from freshly spawned threads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use accretion_core::layer::Layer;
use accretion_core::memory::{MemoryLedger, MemoryTracker, TrackedId};

/// Which tracker entry point a recorded event hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerCall {
    /// `register` — a layer came to life.
    Register,
    /// `update` — attributed bytes replaced with the carried value.
    Update(u64),
    /// `deregister` — a layer was torn down.
    Deregister,
}

/// One recorded tracker call.
#[derive(Clone, Copy, Debug)]
pub struct TrackerEvent {
    /// Instance the call was about.
    pub id: TrackedId,
    /// Entry point and payload.
    pub call: TrackerCall,
    /// Thread the call arrived on.
    pub thread: ThreadId,
}

/// A [`MemoryTracker`] double that records every call with its calling
/// thread, delegating the actual accounting to a [`MemoryLedger`].
#[derive(Debug, Default)]
pub struct RecordingTracker {
    ledger: MemoryLedger,
    events: Mutex<Vec<TrackerEvent>>,
}

impl RecordingTracker {
    /// Creates an empty recording tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, id: TrackedId, call: TrackerCall) {
        self.events().push(TrackerEvent {
            id,
            call,
            thread: thread::current().id(),
        });
    }

    fn events(&self) -> MutexGuard<'_, Vec<TrackerEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of every recorded event, in arrival order.
    #[must_use]
    pub fn recorded(&self) -> Vec<TrackerEvent> {
        self.events().clone()
    }

    /// Snapshot of the deregistration events only.
    #[must_use]
    pub fn deregistrations(&self) -> Vec<TrackerEvent> {
        self.events()
            .iter()
            .filter(|event| event.call == TrackerCall::Deregister)
            .copied()
            .collect()
    }
}

impl MemoryTracker for RecordingTracker {
    fn register(&self, id: TrackedId) {
        self.record(id, TrackerCall::Register);
        self.ledger.register(id);
    }

    fn update(&self, id: TrackedId, bytes: u64) {
        self.record(id, TrackerCall::Update(bytes));
        self.ledger.update(id, bytes);
    }

    fn deregister(&self, id: TrackedId) {
        self.record(id, TrackerCall::Deregister);
        self.ledger.deregister(id);
    }

    fn total_bytes(&self) -> u64 {
        self.ledger.total_bytes()
    }

    fn live_instances(&self) -> usize {
        self.ledger.live_instances()
    }
}

/// Spawns `count` threads that each release one of the given layer
/// references via [`Layer::post_dec_strong`], and joins them all.
///
/// Callers typically clone the references up front, so the layer's strong
/// count drops by `count` once the owning context drains its queue.
///
/// # Panics
///
/// Panics if a releaser thread panics.
pub fn spawn_releasers(references: Vec<Arc<Layer>>) {
    let releasers: Vec<_> = references
        .into_iter()
        .map(|reference| thread::spawn(move || Layer::post_dec_strong(reference)))
        .collect();
    for releaser in releasers {
        releaser.join().expect("releaser thread panicked");
    }
}
