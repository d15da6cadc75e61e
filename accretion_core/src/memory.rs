// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU memory attribution for live layers.
//!
//! Every layer registers itself with a [`MemoryTracker`] on construction,
//! reports the byte footprint of its backing image whenever that image is
//! attached or replaced, and deregisters on destruction. The tracker's
//! running total therefore reflects exactly the live layers at any quiescent
//! observation point — the property a global budget/eviction policy queries.
//!
//! The tracker is injected at [`RenderContext`](crate::context::RenderContext)
//! construction, so accounting is observable and independently testable
//! rather than an implicit side effect.

use core::fmt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Identity of one tracked layer instance.
///
/// Minted from a process-wide counter on layer construction; never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackedId(u64);

impl TrackedId {
    /// Mints a fresh id.
    ///
    /// Layers mint their own id on construction; this is public so tracker
    /// implementations and their tests can fabricate instances.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TrackedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrackedId({})", self.0)
    }
}

/// The injected accounting interface layers report into.
///
/// Registration and deregistration can race across threads (a deferred
/// release tears a layer down on the owner thread while another thread
/// constructs layers), so implementations must serialize their own state.
pub trait MemoryTracker: Send + Sync {
    /// Registers a new instance with zero attributed bytes.
    fn register(&self, id: TrackedId);

    /// Replaces the byte count attributed to `id`.
    fn update(&self, id: TrackedId, bytes: u64);

    /// Removes `id`, releasing its attributed bytes from the total.
    fn deregister(&self, id: TrackedId);

    /// Total bytes attributed across all registered instances.
    fn total_bytes(&self) -> u64;

    /// Number of currently registered instances.
    fn live_instances(&self) -> usize;
}

/// Default global tracker: a per-instance byte map with an atomic total.
///
/// The map serializes registration traffic; the total is kept in an atomic
/// so budget queries never take the lock.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<HashMap<TrackedId, u64>>,
    total: AtomicU64,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<TrackedId, u64>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryTracker for MemoryLedger {
    fn register(&self, id: TrackedId) {
        if self.entries().insert(id, 0).is_some() {
            log::warn!("{id:?} registered twice");
        }
    }

    fn update(&self, id: TrackedId, bytes: u64) {
        let mut entries = self.entries();
        let Some(slot) = entries.get_mut(&id) else {
            log::warn!("size update for unregistered {id:?}");
            return;
        };
        let previous = core::mem::replace(slot, bytes);
        // Total is adjusted under the same lock so the map and the atomic
        // agree at every quiescent point.
        if bytes >= previous {
            self.total.fetch_add(bytes - previous, Ordering::AcqRel);
        } else {
            self.total.fetch_sub(previous - bytes, Ordering::AcqRel);
        }
        log::trace!("{id:?} attributed {previous} -> {bytes} bytes");
    }

    fn deregister(&self, id: TrackedId) {
        let mut entries = self.entries();
        let Some(bytes) = entries.remove(&id) else {
            log::warn!("deregister for unknown {id:?}");
            return;
        };
        self.total.fetch_sub(bytes, Ordering::AcqRel);
    }

    fn total_bytes(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    fn live_instances(&self) -> usize {
        self.entries().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_starts_at_zero() {
        let ledger = MemoryLedger::new();
        let id = TrackedId::next();
        ledger.register(id);
        assert_eq!(ledger.total_bytes(), 0);
        assert_eq!(ledger.live_instances(), 1);
    }

    #[test]
    fn update_replaces_attribution() {
        let ledger = MemoryLedger::new();
        let id = TrackedId::next();
        ledger.register(id);

        ledger.update(id, 4096);
        assert_eq!(ledger.total_bytes(), 4096);

        // Shrinking an attribution subtracts the difference.
        ledger.update(id, 1024);
        assert_eq!(ledger.total_bytes(), 1024);

        ledger.update(id, 0);
        assert_eq!(ledger.total_bytes(), 0);
    }

    #[test]
    fn totals_sum_across_instances() {
        let ledger = MemoryLedger::new();
        let a = TrackedId::next();
        let b = TrackedId::next();
        ledger.register(a);
        ledger.register(b);
        ledger.update(a, 100);
        ledger.update(b, 200);
        assert_eq!(ledger.total_bytes(), 300);

        ledger.deregister(a);
        assert_eq!(ledger.total_bytes(), 200);
        assert_eq!(ledger.live_instances(), 1);

        ledger.deregister(b);
        assert_eq!(ledger.total_bytes(), 0);
        assert_eq!(ledger.live_instances(), 0);
    }

    #[test]
    fn update_for_unknown_id_is_ignored() {
        let ledger = MemoryLedger::new();
        ledger.update(TrackedId::next(), 512);
        assert_eq!(ledger.total_bytes(), 0);
    }

    #[test]
    fn deregister_for_unknown_id_is_ignored() {
        let ledger = MemoryLedger::new();
        ledger.deregister(TrackedId::next());
        assert_eq!(ledger.total_bytes(), 0);
    }

    #[test]
    fn ids_are_unique() {
        let a = TrackedId::next();
        let b = TrackedId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }
}
