// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-context identity and the deferred-task queue.
//!
//! GPU-resource-owning state may only be mutated or destroyed on the thread
//! that owns the GPU context. [`RenderContext`] pins that identity: it is
//! created on the owning thread and is the sole consumer of the deferred-task
//! queue. [`ContextHandle`] is the cheap, clonable, `Send + Sync` sender side
//! that layers carry so any thread can redirect resource-destroying work back
//! to the owner.
//!
//! Tasks run in enqueue order when the owner calls
//! [`run_tasks`](RenderContext::run_tasks). Dropping the context drains the
//! queue *without executing* the pending tasks: each boxed task is simply
//! dropped, releasing whatever references it owns, so nothing leaks even
//! though no task body runs.

use core::fmt;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, ThreadId};

use crate::memory::{MemoryLedger, MemoryTracker};

/// A zero-argument deferred action executed (or discarded) by the owner.
type Task = Box<dyn FnOnce() + Send>;

/// Owner-thread side of a render context.
///
/// Holds the receiving end of the task queue, the owning thread's identity,
/// and the injected [`MemoryTracker`] that layers report attribution into.
pub struct RenderContext {
    thread: ThreadId,
    sender: Sender<Task>,
    tasks: Receiver<Task>,
    tracker: Arc<dyn MemoryTracker>,
}

impl RenderContext {
    /// Creates a context owned by the calling thread, with a fresh
    /// [`MemoryLedger`] as its tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tracker(Arc::new(MemoryLedger::new()))
    }

    /// Creates a context owned by the calling thread, reporting into the
    /// given tracker.
    #[must_use]
    pub fn with_tracker(tracker: Arc<dyn MemoryTracker>) -> Self {
        let (sender, tasks) = channel();
        let thread = thread::current().id();
        log::debug!("render context created on {thread:?}");
        Self {
            thread,
            sender,
            tasks,
            tracker,
        }
    }

    /// Returns a handle for posting work to this context from any thread.
    #[must_use]
    pub fn handle(&self) -> ContextHandle {
        ContextHandle {
            thread: self.thread,
            sender: self.sender.clone(),
            tracker: Arc::clone(&self.tracker),
        }
    }

    /// The thread that owns this context.
    #[inline]
    #[must_use]
    pub fn owner_thread(&self) -> ThreadId {
        self.thread
    }

    /// The tracker layers registered to this context report into.
    #[must_use]
    pub fn tracker(&self) -> &Arc<dyn MemoryTracker> {
        &self.tracker
    }

    /// Executes all currently queued tasks in enqueue order.
    ///
    /// Returns the number of tasks run. Intended to be called from the frame
    /// loop on the owning thread; calling it elsewhere would defeat the
    /// redirect guarantee, so it is checked.
    ///
    /// # Panics
    ///
    /// Panics if called from a thread other than the owner.
    pub fn run_tasks(&self) -> usize {
        assert_eq!(
            thread::current().id(),
            self.thread,
            "run_tasks called off the owning thread"
        );
        let mut ran = 0;
        while let Ok(task) = self.tasks.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        // Drain without executing: dropping a task releases the references
        // it owns, which is all the accounting a discarded release needs.
        let mut discarded = 0_usize;
        while let Ok(task) = self.tasks.try_recv() {
            drop(task);
            discarded += 1;
        }
        if discarded > 0 {
            log::debug!("render context torn down with {discarded} pending tasks discarded");
        }
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("thread", &self.thread)
            .finish_non_exhaustive()
    }
}

/// A `Send + Sync` handle to a [`RenderContext`].
///
/// Cloning is cheap (one channel sender and one `Arc` bump). The handle is
/// non-owning: it does not keep the context alive, and posting to a
/// torn-down context is a benign no-op (the task is dropped, releasing what
/// it owns).
#[derive(Clone)]
pub struct ContextHandle {
    thread: ThreadId,
    sender: Sender<Task>,
    tracker: Arc<dyn MemoryTracker>,
}

impl ContextHandle {
    /// Returns whether the calling thread is the context's owning thread.
    #[inline]
    #[must_use]
    pub fn is_owner(&self) -> bool {
        thread::current().id() == self.thread
    }

    /// The thread that owns the context behind this handle.
    #[inline]
    #[must_use]
    pub fn owner_thread(&self) -> ThreadId {
        self.thread
    }

    /// The tracker of the context behind this handle.
    ///
    /// Kept alive by the handle itself, so attribution survives context
    /// teardown races.
    #[must_use]
    pub fn tracker(&self) -> &Arc<dyn MemoryTracker> {
        &self.tracker
    }

    /// Posts a task to the owning thread, fire-and-forget.
    ///
    /// If the context has already been torn down the task is dropped here on
    /// the calling thread; whatever references it owns are released at that
    /// point instead.
    pub fn post<F: FnOnce() + Send + 'static>(&self, task: F) {
        if self.sender.send(Box::new(task)).is_err() {
            log::warn!("render context torn down; deferred task dropped on calling thread");
        }
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("thread", &self.thread)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn tasks_run_in_enqueue_order() {
        let context = RenderContext::new();
        let handle = context.handle();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..4 {
            let log = Arc::clone(&log);
            handle.post(move || log.lock().unwrap().push(i));
        }
        assert_eq!(context.run_tasks(), 4);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn run_tasks_on_empty_queue_is_zero() {
        let context = RenderContext::new();
        assert_eq!(context.run_tasks(), 0);
    }

    #[test]
    fn cross_thread_post_reaches_owner() {
        let context = RenderContext::new();
        let handle = context.handle();
        let ran = Arc::new(AtomicUsize::new(0));

        let worker = {
            let ran = Arc::clone(&ran);
            thread::spawn(move || {
                assert!(!handle.is_owner());
                handle.post(move || {
                    ran.fetch_add(1, Ordering::SeqCst);
                });
            })
        };
        worker.join().unwrap();

        assert_eq!(ran.load(Ordering::SeqCst), 0, "task must not run on post");
        assert_eq!(context.run_tasks(), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn post_after_teardown_drops_task() {
        let context = RenderContext::new();
        let handle = context.handle();
        drop(context);

        let dropped = Arc::new(AtomicUsize::new(0));
        struct DropFlag(Arc<AtomicUsize>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let flag = DropFlag(Arc::clone(&dropped));
        handle.post(move || drop(flag));
        assert_eq!(
            dropped.load(Ordering::SeqCst),
            1,
            "what the task owns must be released"
        );
    }

    #[test]
    fn teardown_discards_pending_tasks() {
        let context = RenderContext::new();
        let handle = context.handle();
        let dropped = Arc::new(AtomicUsize::new(0));

        struct DropFlag(Arc<AtomicUsize>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        for _ in 0..3 {
            let flag = DropFlag(Arc::clone(&dropped));
            handle.post(move || drop(flag));
        }
        drop(context);
        assert_eq!(dropped.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn owner_identity() {
        let context = RenderContext::new();
        let handle = context.handle();
        assert!(handle.is_owner());
        assert_eq!(handle.owner_thread(), context.owner_thread());
    }
}
