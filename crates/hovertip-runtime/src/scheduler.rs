#![forbid(unsafe_code)]

//! Next-tick deferral queue.
//!
//! Touch taps and view mounts both need work to happen "on the next tick":
//! after the current event has finished propagating. [`DeferredQueue`] holds
//! that work as plain data. The host drives it by calling
//! [`DeferredQueue::take_tick`] once per tick (from `setTimeout(0)` in a
//! browser, or explicitly in a headless session).
//!
//! # Ordering
//!
//! Tasks run in FIFO order. A tick only takes the tasks that were queued
//! before it started; anything deferred while the batch runs waits for the
//! following tick.
//!
//! # Cancellation
//!
//! Every task carries a [`CancellationToken`]. The token is checked when the
//! batch yields the task, not when the batch is taken, so a task earlier in
//! the same tick can still cancel a later one.

use std::collections::VecDeque;
use std::fmt;

use web_time::Instant;

use crate::cancellation::CancellationToken;

/// Identity of a deferred task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

#[derive(Debug)]
struct Deferred<T> {
    id: TaskId,
    task: T,
    token: CancellationToken,
    queued_at: Instant,
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerStats {
    /// Tasks ever deferred.
    pub deferred: u64,
    /// Ticks taken.
    pub ticks: u64,
    /// Tasks dropped by [`DeferredQueue::clear`].
    pub cleared: u64,
}

/// FIFO queue of next-tick tasks.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    queue: VecDeque<Deferred<T>>,
    next_id: u64,
    stats: SchedulerStats,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> DeferredQueue<T> {
    /// Queue `task` for the next tick.
    pub fn defer(&mut self, task: T, token: CancellationToken) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.stats.deferred += 1;
        tracing::trace!(
            target: "hovertip.scheduler",
            task_id = id.get(),
            ?task,
            pending = self.queue.len() + 1,
            "task deferred"
        );
        self.queue.push_back(Deferred {
            id,
            task,
            token,
            queued_at: Instant::now(),
        });
        id
    }
}

impl<T> DeferredQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            next_id: 1,
            stats: SchedulerStats::default(),
        }
    }

    /// Number of queued tasks, cancelled ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of queued tasks whose token is still live.
    #[must_use]
    pub fn live_len(&self) -> usize {
        self.queue.iter().filter(|d| !d.token.is_cancelled()).count()
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Take everything queued so far as one tick's batch.
    pub fn take_tick(&mut self) -> TickBatch<T> {
        self.stats.ticks += 1;
        let tasks = std::mem::take(&mut self.queue);
        tracing::trace!(
            target: "hovertip.scheduler",
            tick = self.stats.ticks,
            tasks = tasks.len(),
            "tick started"
        );
        TickBatch {
            tasks,
            ran: 0,
            skipped: 0,
        }
    }

    /// Drop every queued task. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        self.stats.cleared += dropped as u64;
        if dropped > 0 {
            tracing::debug!(target: "hovertip.scheduler", dropped, "deferred queue cleared");
        }
        dropped
    }
}

/// One tick's worth of tasks.
///
/// Iterating yields the tasks whose token is live at the moment they come
/// up; cancelled tasks are counted and skipped.
#[derive(Debug)]
pub struct TickBatch<T> {
    tasks: VecDeque<Deferred<T>>,
    ran: usize,
    skipped: usize,
}

impl<T> TickBatch<T> {
    /// Tasks yielded so far.
    #[must_use]
    pub const fn ran(&self) -> usize {
        self.ran
    }

    /// Cancelled tasks skipped so far.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Tasks not yet examined.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tasks.len()
    }
}

impl<T> Iterator for TickBatch<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while let Some(deferred) = self.tasks.pop_front() {
            if deferred.token.is_cancelled() {
                self.skipped += 1;
                tracing::debug!(
                    target: "hovertip.scheduler",
                    task_id = deferred.id.get(),
                    "cancelled task skipped"
                );
                continue;
            }
            self.ran += 1;
            tracing::trace!(
                target: "hovertip.scheduler",
                task_id = deferred.id.get(),
                latency_us = deferred.queued_at.elapsed().as_micros() as u64,
                "task running"
            );
            return Some(deferred.task);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationSource;
    use tracing_test::traced_test;

    fn live() -> CancellationToken {
        CancellationSource::new().token()
    }

    #[test]
    fn tasks_run_in_fifo_order() {
        let mut q = DeferredQueue::new();
        q.defer("a", live());
        q.defer("b", live());
        q.defer("c", live());
        let ran: Vec<_> = q.take_tick().collect();
        assert_eq!(ran, vec!["a", "b", "c"]);
        assert!(q.is_empty());
    }

    #[test]
    fn cancelled_tasks_are_skipped() {
        let mut q = DeferredQueue::new();
        let source = CancellationSource::new();
        q.defer(1, live());
        q.defer(2, source.token());
        q.defer(3, live());
        assert_eq!(q.live_len(), 3);
        source.cancel();
        assert_eq!(q.live_len(), 2);

        let mut batch = q.take_tick();
        let ran: Vec<_> = batch.by_ref().collect();
        assert_eq!(ran, vec![1, 3]);
        assert_eq!(batch.ran(), 2);
        assert_eq!(batch.skipped(), 1);
    }

    #[test]
    fn token_is_checked_when_task_comes_up() {
        let mut q = DeferredQueue::new();
        let second = CancellationSource::new();
        q.defer(1, live());
        q.defer(2, second.token());

        let mut batch = q.take_tick();
        assert_eq!(batch.next(), Some(1));
        second.cancel();
        assert_eq!(batch.next(), None);
        assert_eq!(batch.skipped(), 1);
    }

    #[test]
    fn tasks_deferred_during_a_tick_wait_for_the_next() {
        let mut q = DeferredQueue::new();
        q.defer(1, live());
        let mut batch = q.take_tick();
        assert_eq!(batch.next(), Some(1));
        q.defer(2, live());
        assert_eq!(batch.next(), None);
        assert_eq!(q.len(), 1);
        assert_eq!(q.take_tick().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn clear_drops_everything() {
        let mut q = DeferredQueue::new();
        q.defer((), live());
        q.defer((), live());
        assert_eq!(q.clear(), 2);
        assert!(q.is_empty());
        assert_eq!(q.stats().cleared, 2);
        assert_eq!(q.take_tick().count(), 0);
    }

    #[test]
    fn stats_count_deferrals_and_ticks() {
        let mut q = DeferredQueue::new();
        let a = q.defer('a', live());
        let b = q.defer('b', live());
        assert!(a < b);
        q.take_tick().for_each(drop);
        q.take_tick().for_each(drop);
        let stats = q.stats();
        assert_eq!(stats.deferred, 2);
        assert_eq!(stats.ticks, 2);
    }

    #[test]
    #[traced_test]
    fn skipped_tasks_are_logged() {
        let mut q = DeferredQueue::new();
        let source = CancellationSource::new();
        q.defer("stale", source.token());
        source.cancel();
        assert_eq!(q.take_tick().count(), 0);
        assert!(logs_contain("cancelled task skipped"));
    }
}
