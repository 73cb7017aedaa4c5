//! FIFO work queue with a 2-second bounded wait on dequeue and
//! `Queue.join()`-equivalent completion tracking.
//!
//! A worker that dequeues an item holds one "pending" credit until it calls
//! [`WorkQueue::task_done`]; [`WorkQueue::wait_until_drained`] blocks until
//! the queue is empty *and* every dequeued item has been marked done, which
//! is exactly the run-to-completion condition in spec §4.6.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::state::WorkItem;

struct Inner {
    queue: VecDeque<WorkItem>,
    pending: usize,
}

pub struct WorkQueue {
    inner: Mutex<Inner>,
    not_empty: Condvar,
    drained: Condvar,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                pending: 0,
            }),
            not_empty: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    /// Push a work item, incrementing the pending count. Wakes one waiter.
    pub fn push(&self, item: WorkItem) {
        let mut inner = self.inner.lock().expect("work queue mutex poisoned");
        inner.queue.push_back(item);
        inner.pending += 1;
        self.not_empty.notify_one();
    }

    /// Wait up to `timeout` for an item. Returns `None` on timeout, which is
    /// the worker's exit signal (spec §4.5 step 1).
    pub fn pop_timeout(&self, timeout: Duration) -> Option<WorkItem> {
        let mut inner = self.inner.lock().expect("work queue mutex poisoned");
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(item) = inner.queue.pop_front() {
                return Some(item);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, result) = self
                .not_empty
                .wait_timeout(inner, deadline - now)
                .expect("work queue mutex poisoned");
            inner = guard;
            if result.timed_out() && inner.queue.is_empty() {
                return None;
            }
        }
    }

    /// Mark one previously-dequeued item as fully processed. Must be called
    /// exactly once per successful `pop_timeout` on every exit path,
    /// including early returns after errors (spec §4.5).
    pub fn task_done(&self) {
        let mut inner = self.inner.lock().expect("work queue mutex poisoned");
        inner.pending = inner.pending.saturating_sub(1);
        if inner.pending == 0 && inner.queue.is_empty() {
            self.drained.notify_all();
        }
    }

    /// Block until the queue is empty and every dequeued item has been
    /// marked done.
    pub fn wait_until_drained(&self) {
        let mut inner = self.inner.lock().expect("work queue mutex poisoned");
        while inner.pending != 0 || !inner.queue.is_empty() {
            inner = self
                .drained
                .wait_timeout(inner, Duration::from_millis(200))
                .expect("work queue mutex poisoned")
                .0;
        }
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::normalise;
    use crate::state::Kind;

    fn item(url: &str) -> WorkItem {
        WorkItem {
            url: normalise(url).unwrap(),
            depth: 0,
            kind: Kind::Html,
        }
    }

    #[test]
    fn pop_timeout_returns_none_when_empty() {
        let q = WorkQueue::new();
        assert!(q.pop_timeout(Duration::from_millis(50)).is_none());
    }

    #[test]
    fn push_then_pop_fifo() {
        let q = WorkQueue::new();
        q.push(item("http://x.test/a"));
        q.push(item("http://x.test/b"));
        let first = q.pop_timeout(Duration::from_millis(50)).unwrap();
        assert_eq!(first.url.as_str(), "http://x.test/a");
    }

    #[test]
    fn wait_until_drained_requires_task_done() {
        let q = WorkQueue::new();
        q.push(item("http://x.test/a"));
        let popped = q.pop_timeout(Duration::from_millis(50)).unwrap();
        assert_eq!(popped.url.as_str(), "http://x.test/a");

        let drained = std::sync::Arc::new(q);
        let waiter = std::sync::Arc::clone(&drained);
        let handle = std::thread::spawn(move || waiter.wait_until_drained());

        std::thread::sleep(Duration::from_millis(50));
        drained.task_done();
        handle.join().unwrap();
    }
}
