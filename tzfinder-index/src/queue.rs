//! Priority work queue shared by the build and consolidation pools.
//!
//! A closable max-heap behind a mutex: workers pop the highest-priority
//! item, blocking while the queue is open and empty. The builder orders
//! items by ascending source index so progress clusters by time zone; the
//! consolidator orders by descending level so the deepest subtrees drain
//! first.

use parking_lot::{Condvar, Mutex};
use std::collections::BinaryHeap;

pub struct WorkQueue<T: Ord> {
    state: Mutex<State<T>>,
    available: Condvar,
}

struct State<T> {
    heap: BinaryHeap<T>,
    closed: bool,
}

impl<T: Ord> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                heap: BinaryHeap::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    pub fn push(&self, item: T) {
        let mut state = self.state.lock();
        debug_assert!(!state.closed, "push after close");
        state.heap.push(item);
        self.available.notify_one();
    }

    /// Stop accepting items; blocked `pop` calls return `None` once the
    /// heap runs dry.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.available.notify_all();
    }

    /// Highest-priority item, or `None` when the queue is closed and
    /// empty.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.heap.pop() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().heap.is_empty()
    }
}

impl<T: Ord> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
